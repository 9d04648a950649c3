// CLASSIFICATION: COMMUNITY
// Filename: main.rs v0.2
// Date Modified: 2027-11-05
// Author: Lukas Bower

//! Entry point for the rvbridge binary.

use rvbridge::cli;

fn main() {
    env_logger::init();
    if let Err(err) = cli::run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
