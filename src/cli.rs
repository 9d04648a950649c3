// CLASSIFICATION: COMMUNITY
// Filename: cli.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-11-12

//! Command-line front end.
//!
//! The binary takes a TOML config, the binaries to load and an ordered list
//! of commands, e.g. `rvbridge --config gap.toml --binary app.elf load start
//! wait`. The cable is locked for the whole command sequence.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::BridgeConfig;
use crate::session::{BridgeSession, CableFactory};
use crate::transport::{MemoryTransport, SimTransport, TransportError};

#[derive(Parser)]
#[command(name = "rvbridge", about = "RISC-V SoC JTAG debug bridge")]
struct Cli {
    /// Bridge configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// ELF binary to load; repeat for multi-binary targets, load order is
    /// argument order
    #[arg(long = "binary", value_name = "ELF")]
    binaries: Vec<PathBuf>,

    /// Firmware image to stream to the flasher stub
    #[arg(long = "flash-image", value_name = "IMG")]
    flash_images: Vec<PathBuf>,

    /// Commands to run, in order
    #[arg(required = true, value_enum)]
    commands: Vec<Command>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Command {
    Load,
    Start,
    Stop,
    Reset,
    Flash,
    Reqloop,
    Wait,
}

/// Lazy cable constructor for the configured cable type. Only the built-in
/// simulator mounts in-process; ftdi and jtag-proxy drivers are external.
fn cable_factory(config: &BridgeConfig) -> CableFactory {
    let name = config.cable.kind.clone().unwrap_or_else(|| "ftdi".to_string());
    Box::new(move || {
        let base = name.split('@').next().unwrap_or("");
        match base {
            "sim" => Ok(Box::new(SimTransport::new()) as Box<dyn MemoryTransport>),
            other => Err(TransportError::Open(format!("unknown cable: {}", other))),
        }
    })
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    let binaries: Vec<String> = cli.binaries.iter().map(|p| p.display().to_string()).collect();
    let images: Vec<String> = cli
        .flash_images
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let mut session = BridgeSession::new(&config, binaries, cable_factory(&config))?;

    session.lock()?;
    let outcome = run_commands(&mut session, &cli.commands, &images);
    session.unlock()?;

    let status = outcome?;
    if status != 0 {
        anyhow::bail!("application exited with status {}", status);
    }
    Ok(())
}

fn run_commands(
    session: &mut BridgeSession,
    commands: &[Command],
    images: &[String],
) -> anyhow::Result<i32> {
    let mut status = 0;
    for command in commands {
        match command {
            Command::Load => session.load()?,
            Command::Start => session.start()?,
            Command::Stop => session.stop()?,
            Command::Reset => session.reset()?,
            Command::Flash => session.flash(images)?,
            Command::Reqloop => {
                session.reqloop()?;
            }
            Command::Wait => status = session.wait(),
        }
    }
    Ok(status)
}
