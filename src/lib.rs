// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.4
// Date Modified: 2027-11-12
// Author: Lukas Bower

//! Root library for the rvbridge debug tool.
//!
//! rvbridge brings up RISC-V multicore SoCs over a JTAG-class debug cable:
//! it loads ELF binaries into target memory, programs chip boot registers,
//! releases cores from reset/stall and can stream a firmware image to a
//! device-resident flasher stub.

/// Debug cable contract and the in-process simulator backend.
pub mod transport;

/// ELF segment loading and symbol-address resolution.
pub mod loader;

/// Per-chip boot register constants.
pub mod chips;

/// Generic boot state machine driven by a chip profile.
pub mod boot;

/// Chunked firmware streaming to the on-device flasher stub.
pub mod flash;

/// Session facade tying cable, loader, sequencer and flasher together.
pub mod session;

/// GDB target-description lookup (qXfer features).
pub mod features;

/// TOML bridge configuration.
pub mod config;

/// CLI entry point for the rvbridge binary.
pub mod cli;
