// CLASSIFICATION: COMMUNITY
// Filename: boot.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-11-10

//! Boot sequencer.
//!
//! One state machine for every chip variant, parameterized by a
//! [`BootProfile`]: assert reset, program the boot-mode register, release
//! reset, stall the fetch unit, stream the binaries, patch the entry vector,
//! then unstall on [`BootSequencer::start`]. The entry patch must stay
//! strictly after the last binary write: the prefetch buffer starts fetching
//! the moment the PC is repointed and would race ahead on a partial image.

use log::{info, warn};
use thiserror::Error;

use crate::chips::BootProfile;
use crate::loader::{self, LoadError, PcPatch};
use crate::transport::{MemoryTransport, TransportError};

#[derive(Debug, Error)]
pub enum BootError {
    #[error("{what} is not supported on {chip}")]
    UnsupportedOperation { chip: &'static str, what: &'static str },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Per-session boot state machine for one chip profile.
///
/// `start_cores` latches once a jtag load completes; `is_started` guards the
/// release write so calling [`BootSequencer::start`] twice unstalls once.
pub struct BootSequencer {
    profile: &'static BootProfile,
    pc_patch: Option<PcPatch>,
    start_cores: bool,
    is_started: bool,
}

impl BootSequencer {
    pub fn new(profile: &'static BootProfile, pc_patch: Option<PcPatch>) -> Self {
        Self {
            profile,
            pc_patch,
            start_cores: false,
            is_started: false,
        }
    }

    pub fn profile(&self) -> &'static BootProfile {
        self.profile
    }

    /// Reset the chip into JTAG boot mode and stall the fetch unit.
    ///
    /// Reset line failures are logged and tolerated here; some cables cannot
    /// drive the line reliably and the chips come up anyway. Register and
    /// memory write failures abort the sequence.
    pub fn stop(&mut self, cable: &mut dyn MemoryTransport) -> Result<(), BootError> {
        self.is_started = false;

        info!("Notifying to boot code that we are doing a JTAG boot");
        if let Err(err) = cable.chip_reset(true) {
            warn!("Failed to assert chip reset: {}", err);
        }

        // Keep reset active while the boot mode goes in so the ROM sees it
        // as soon as it starts executing.
        if let Some(confreg) = &self.profile.confreg {
            cable.jtag_set_reg(confreg.reg, confreg.width, confreg.boot_jtag)?;
        }

        if let Err(err) = cable.chip_reset(false) {
            warn!("Failed to deassert chip reset: {}", err);
        }

        if let Some(confreg) = &self.profile.confreg {
            if let Some(expect) = confreg.boot_ack {
                // Unbounded poll: a ROM that never reports ready hangs the
                // sequence. Current silicon skips this wait entirely because
                // the ready status is broken in hardware.
                info!("Waiting for notification from boot code");
                while cable.jtag_get_reg(confreg.reg, confreg.width)? != expect {}
                info!("Received notification from boot code");
            }
        }

        // Stall the fetch unit before anything touches memory.
        cable.write(self.profile.stall_addr, &self.profile.stall_pattern)?;

        for &(addr, value) in self.profile.safety_writes {
            cable.write_u32(addr, value)?;
        }

        Ok(())
    }

    /// Full JTAG boot: stop, load every binary in order, patch the entry
    /// vector. Aborts on the first loader failure.
    pub fn load_jtag(
        &mut self,
        cable: &mut dyn MemoryTransport,
        binaries: &[String],
    ) -> Result<(), BootError> {
        info!("Loading binary through jtag");
        self.stop(cable)?;

        for binary in binaries {
            info!("Loading binary from {}", binary);
            loader::load_elf(cable, binary, self.pc_patch.as_ref())?;
        }

        // Only now that every binary is in place.
        cable.write(self.profile.entry_patch_addr, &self.profile.entry_patch)?;

        self.start_cores = true;
        Ok(())
    }

    /// Reset the chip into boot-from-hyperflash mode. No load phase follows;
    /// the ROM fetches the image from external flash on its own.
    ///
    /// Unlike the jtag path, reset failures are fatal here: there is no
    /// later load step that would paper over a chip left in reset.
    pub fn load_jtag_hyper(&mut self, cable: &mut dyn MemoryTransport) -> Result<(), BootError> {
        let confreg = self.profile.confreg.as_ref();
        let (confreg, boot_hyper) = match confreg.and_then(|c| c.boot_hyper.map(|v| (c, v))) {
            Some(pair) => pair,
            None => {
                return Err(BootError::UnsupportedOperation {
                    chip: self.profile.name,
                    what: "hyperflash boot",
                })
            }
        };

        info!("Notifying to boot code that we are doing a JTAG boot from hyperflash");
        cable.chip_reset(true)?;
        cable.jtag_set_reg(confreg.reg, confreg.width, boot_hyper)?;
        cable.chip_reset(false)?;
        Ok(())
    }

    /// Unstall the fetch unit so execution begins from the loaded image.
    ///
    /// No-op unless a load completed in this session; idempotent, the
    /// release write happens at most once. Returns whether it ran.
    pub fn start(&mut self, cable: &mut dyn MemoryTransport) -> Result<bool, BootError> {
        if !self.start_cores || self.is_started {
            return Ok(false);
        }
        self.is_started = true;

        info!("Starting execution");
        if let Some(confreg) = &self.profile.confreg {
            if let Some(value) = confreg.loaded_notify {
                cable.jtag_set_reg(confreg.reg, confreg.width, value)?;
            }
        }
        cable.write(self.profile.stall_addr, &self.profile.release_pattern)?;
        Ok(true)
    }
}
