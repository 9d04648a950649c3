// CLASSIFICATION: COMMUNITY
// Filename: session.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-11-12

//! Debug session facade.
//!
//! A [`BridgeSession`] owns everything one bring-up run needs: the ordered
//! binaries, the boot mode, the chip sequencer and the cable. The cable is
//! bound lazily on first use through an injected factory, one instance per
//! session, so sessions stay independently testable.

use log::info;
use thiserror::Error;

use crate::boot::{BootError, BootSequencer};
use crate::chips;
use crate::config::BridgeConfig;
use crate::features::{self, QxferError};
use crate::flash::{self, FlashError};
use crate::loader::{self, LoadError, PcPatch};
use crate::transport::{MemoryTransport, TransportError};

/// Builds the session's cable on first use.
pub type CableFactory = Box<dyn FnMut() -> Result<Box<dyn MemoryTransport>, TransportError>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown chip: {0}")]
    UnknownChip(String),
    #[error("{0} is not supported on this target")]
    Unsupported(&'static str),
    #[error("request-loop debug structure symbol not found")]
    SymbolNotFound,
    #[error("cable is not mounted")]
    CableUnavailable,
    #[error(transparent)]
    Boot(#[from] BootError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Flash(#[from] FlashError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// How the target gets its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMode {
    /// Host loads the image over JTAG after chip-specific reset choreography.
    Jtag,
    /// Chip boots itself from external hyperflash; host only selects the mode.
    JtagHyper,
    /// Direct load into already-running silicon, no choreography.
    Default,
}

impl BootMode {
    /// `jtag` when unset, `jtag_hyper` explicit, anything else direct-loads.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            None | Some("jtag") => BootMode::Jtag,
            Some("jtag_hyper") => BootMode::JtagHyper,
            Some(_) => BootMode::Default,
        }
    }
}

pub struct BridgeSession {
    binaries: Vec<String>,
    boot_mode: BootMode,
    pc_patch: Option<PcPatch>,
    start_pair: Option<(u32, u32)>,
    stop_pair: Option<(u32, u32)>,
    sequencer: Option<BootSequencer>,
    cable: Option<Box<dyn MemoryTransport>>,
    factory: CableFactory,
    reqloop_addr: Option<u32>,
    exit_status: i32,
}

impl std::fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSession")
            .field("binaries", &self.binaries)
            .field("boot_mode", &self.boot_mode)
            .field("reqloop_addr", &self.reqloop_addr)
            .field("exit_status", &self.exit_status)
            .finish_non_exhaustive()
    }
}

impl BridgeSession {
    pub fn new(
        config: &BridgeConfig,
        binaries: Vec<String>,
        factory: CableFactory,
    ) -> Result<Self, SessionError> {
        let boot_mode = BootMode::from_config(config.boot.mode.as_deref());

        let pc_patch = config.debug.set_pc_addr.map(|addr| PcPatch {
            addr,
            offset: config.debug.set_pc_offset.unwrap_or(0),
        });

        let sequencer = match &config.boot.chip {
            Some(chip) => {
                let profile = chips::by_name(chip)
                    .ok_or_else(|| SessionError::UnknownChip(chip.clone()))?;
                Some(BootSequencer::new(profile, pc_patch))
            }
            None => None,
        };

        let pair = |addr: Option<u32>, value: Option<u32>| addr.zip(value);

        Ok(Self {
            binaries,
            boot_mode,
            pc_patch,
            start_pair: pair(config.debug.start_addr, config.debug.start_value),
            stop_pair: pair(config.debug.stop_addr, config.debug.stop_value),
            sequencer,
            cable: None,
            factory,
            reqloop_addr: None,
            exit_status: 0,
        })
    }

    fn cable(&mut self) -> Result<&mut (dyn MemoryTransport + 'static), SessionError> {
        if self.cable.is_none() {
            info!("Mounting cable");
            self.cable = Some((self.factory)()?);
        }
        self.cable.as_deref_mut().ok_or(SessionError::CableUnavailable)
    }

    /// Load every configured binary according to the boot mode.
    pub fn load(&mut self) -> Result<(), SessionError> {
        let mode = self.boot_mode;
        self.cable()?;
        let Self { cable, sequencer, binaries, pc_patch, .. } = self;
        let cable = cable.as_deref_mut().ok_or(SessionError::CableUnavailable)?;

        match (mode, sequencer.as_mut()) {
            (BootMode::Jtag, Some(seq)) => seq.load_jtag(cable, binaries)?,
            (BootMode::JtagHyper, Some(seq)) => seq.load_jtag_hyper(cable)?,
            (BootMode::JtagHyper, None) => {
                return Err(SessionError::Unsupported("hyperflash boot"))
            }
            (BootMode::Jtag, None) | (BootMode::Default, _) => {
                for binary in binaries.iter() {
                    loader::load_elf(cable, binary, pc_patch.as_ref())?;
                }
            }
        }
        Ok(())
    }

    /// Release the cores, or poke the configured start word on targets
    /// without a chip profile. Idempotent after a successful load.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.cable()?;
        let Self { cable, sequencer, start_pair, .. } = self;
        let cable = cable.as_deref_mut().ok_or(SessionError::CableUnavailable)?;

        if let Some(seq) = sequencer.as_mut() {
            seq.start(cable)?;
        } else if let Some((addr, value)) = *start_pair {
            info!("Starting (base: 0x{:x}, value: 0x{:x})", addr, value);
            cable.write_u32(addr, value)?;
        }
        Ok(())
    }

    /// Re-run the stop choreography, or poke the configured stop word.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.cable()?;
        let Self { cable, sequencer, stop_pair, .. } = self;
        let cable = cable.as_deref_mut().ok_or(SessionError::CableUnavailable)?;

        if let Some(seq) = sequencer.as_mut() {
            seq.stop(cable)?;
        } else if let Some((addr, value)) = *stop_pair {
            cable.write_u32(addr, value)?;
        }
        Ok(())
    }

    /// Pulse the JTAG-level reset, then the chip reset.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let cable = self.cable()?;
        cable.jtag_reset(true)?;
        cable.jtag_reset(false)?;
        cable.chip_reset(true)?;
        cable.chip_reset(false)?;
        Ok(())
    }

    /// Stream each firmware image to the resident flasher stub.
    pub fn flash(&mut self, images: &[String]) -> Result<(), SessionError> {
        let supported = self
            .sequencer
            .as_ref()
            .map(|seq| seq.profile().has_flasher)
            .unwrap_or(false);
        if !supported {
            return Err(SessionError::Unsupported("flash"));
        }

        self.cable()?;
        let Self { cable, binaries, .. } = self;
        let cable = cable.as_deref_mut().ok_or(SessionError::CableUnavailable)?;

        for image in images {
            flash::flash(cable, binaries, image)?;
        }
        Ok(())
    }

    /// Discover the runtime's request-loop handshake structure. The name
    /// differs across runtime generations, so both are tried in order.
    pub fn reqloop(&mut self) -> Result<u32, SessionError> {
        let addr = match loader::resolve_symbol_addr(&self.binaries, "__rt_debug_struct_ptr")? {
            Some(addr) => Some(addr),
            None => loader::resolve_symbol_addr(&self.binaries, "debugStruct_ptr")?,
        };
        let addr = addr.ok_or(SessionError::SymbolNotFound)?;
        info!("Request-loop debug structure at 0x{:x}", addr);
        self.reqloop_addr = Some(addr);
        Ok(addr)
    }

    /// Tear down any long-running service and report its exit status.
    pub fn wait(&mut self) -> i32 {
        if self.reqloop_addr.take().is_some() {
            info!("Closing request loop");
        }
        self.exit_status
    }

    /// Hold the cable exclusively for a multi-step sequence.
    pub fn lock(&mut self) -> Result<(), SessionError> {
        self.cable()?.lock();
        Ok(())
    }

    pub fn unlock(&mut self) -> Result<(), SessionError> {
        self.cable()?.unlock();
        Ok(())
    }

    /// Serve a `qXfer:<object>:read:<annex>` document lookup.
    pub fn qxfer_read(&self, object: &str, annex: &str) -> Result<&'static str, QxferError> {
        features::qxfer_read(object, annex)
    }
}
