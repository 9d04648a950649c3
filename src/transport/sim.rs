// CLASSIFICATION: COMMUNITY
// Filename: sim.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-10-21

//! In-process target simulator.
//!
//! Backs the `sim` cable type: a sparse byte-addressed memory plus a JTAG
//! register file. Useful for dry-running boot sequences and for tests that
//! do not want to script a mock.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::{MemoryTransport, TransportError};

/// Simulated target behind a zero-latency cable.
#[derive(Default)]
pub struct SimTransport {
    mem: BTreeMap<u32, u8>,
    regs: HashMap<u32, u32>,
    chip_in_reset: bool,
    locked: bool,
}

impl SimTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the chip reset line is currently asserted.
    pub fn chip_in_reset(&self) -> bool {
        self.chip_in_reset
    }

    /// Preload target memory, for scripting tests and demos.
    pub fn poke(&mut self, addr: u32, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.mem.insert(addr.wrapping_add(i as u32), *byte);
        }
    }
}

impl MemoryTransport for SimTransport {
    fn read(&mut self, addr: u32, len: u32) -> Result<Vec<u8>, TransportError> {
        let mut out = Vec::with_capacity(len as usize);
        for i in 0..len {
            out.push(*self.mem.get(&addr.wrapping_add(i)).unwrap_or(&0));
        }
        Ok(out)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), TransportError> {
        debug!("sim: write 0x{:08x} len 0x{:x}", addr, data.len());
        for (i, byte) in data.iter().enumerate() {
            self.mem.insert(addr.wrapping_add(i as u32), *byte);
        }
        Ok(())
    }

    fn jtag_set_reg(&mut self, reg: u32, width: u32, value: u32) -> Result<(), TransportError> {
        debug!("sim: set reg {} width {} = 0x{:x}", reg, width, value);
        self.regs.insert(reg, value);
        Ok(())
    }

    fn jtag_get_reg(&mut self, reg: u32, _width: u32) -> Result<u32, TransportError> {
        Ok(*self.regs.get(&reg).unwrap_or(&0))
    }

    fn chip_reset(&mut self, asserted: bool) -> Result<(), TransportError> {
        debug!("sim: chip reset {}", asserted);
        self.chip_in_reset = asserted;
        Ok(())
    }

    fn jtag_reset(&mut self, asserted: bool) -> Result<(), TransportError> {
        debug!("sim: jtag reset {}", asserted);
        Ok(())
    }

    fn lock(&mut self) {
        self.locked = true;
    }

    fn unlock(&mut self) {
        self.locked = false;
    }
}
