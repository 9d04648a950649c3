// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-10-21

//! Debug cable contract.
//!
//! Everything the bridge does to a target goes through [`MemoryTransport`]:
//! blocking memory reads/writes, JTAG register accesses and the two reset
//! lines. Real cable drivers (FTDI, jtag-proxy sockets) live outside this
//! crate; the [`sim`] backend and test mocks implement the same trait.

pub mod sim;

pub use sim::SimTransport;

use thiserror::Error;

/// Failures surfaced by a cable backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cable write of {len} bytes at 0x{addr:08x} failed")]
    Write { addr: u32, len: usize },
    #[error("cable read of {len} bytes at 0x{addr:08x} failed")]
    Read { addr: u32, len: u32 },
    #[error("cable returned {got} bytes for a {want}-byte read at 0x{addr:08x}")]
    ShortRead { addr: u32, want: u32, got: usize },
    #[error("jtag register {reg} access failed")]
    Register { reg: u32 },
    #[error("chip reset line could not be driven")]
    ChipReset,
    #[error("jtag reset line could not be driven")]
    JtagReset,
    #[error("failed to open cable: {0}")]
    Open(String),
}

/// Blocking debug cable operations.
///
/// Every call blocks until the cable has completed the operation. The bridge
/// assumes exclusive use of the cable for the duration of a boot or flash
/// sequence; callers serialize sessions via [`MemoryTransport::lock`].
pub trait MemoryTransport {
    /// Read `len` bytes of target memory starting at `addr`.
    fn read(&mut self, addr: u32, len: u32) -> Result<Vec<u8>, TransportError>;

    /// Write `data` to target memory starting at `addr`.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), TransportError>;

    /// Shift `value` into JTAG register `reg` of the given bit width.
    fn jtag_set_reg(&mut self, reg: u32, width: u32, value: u32) -> Result<(), TransportError>;

    /// Shift JTAG register `reg` of the given bit width out of the target.
    fn jtag_get_reg(&mut self, reg: u32, width: u32) -> Result<u32, TransportError>;

    /// Drive the chip reset line (`true` asserts reset).
    fn chip_reset(&mut self, asserted: bool) -> Result<(), TransportError>;

    /// Drive the JTAG-level (TAP) reset line (`true` asserts reset).
    fn jtag_reset(&mut self, asserted: bool) -> Result<(), TransportError>;

    /// Take exclusive ownership of the cable.
    fn lock(&mut self);

    /// Release exclusive ownership of the cable.
    fn unlock(&mut self);

    /// Write a little-endian 32-bit word to `addr`.
    fn write_u32(&mut self, addr: u32, value: u32) -> Result<(), TransportError> {
        self.write(addr, &value.to_le_bytes())
    }

    /// Read a little-endian 32-bit word from `addr`.
    fn read_u32(&mut self, addr: u32) -> Result<u32, TransportError> {
        let bytes = self.read(addr, 4)?;
        let word: [u8; 4] = bytes[..]
            .try_into()
            .map_err(|_| TransportError::ShortRead { addr, want: 4, got: bytes.len() })?;
        Ok(u32::from_le_bytes(word))
    }
}
