// CLASSIFICATION: COMMUNITY
// Filename: flash.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-11-10

//! Flash streamer.
//!
//! Streams a firmware image in 350 KiB chunks to a flasher stub resident on
//! the device. Host and stub alternate ownership of a single device-side
//! buffer through two flags in the `flasherHeader` structure, so at most one
//! chunk is ever in flight.
//!
//! Header layout, six consecutive little-endian words at `flasherHeader`:
//! +0 imageReady, +4 flasherReady, +8 flashAddress, +12 iterationCount,
//! +16 bufferSize, +20 bufferAddress.

use log::info;
use thiserror::Error;

use crate::loader::{self, LoadError};
use crate::transport::{MemoryTransport, TransportError};

/// Largest payload the device-side buffer accepts per chunk.
pub const MAX_CHUNK: usize = 350 * 1024;

const IMAGE_READY: u32 = 0;
const FLASHER_READY: u32 = 4;
const FLASH_ADDR: u32 = 8;
const ITER_COUNT: u32 = 12;
const BUF_SIZE: u32 = 16;
const BUF_ADDR: u32 = 20;

#[derive(Debug, Error)]
pub enum FlashError {
    #[error("flasherHeader symbol not found in any binary")]
    SymbolNotFound,
    #[error("failed to read flash image {0}")]
    Io(String),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Number of chunks a flash image of `size` bytes splits into.
pub fn chunk_count(size: usize) -> usize {
    if size % MAX_CHUNK != 0 {
        size / MAX_CHUNK + 1
    } else {
        size / MAX_CHUNK
    }
}

/// Stub-side buffer length for a chunk: short final chunks round up to the
/// next word boundary.
pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Stream `image` to the flasher stub declared by one of `binaries`.
///
/// Blocks until the stub first raises `flasherReady`, then hands over one
/// chunk at a time, re-polling readiness between chunks. The polls have no
/// timeout: a stub that never signals readiness hangs the call. After the
/// last chunk's header writes the transfer is considered complete without a
/// further poll.
pub fn flash(
    cable: &mut dyn MemoryTransport,
    binaries: &[String],
    image: &str,
) -> Result<(), FlashError> {
    let header = loader::resolve_symbol_addr(binaries, "flasherHeader")?
        .ok_or(FlashError::SymbolNotFound)?;

    let data = std::fs::read(image).map_err(|_| FlashError::Io(image.to_string()))?;
    let chunks = chunk_count(data.len());

    info!(
        "Flashing {} ({} bytes, {} chunks) via header at 0x{:x}",
        image,
        data.len(),
        chunks,
        header
    );

    // Wait for the stub to come up. No timeout (known gap): a dead stub
    // hangs the sequence rather than aborting a slow one.
    while cable.read_u32(header + FLASHER_READY)? == 0 {}

    let buffer = cable.read_u32(header + BUF_ADDR)?;
    info!("Flash address buffer 0x{:x}", buffer);

    cable.write_u32(header + FLASH_ADDR, 0)?;
    cable.write_u32(header + ITER_COUNT, chunks as u32)?;

    for (index, chunk) in data.chunks(MAX_CHUNK).enumerate() {
        cable.write(buffer, chunk)?;
        cable.write_u32(header + BUF_SIZE, padded_len(chunk.len()) as u32)?;
        cable.write_u32(header + IMAGE_READY, 1)?;
        cable.write_u32(header + FLASHER_READY, 0)?;

        if index + 1 != chunks {
            while cable.read_u32(header + FLASHER_READY)? == 0 {}
        }
    }

    Ok(())
}
