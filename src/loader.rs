// CLASSIFICATION: COMMUNITY
// Filename: loader.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-11-08

//! ELF image loader.
//!
//! Turns a binary image into a sequence of target-memory writes over the
//! debug cable: one write per loadable segment in program-header order,
//! followed by a zero fill for the BSS-style tail of any segment whose
//! memory size exceeds its file size. Also resolves symbol addresses for
//! the flasher and request-loop handshakes.

use log::info;
use thiserror::Error;
use xmas_elf::program::Type;
use xmas_elf::sections::{SectionData, ShType};
use xmas_elf::symbol_table::Entry;
use xmas_elf::ElfFile;

use crate::transport::MemoryTransport;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {0}")]
    Io(String),
    #[error("malformed ELF in {path}: {reason}")]
    Malformed { path: String, reason: &'static str },
    #[error(transparent)]
    Transport(#[from] crate::transport::TransportError),
}

/// Where to patch the program counter after loading, and by how much to
/// offset the ELF entry point.
#[derive(Debug, Clone, Copy)]
pub struct PcPatch {
    pub addr: u32,
    pub offset: i64,
}

/// Stream every loadable segment of `path` into target memory.
///
/// Segments are written in program-header order, never reordered or
/// coalesced. When a PC patch is configured the computed entry value is
/// written as a little-endian word and returned; otherwise `None` is
/// returned and no patch write happens.
pub fn load_elf(
    cable: &mut dyn MemoryTransport,
    path: &str,
    patch: Option<&PcPatch>,
) -> Result<Option<u32>, LoadError> {
    let data = std::fs::read(path).map_err(|_| LoadError::Io(path.to_string()))?;
    let elf = ElfFile::new(&data).map_err(|reason| LoadError::Malformed {
        path: path.to_string(),
        reason,
    })?;

    for ph in elf.program_iter() {
        if let Ok(Type::Load) = ph.get_type() {
            let paddr = ph.physical_addr() as u32;
            let file_size = ph.file_size() as usize;
            let mem_size = ph.mem_size() as usize;
            let offset = ph.offset() as usize;

            let bytes = offset
                .checked_add(file_size)
                .and_then(|end| data.get(offset..end))
                .ok_or(LoadError::Malformed {
                    path: path.to_string(),
                    reason: "segment data outside file",
                })?;

            info!("Loading section (base: 0x{:x}, size: 0x{:x})", paddr, file_size);
            cable.write(paddr, bytes)?;

            if mem_size > file_size {
                let fill = mem_size - file_size;
                let fill_addr = paddr.wrapping_add(file_size as u32);
                info!("Init section to 0 (base: 0x{:x}, size: 0x{:x})", fill_addr, fill);
                cable.write(fill_addr, &vec![0u8; fill])?;
            }
        }
    }

    if let Some(patch) = patch {
        let entry = (elf.header.pt2.entry_point() as i64).wrapping_add(patch.offset) as u32;
        info!("Setting PC (base: 0x{:x}, value: 0x{:x})", patch.addr, entry);
        cable.write_u32(patch.addr, entry)?;
        return Ok(Some(entry));
    }

    Ok(None)
}

/// Scan the symbol tables of `binaries` in order and return the value of
/// the first exact match for `name`, or `None` if no binary defines it.
pub fn resolve_symbol_addr(binaries: &[String], name: &str) -> Result<Option<u32>, LoadError> {
    for binary in binaries {
        let data = std::fs::read(binary).map_err(|_| LoadError::Io(binary.clone()))?;
        let elf = ElfFile::new(&data).map_err(|reason| LoadError::Malformed {
            path: binary.clone(),
            reason,
        })?;

        for section in elf.section_iter() {
            if !matches!(section.get_type(), Ok(ShType::SymTab)) {
                continue;
            }
            match section.get_data(&elf) {
                Ok(SectionData::SymbolTable32(entries)) => {
                    for entry in entries {
                        if entry.get_name(&elf) == Ok(name) {
                            return Ok(Some(entry.value() as u32));
                        }
                    }
                }
                Ok(SectionData::SymbolTable64(entries)) => {
                    for entry in entries {
                        if entry.get_name(&elf) == Ok(name) {
                            return Ok(Some(entry.value() as u32));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(None)
}
