// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-11-12

//! Shared test fixtures: a recording mock cable with scriptable reads, and
//! a byte-level builder for little 32-bit RISC-V ELF images.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::rc::Rc;

use rvbridge::transport::{MemoryTransport, TransportError};
use tempfile::NamedTempFile;

/// One recorded cable operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write { addr: u32, data: Vec<u8> },
    Read { addr: u32, len: u32 },
    SetReg { reg: u32, width: u32, value: u32 },
    GetReg { reg: u32 },
    ChipReset(bool),
    JtagReset(bool),
    Lock,
    Unlock,
}

#[derive(Default)]
struct MockState {
    ops: Vec<Op>,
    reg_reads: VecDeque<u32>,
    word_reads: HashMap<u32, VecDeque<u32>>,
    fail_chip_reset: bool,
}

/// Recording cable. Clones share state so a factory-owned instance can be
/// inspected after the session consumed it.
#[derive(Clone, Default)]
pub struct MockCable(Rc<RefCell<MockState>>);

impl MockCable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses for `jtag_get_reg`, consumed in order. Once the
    /// queue drains further reads return 1 so a mis-scripted poll loop
    /// terminates instead of hanging the test.
    pub fn script_reg_reads(&self, values: &[u32]) {
        self.0.borrow_mut().reg_reads.extend(values.iter().copied());
    }

    /// Queue word responses for 4-byte reads of `addr`, consumed in order.
    pub fn script_word(&self, addr: u32, values: &[u32]) {
        self.0
            .borrow_mut()
            .word_reads
            .entry(addr)
            .or_default()
            .extend(values.iter().copied());
    }

    pub fn fail_chip_reset(&self, fail: bool) {
        self.0.borrow_mut().fail_chip_reset = fail;
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.borrow().ops.clone()
    }

    /// Just the memory writes, in order.
    pub fn writes(&self) -> Vec<(u32, Vec<u8>)> {
        self.0
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Write { addr, data } => Some((*addr, data.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of 4-byte reads issued at `addr`.
    pub fn word_read_count(&self, addr: u32) -> usize {
        self.0
            .borrow()
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Read { addr: a, len: 4 } if *a == addr))
            .count()
    }

    /// Index in the op log of the first write matching `addr`/`data`.
    pub fn index_of_write(&self, addr: u32, data: &[u8]) -> Option<usize> {
        self.0.borrow().ops.iter().position(
            |op| matches!(op, Op::Write { addr: a, data: d } if *a == addr && d == data),
        )
    }
}

impl MemoryTransport for MockCable {
    fn read(&mut self, addr: u32, len: u32) -> Result<Vec<u8>, TransportError> {
        let mut state = self.0.borrow_mut();
        state.ops.push(Op::Read { addr, len });
        if len == 4 {
            if let Some(queue) = state.word_reads.get_mut(&addr) {
                if let Some(value) = queue.pop_front() {
                    return Ok(value.to_le_bytes().to_vec());
                }
            }
            // unscripted polls read as ready so tests fail on assertions,
            // not by hanging
            return Ok(1u32.to_le_bytes().to_vec());
        }
        Ok(vec![0u8; len as usize])
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), TransportError> {
        self.0.borrow_mut().ops.push(Op::Write {
            addr,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn jtag_set_reg(&mut self, reg: u32, width: u32, value: u32) -> Result<(), TransportError> {
        self.0.borrow_mut().ops.push(Op::SetReg { reg, width, value });
        Ok(())
    }

    fn jtag_get_reg(&mut self, reg: u32, _width: u32) -> Result<u32, TransportError> {
        let mut state = self.0.borrow_mut();
        state.ops.push(Op::GetReg { reg });
        Ok(state.reg_reads.pop_front().unwrap_or(1))
    }

    fn chip_reset(&mut self, asserted: bool) -> Result<(), TransportError> {
        let mut state = self.0.borrow_mut();
        state.ops.push(Op::ChipReset(asserted));
        if state.fail_chip_reset {
            return Err(TransportError::ChipReset);
        }
        Ok(())
    }

    fn jtag_reset(&mut self, asserted: bool) -> Result<(), TransportError> {
        self.0.borrow_mut().ops.push(Op::JtagReset(asserted));
        Ok(())
    }

    fn lock(&mut self) {
        self.0.borrow_mut().ops.push(Op::Lock);
    }

    fn unlock(&mut self) {
        self.0.borrow_mut().ops.push(Op::Unlock);
    }
}

/// Builder for minimal ELF32 little-endian RISC-V images: loadable
/// segments plus an optional symbol table.
#[derive(Default)]
pub struct ElfBuilder {
    entry: u32,
    segments: Vec<(u32, u32, Vec<u8>)>,
    symbols: Vec<(String, u32)>,
}

fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: u32) -> Self {
        self.entry = entry;
        self
    }

    /// Add a PT_LOAD segment. `memsz` may exceed the data length to model
    /// a BSS tail.
    pub fn segment(mut self, paddr: u32, memsz: u32, data: &[u8]) -> Self {
        self.segments.push((paddr, memsz, data.to_vec()));
        self
    }

    pub fn symbol(mut self, name: &str, value: u32) -> Self {
        self.symbols.push((name.to_string(), value));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const EHSIZE: usize = 52;
        const PHENTSIZE: usize = 32;
        const SHENTSIZE: usize = 40;

        let mut out = vec![0u8; EHSIZE + self.segments.len() * PHENTSIZE];

        // Segment payloads, then the program header table entries that
        // point back at them.
        let mut seg_offsets = Vec::new();
        for (_, _, data) in &self.segments {
            seg_offsets.push(out.len() as u32);
            out.extend_from_slice(data);
        }
        for (i, (paddr, memsz, data)) in self.segments.iter().enumerate() {
            let base = EHSIZE + i * PHENTSIZE;
            put_u32(&mut out, base, 1); // PT_LOAD
            put_u32(&mut out, base + 4, seg_offsets[i]);
            put_u32(&mut out, base + 8, *paddr); // vaddr
            put_u32(&mut out, base + 12, *paddr);
            put_u32(&mut out, base + 16, data.len() as u32);
            put_u32(&mut out, base + 20, *memsz);
            put_u32(&mut out, base + 24, 7); // rwx
            put_u32(&mut out, base + 28, 4);
        }

        let (shoff, shnum, shstrndx) = if self.symbols.is_empty() {
            (0u32, 0u16, 0u16)
        } else {
            let mut strtab = vec![0u8];
            let mut name_offsets = Vec::new();
            for (name, _) in &self.symbols {
                name_offsets.push(strtab.len() as u32);
                strtab.extend_from_slice(name.as_bytes());
                strtab.push(0);
            }

            let mut symtab = vec![0u8; 16]; // null entry
            for ((_, value), name_offset) in self.symbols.iter().zip(&name_offsets) {
                push_u32(&mut symtab, *name_offset);
                push_u32(&mut symtab, *value);
                push_u32(&mut symtab, 0);
                symtab.push(0x10); // GLOBAL, NOTYPE
                symtab.push(0);
                symtab.extend_from_slice(&0xfff1u16.to_le_bytes()); // SHN_ABS
            }

            let shstrtab = b"\0.symtab\0.strtab\0.shstrtab\0".to_vec();

            while out.len() % 8 != 0 {
                out.push(0);
            }
            let symtab_off = out.len() as u32;
            out.extend_from_slice(&symtab);
            let strtab_off = out.len() as u32;
            out.extend_from_slice(&strtab);
            let shstr_off = out.len() as u32;
            out.extend_from_slice(&shstrtab);

            while out.len() % 4 != 0 {
                out.push(0);
            }
            let shoff = out.len() as u32;

            // name, type, flags, addr, offset, size, link, info, align, entsize
            let mut shdr = |fields: [u32; 10]| {
                for field in fields {
                    push_u32(&mut out, field);
                }
            };
            shdr([0; 10]);
            shdr([1, 2, 0, 0, symtab_off, symtab.len() as u32, 2, 1, 4, 16]);
            shdr([9, 3, 0, 0, strtab_off, strtab.len() as u32, 0, 0, 1, 0]);
            shdr([17, 3, 0, 0, shstr_off, shstrtab.len() as u32, 0, 0, 1, 0]);

            (shoff, 4u16, 3u16)
        };

        // ELF header last, once every offset is known.
        out[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        out[4] = 1; // ELFCLASS32
        out[5] = 1; // little endian
        out[6] = 1; // ident version
        put_u16(&mut out, 16, 2); // ET_EXEC
        put_u16(&mut out, 18, 243); // EM_RISCV
        put_u32(&mut out, 20, 1);
        put_u32(&mut out, 24, self.entry);
        put_u32(&mut out, 28, if self.segments.is_empty() { 0 } else { EHSIZE as u32 });
        put_u32(&mut out, 32, shoff);
        put_u16(&mut out, 40, EHSIZE as u16);
        put_u16(&mut out, 42, PHENTSIZE as u16);
        put_u16(&mut out, 44, self.segments.len() as u16);
        put_u16(&mut out, 46, SHENTSIZE as u16);
        put_u16(&mut out, 48, shnum);
        put_u16(&mut out, 50, shstrndx);

        out
    }

    /// Build and persist to a temp file, returning the handle so the file
    /// outlives the test.
    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&self.build()).expect("write elf");
        file.flush().expect("flush elf");
        file
    }
}

/// Path of a temp file as an owned string.
pub fn path_of(file: &NamedTempFile) -> String {
    file.path().display().to_string()
}
