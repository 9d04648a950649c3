// CLASSIFICATION: COMMUNITY
// Filename: chips.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-11-08

//! Per-chip boot register constants.
//!
//! One [`BootProfile`] per supported chip variant. The boot sequencer is a
//! single generic state machine; everything chip-specific (register ids,
//! stall patterns, boot-mode values, the workaround writes) lives here.

/// JTAG id of the boot configuration register shared by the gap family.
pub const JTAG_SOC_CONFREG: u32 = 7;
/// Bit width of the boot configuration register.
pub const JTAG_SOC_CONFREG_WIDTH: u32 = 4;

/// Confreg value selecting a host-loaded JTAG boot.
pub const BOOT_MODE_JTAG: u32 = 4;
/// Confreg value selecting boot from external hyperflash.
pub const BOOT_MODE_JTAG_HYPER: u32 = 11;
/// Confreg status reported by boot ROM when it is ready for loading.
pub const CONFREG_BOOT_WAIT: u32 = 1;
/// Confreg value notifying legacy boot ROM that the image is in place.
pub const CONFREG_PGM_LOADED: u32 = 1;

/// Boot configuration register programming for chips that have one.
#[derive(Debug, Clone, Copy)]
pub struct ConfReg {
    pub reg: u32,
    pub width: u32,
    /// Value selecting a host-loaded JTAG boot.
    pub boot_jtag: u32,
    /// Value selecting boot from external hyperflash, when supported.
    pub boot_hyper: Option<u32>,
    /// Legacy only: status value to poll for before loading.
    pub boot_ack: Option<u32>,
    /// Legacy only: value written at release time to signal "image loaded".
    pub loaded_notify: Option<u32>,
}

/// Immutable per-chip constant set driving the boot sequencer.
#[derive(Debug, Clone, Copy)]
pub struct BootProfile {
    pub name: &'static str,
    pub confreg: Option<ConfReg>,
    /// Fetch-unit control register of the primary core.
    pub stall_addr: u32,
    pub stall_pattern: [u8; 4],
    pub release_pattern: [u8; 4],
    /// Reset-vector/jump location patched after loading.
    pub entry_patch_addr: u32,
    pub entry_patch: [u8; 4],
    /// Known-safe words written right after stalling, in order.
    pub safety_writes: &'static [(u32, u32)],
    /// Whether a resident flasher stub is available for this chip.
    pub has_flasher: bool,
}

/// Current gap silicon. The FLL words dodge a lock-up the boot ROM can hit
/// when the host reconfigures clocks mid-boot.
pub const GAP: BootProfile = BootProfile {
    name: "gap",
    confreg: Some(ConfReg {
        reg: JTAG_SOC_CONFREG,
        width: JTAG_SOC_CONFREG_WIDTH,
        boot_jtag: BOOT_MODE_JTAG,
        boot_hyper: Some(BOOT_MODE_JTAG_HYPER),
        boot_ack: None,
        loaded_notify: None,
    }),
    stall_addr: 0x1B30_0000,
    stall_pattern: [0, 0, 1, 0],
    release_pattern: [0, 0, 0, 0],
    entry_patch_addr: 0x1B30_2000,
    entry_patch: [0x80, 0x00, 0x00, 0x1c],
    safety_writes: &[(0x1A10_0004, 0x8400_05F5), (0x1A10_0008, 0x8100_410B)],
    has_flasher: true,
};

/// First-revision gap silicon. Its boot ROM still reports a usable "boot
/// code ready" status, so loading waits for the acknowledgement and the
/// release path notifies the ROM that the image is in place.
pub const GAP_REV1: BootProfile = BootProfile {
    name: "gap-rev1",
    confreg: Some(ConfReg {
        reg: JTAG_SOC_CONFREG,
        width: JTAG_SOC_CONFREG_WIDTH,
        boot_jtag: BOOT_MODE_JTAG,
        boot_hyper: None,
        boot_ack: Some(CONFREG_BOOT_WAIT),
        loaded_notify: Some(CONFREG_PGM_LOADED),
    }),
    stall_addr: 0x1B30_0000,
    stall_pattern: [0, 0, 1, 0],
    release_pattern: [0, 0, 0, 0],
    entry_patch_addr: 0x1B30_2000,
    entry_patch: [0x80, 0x00, 0x00, 0x1c],
    safety_writes: &[],
    has_flasher: false,
};

/// Wolfe has no boot configuration register reachable over JTAG; the chip
/// is simply reset, stalled, loaded and repointed at the new image.
pub const WOLFE: BootProfile = BootProfile {
    name: "wolfe",
    confreg: None,
    stall_addr: 0x1A11_0000,
    stall_pattern: [0, 0, 1, 0],
    release_pattern: [0, 0, 0, 0],
    entry_patch_addr: 0x1A11_2000,
    entry_patch: [0x80, 0x80, 0x00, 0x1c],
    safety_writes: &[],
    has_flasher: false,
};

/// Look up a chip profile by its configuration name.
pub fn by_name(name: &str) -> Option<&'static BootProfile> {
    match name {
        "gap" => Some(&GAP),
        "gap-rev1" => Some(&GAP_REV1),
        "wolfe" => Some(&WOLFE),
        _ => None,
    }
}
