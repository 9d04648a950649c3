// CLASSIFICATION: COMMUNITY
// Filename: features.rs v0.1
// Author: Lukas Bower
// Date Modified: 2027-10-28

//! GDB target-description lookup.
//!
//! Serves the rv32i register-set description for `qXfer:features:read`
//! requests. The wire protocol itself lives in the GDB server, outside this
//! crate; only the document lookup is here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QxferError {
    #[error("unknown qXfer object: {0}")]
    UnknownObject(String),
    #[error("unknown qXfer annex: {0}")]
    UnknownAnnex(String),
}

/// 32-bit RISC-V integer register set, x0..x31.
pub const TARGET_XML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE target SYSTEM "gdb-target.dtd">
<target>
  <architecture>riscv:rv32</architecture>

  <feature name="org.gnu.gdb.riscv.rv32i">
    <reg name="x0"  bitsize="32" group="general"/>
    <reg name="x1"  bitsize="32" group="general"/>
    <reg name="x2"  bitsize="32" group="general"/>
    <reg name="x3"  bitsize="32" group="general"/>
    <reg name="x4"  bitsize="32" group="general"/>
    <reg name="x5"  bitsize="32" group="general"/>
    <reg name="x6"  bitsize="32" group="general"/>
    <reg name="x7"  bitsize="32" group="general"/>
    <reg name="x8"  bitsize="32" group="general"/>
    <reg name="x9"  bitsize="32" group="general"/>
    <reg name="x10" bitsize="32" group="general"/>
    <reg name="x11" bitsize="32" group="general"/>
    <reg name="x12" bitsize="32" group="general"/>
    <reg name="x13" bitsize="32" group="general"/>
    <reg name="x14" bitsize="32" group="general"/>
    <reg name="x15" bitsize="32" group="general"/>
    <reg name="x16" bitsize="32" group="general"/>
    <reg name="x17" bitsize="32" group="general"/>
    <reg name="x18" bitsize="32" group="general"/>
    <reg name="x19" bitsize="32" group="general"/>
    <reg name="x20" bitsize="32" group="general"/>
    <reg name="x21" bitsize="32" group="general"/>
    <reg name="x22" bitsize="32" group="general"/>
    <reg name="x23" bitsize="32" group="general"/>
    <reg name="x24" bitsize="32" group="general"/>
    <reg name="x25" bitsize="32" group="general"/>
    <reg name="x26" bitsize="32" group="general"/>
    <reg name="x27" bitsize="32" group="general"/>
    <reg name="x28" bitsize="32" group="general"/>
    <reg name="x29" bitsize="32" group="general"/>
    <reg name="x30" bitsize="32" group="general"/>
    <reg name="x31" bitsize="32" group="general"/>
  </feature>
</target>
"#;

/// Look up the document for a `qXfer:<object>:read:<annex>` request.
pub fn qxfer_read(object: &str, annex: &str) -> Result<&'static str, QxferError> {
    if object != "features" {
        return Err(QxferError::UnknownObject(object.to_string()));
    }
    match annex {
        "target.xml" => Ok(TARGET_XML),
        other => Err(QxferError::UnknownAnnex(other.to_string())),
    }
}
