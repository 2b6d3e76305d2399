//! This module defines the ASCII commands understood by the KORAD PSUs.

use core::fmt::Write;

use crate::types::{MemorySlot, State};

/// Upper bound on the length of an encoded command.
///
/// The longest template is `VSET1:` followed by the `Display` rendering of an
/// `f64`, which stays well below this for in-range values.
pub const MAX_COMMAND_LEN: usize = 32;

/// An encoded command, ready to be written to the serial port as-is. The
/// protocol requires no trailing terminator.
pub type CommandBytes = heapless::String<MAX_COMMAND_LEN>;

/// Every command in the KA3005 remote protocol.
///
/// Numeric arguments are carried pre-validated; range checks live in the
/// [`KoradPsu`](crate::psu::KoradPsu) wrapper methods, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `VSET1:{value}` - set the maximum output voltage.
    SetVoltage(f64),
    /// `VSET1?` - get the requested output voltage.
    GetVoltageSetpoint,
    /// `VOUT1?` - read the actual output voltage.
    ReadVoltage,
    /// `ISET1:{value}` - set the maximum output current.
    SetCurrent(f64),
    /// `ISET1?` - get the requested output current.
    GetCurrentSetpoint,
    /// `IOUT1?` - read the actual output current.
    ReadCurrent,
    /// `RCL{n}` - recall voltage and current limits from a memory slot.
    Recall(MemorySlot),
    /// `SAV{n}` - save voltage and current limits to a memory slot.
    Save(MemorySlot),
    /// `OUT1` / `OUT0` - enable or disable the power output.
    SetOutput(State),
    /// `OVP1` / `OVP0` - enable or disable over voltage protection.
    SetOverVoltageProtection(State),
    /// `OCP1` / `OCP0` - enable or disable over current protection.
    SetOverCurrentProtection(State),
    /// `STATUS?` - query the status byte.
    Status,
    /// `*IDN?` - query the device identification string.
    Identification,
}

impl Command {
    /// Render this command into its protocol bytes.
    ///
    /// Numeric arguments are formatted as plain decimal (`12.5`, not padded).
    pub fn encode(&self) -> Result<CommandBytes, core::fmt::Error> {
        let mut bytes = CommandBytes::new();
        match self {
            Command::SetVoltage(volts) => write!(bytes, "VSET1:{volts}")?,
            Command::GetVoltageSetpoint => write!(bytes, "VSET1?")?,
            Command::ReadVoltage => write!(bytes, "VOUT1?")?,
            Command::SetCurrent(amps) => write!(bytes, "ISET1:{amps}")?,
            Command::GetCurrentSetpoint => write!(bytes, "ISET1?")?,
            Command::ReadCurrent => write!(bytes, "IOUT1?")?,
            Command::Recall(slot) => write!(bytes, "RCL{}", *slot as u8)?,
            Command::Save(slot) => write!(bytes, "SAV{}", *slot as u8)?,
            Command::SetOutput(state) => write!(bytes, "OUT{}", *state as u8)?,
            Command::SetOverVoltageProtection(state) => write!(bytes, "OVP{}", *state as u8)?,
            Command::SetOverCurrentProtection(state) => write!(bytes, "OCP{}", *state as u8)?,
            Command::Status => write!(bytes, "STATUS?")?,
            Command::Identification => write!(bytes, "*IDN?")?,
        }
        Ok(bytes)
    }
}
