//! This module defines the layout of the byte returned by the `STATUS?` query.

use modular_bitfield::prelude::*;

/// The regulation mode the output is currently operating in.
#[derive(Specifier, Debug, Clone, Copy, PartialEq)]
#[bits = 1]
pub enum RegulationMode {
    /// Constant current regulation.
    ConstantCurrent = 0,
    /// Constant voltage regulation.
    ConstantVoltage = 1,
}

/// Status byte bit layout.
///
/// Bits 1-4 carry front-panel state that varies between firmware revisions
/// and are left unmapped.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct StatusFlags {
    /// Bit 0 - CC/CV regulation mode.
    pub mode: RegulationMode,
    #[skip]
    __: B4,
    /// Bit 5 - over current protection enabled.
    pub over_current_protection: bool,
    /// Bit 6 - output enabled.
    pub output_enabled: bool,
    /// Bit 7 - over voltage protection enabled.
    pub over_voltage_protection: bool,
}
