//! This module contains types relevant to the PSU protocol data.

use strum_macros::EnumIter;

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum State {
    /// Disabled.
    Off = 0,
    /// Enabled.
    On = 1,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// One of the five configuration memory slots on the device.
///
/// The device stores voltage and current limits per slot; this driver keeps no
/// copy of them.
#[derive(Debug, Clone, Copy, PartialEq, EnumIter)]
#[repr(u8)]
pub enum MemorySlot {
    M1 = 1,
    M2 = 2,
    M3 = 3,
    M4 = 4,
    M5 = 5,
}

impl TryFrom<u8> for MemorySlot {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MemorySlot::M1),
            2 => Ok(MemorySlot::M2),
            3 => Ok(MemorySlot::M3),
            4 => Ok(MemorySlot::M4),
            5 => Ok(MemorySlot::M5),
            _ => Err(()),
        }
    }
}

impl From<MemorySlot> for u8 {
    fn from(value: MemorySlot) -> Self {
        value as u8
    }
}

/// A decoded device response.
///
/// The protocol gives no type information on the wire; a reply is a number if
/// it parses as one and text otherwise. Callers pattern-match explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<const L: usize> {
    /// The response parsed as a floating-point number.
    Number(f64),
    /// Fallback: the response bytes as a UTF-8 string, unmodified.
    Text(heapless::String<L>),
}

/// Why a raw response could not be decoded.
#[derive(Debug)]
pub(crate) enum DecodeError {
    Utf8(core::str::Utf8Error),
    Capacity,
}

impl<const L: usize> Value<L> {
    /// Decode raw response bytes as a number, falling back to text.
    ///
    /// The whole buffer must be a numeric literal for the number path to be
    /// taken; there is no partial parsing or whitespace stripping. Bytes that
    /// are not valid UTF-8 fail rather than being replaced.
    pub(crate) fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let text = core::str::from_utf8(raw).map_err(DecodeError::Utf8)?;
        if let Ok(number) = text.parse::<f64>() {
            return Ok(Value::Number(number));
        }
        let mut owned = heapless::String::new();
        owned.push_str(text).map_err(|_| DecodeError::Capacity)?;
        Ok(Value::Text(owned))
    }
}
