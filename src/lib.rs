//! This crate provides an interface for communicating with and controlling the
//! KORAD KA3005 series of programmable bench power supplies.
//!
//! It supports `no-std` environments by use of the `no_std` feature flag.
//!
//! Example PSU model numbers which this should work with:
//! * KA3005P
//! * KD3005P
//! * KA3010P
//! * KA6003P
//!
//! Rebranded units which speak the same protocol:
//! * Tenma 72-2535 / 72-2540
//! * Velleman PS3005D / LABPS3005D
//! * RND 320-KA3005P
//!
//! The device talks a compact ASCII command protocol with no message
//! terminators. A reply is complete when the line goes quiet, so the serial
//! port must be opened with a short read timeout.
//!
//! The serial port used for PSU comms should be configured like so:
//! * Baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Read timeout: ~50 ms

#![cfg_attr(feature = "no_std", no_std)]

pub mod command;
pub mod error;
pub mod psu;
pub mod status;
pub mod types;

#[cfg(test)]
mod mock_serial;
