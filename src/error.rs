//! Our error types for the KORAD PSUs.

use thiserror::Error;

use crate::types::DecodeError;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for KORAD PSU communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("serial communication error")]
    SerialError(I),
    #[error("argument outside the range accepted by the device")]
    InvalidRange,
    #[error("response did not fit in the receive buffer")]
    BufferError,
    #[error("invalid response received")]
    InvalidResponse,
    #[error("response is not valid UTF-8")]
    Utf8Error(core::str::Utf8Error),
}

impl<I: embedded_io::Error> From<DecodeError> for Error<I> {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Utf8(err) => Error::Utf8Error(err),
            DecodeError::Capacity => Error::BufferError,
        }
    }
}
