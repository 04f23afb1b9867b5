//! Error type shared by the control-side API.

use std::fmt;

/// Everything that can go wrong when driving a generator.
///
/// All variants are recoverable: the generator that returned the error is
/// left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The output device could not be opened, or it has gone away.
    ///
    /// `start()` may be retried later (e.g. after the device is plugged back in).
    DeviceUnavailable(String),
    /// A parameter was outside its accepted range.
    InvalidParameter { name: &'static str, value: f32 },
    /// The operation does not apply to this generator.
    UnsupportedOperation(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceUnavailable(reason) => write!(f, "Audio output unavailable: {reason}"),
            Error::InvalidParameter { name, value } => write!(f, "Invalid {name}: {value}"),
            Error::UnsupportedOperation(op) => write!(f, "Unsupported operation: {op}"),
        }
    }
}

impl std::error::Error for Error {}

/// Check that a volume lies in `[0, 1]`.
pub(crate) fn check_volume(volume: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err(Error::InvalidParameter { name: "volume", value: volume })
    }
}

/// Check a binaural frequency pair. `beat` may be zero or negative.
pub(crate) fn check_frequencies(base: f32, beat: f32) -> Result<(f32, f32)> {
    if !base.is_finite() || base <= 0.0 {
        return Err(Error::InvalidParameter { name: "base frequency", value: base });
    }
    if !beat.is_finite() {
        return Err(Error::InvalidParameter { name: "beat frequency", value: beat });
    }
    Ok((base, beat))
}
