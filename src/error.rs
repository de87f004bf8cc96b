//! Error types for tsxor encoding and decoding operations.

use std::fmt;

/// Error returned when pushing a sample fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// First sample's timestamp is out of the 14-bit delta range from the
    /// block anchor (covers `t < t0`, which wraps out of range)
    FirstDeltaOutOfRange { t: u32, t0: u32 },
    /// The series was already finished; no further samples can be pushed
    Finished,
}

/// Error returned when decoding fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is too short to contain the 32-bit block header
    TruncatedHeader { actual: usize },
    /// Bit stream ended before a complete field was read
    UnexpectedEnd,
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstDeltaOutOfRange { t, t0 } => {
                write!(
                    f,
                    "first timestamp {t} is not within 16383 ticks of block anchor {t0}"
                )
            }
            Self::Finished => write!(f, "series is finished"),
        }
    }
}

impl std::error::Error for PushError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader { actual } => {
                write!(
                    f,
                    "buffer too short for header: expected at least 4 bytes, got {actual}"
                )
            }
            Self::UnexpectedEnd => write!(f, "bit stream ended unexpectedly"),
        }
    }
}

impl std::error::Error for DecodeError {}
