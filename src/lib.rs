//! `tsxor` - Lossless Gorilla-style time series compression
//!
//! A bit-packed streaming codec for `(timestamp, value)` samples, after the
//! scheme described in *"Gorilla: A Fast, Scalable, In-Memory Time Series
//! Database"* (VLDB 2015). One encoder produces one self-delimiting block;
//! typical monitoring data compresses to a byte or two per sample.
//!
//! # Features
//! - **Lossless**: timestamps round-trip as `u32`, values bit-for-bit as
//!   IEEE-754 doubles (NaN payloads and signed zeros included)
//! - **Streaming**: O(1) append, no re-encoding; the decoder yields one
//!   sample at a time over a borrowed byte slice
//! - **Self-delimiting**: blocks end with a reserved marker, so no external
//!   length or count needs to be stored
//! - **Resumable**: the encoder serializes with serde mid-block
//!
//! # Example
//! ```
//! use tsxor::{decode, Encoder};
//!
//! let mut enc = Encoder::new(1_700_000_000);
//! enc.push(1_700_000_000, 22.0).unwrap();
//! enc.push(1_700_000_060, 22.0).unwrap(); // one minute later
//! enc.push(1_700_000_120, 22.5).unwrap(); // value changed
//! enc.finish();
//!
//! let bytes = enc.bytes();
//! println!("encoded size: {} bytes", bytes.len());
//!
//! for s in decode(bytes).unwrap() {
//!     println!("t={}, v={}", s.t, s.v);
//! }
//! ```
//!
//! # Encoding Format
//!
//! All fields are MSB-first. A block opens with a 32-bit anchor timestamp
//! `t0`, then a first-sample record: the first timestamp as an unsigned
//! 14-bit delta from the anchor, and the first value as its raw 64 bits.
//!
//! Every further sample is a timestamp record followed by a value record.
//!
//! Timestamps store the change between consecutive deltas (`dod`), sized by
//! prefix code:
//! - `0` — dod is zero (regular cadence)
//! - `10` + 7 bits — dod in [-63, 64]
//! - `110` + 9 bits — dod in [-255, 256]
//! - `1110` + 12 bits — dod in [-2047, 2048]
//! - `1111` + 32 bits — anything else
//!
//! Payloads hold the low bits of the signed value; on decode, anything
//! strictly above `2^(n-1)` wraps negative, which is what makes the upper
//! bounds asymmetric.
//!
//! Values store the XOR against the previous value:
//! - `0` — identical value
//! - `10` + significant bits — the XOR fits the active leading/trailing
//!   zero window
//! - `11` + 5-bit leading count + 6-bit length + significant bits — a new
//!   window
//!
//! The block terminates with `1111`, 32 one-bits, a single zero bit, and
//! zero-padding to the byte boundary.
//!
//! # Supported Ranges
//! - First sample: within 16383 ticks at or after the anchor
//! - Later timestamps: any `u32`; arithmetic wraps mod 2^32 on both sides
//! - Values: any `f64` bit pattern

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod bitstream;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod sample;

pub use decoder::{Decoder, Samples};
pub use encoder::{Encoder, MAX_FIRST_DELTA};
pub use error::{DecodeError, PushError};
pub use sample::Sample;

#[cfg(test)]
mod tests;

/// Decode a complete block back to samples
///
/// # Arguments
/// * `bytes` - Encoded block from [`Encoder::bytes`], after
///   [`Encoder::finish`]
///
/// # Errors
/// Returns an error if the header is truncated or the stream ends before
/// its end-of-stream marker.
pub fn decode(bytes: &[u8]) -> Result<Vec<Sample>, DecodeError> {
    let mut it = Decoder::new(bytes)?;
    let mut out = Vec::new();
    while it.next() {
        let (t, v) = it.values();
        out.push(Sample::new(t, v));
    }
    match it.err() {
        Some(e) => Err(e),
        None => Ok(out),
    }
}
