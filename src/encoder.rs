//! Encoder for tsxor compressed blocks.

use serde::{Deserialize, Serialize};

use crate::bitstream::BitWriter;
use crate::decoder::Decoder;
use crate::error::{DecodeError, PushError};

/// Largest distance (in ticks) the first sample may sit from the block
/// anchor: the first timestamp delta is stored as an unsigned 14-bit field.
pub const MAX_FIRST_DELTA: u32 = (1 << 14) - 1;

/// The active XOR window: leading/trailing zero counts of the last
/// newly-established significant-bit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Window {
    leading: u8,
    trailing: u8,
}

/// Encoder for one compressed block
///
/// Accumulates `(u32, f64)` samples and produces a self-delimiting
/// bit-packed byte sequence. Timestamps are compressed with delta-of-delta
/// prefix codes, values with XOR-against-previous packing.
///
/// A block is anchored at a base timestamp `t0`; the first pushed sample
/// must lie within [`MAX_FIRST_DELTA`] ticks of it. Call
/// [`finish`](Self::finish) before handing [`bytes`](Self::bytes) to a
/// decoder.
///
/// The encoder is serializable, so a partially filled block can be persisted
/// and resumed later.
///
/// # Example
/// ```
/// use tsxor::{decode, Encoder};
///
/// let mut enc = Encoder::new(1_700_000_000);
/// enc.push(1_700_000_000, 23.5).unwrap();
/// enc.push(1_700_000_060, 23.5).unwrap();
/// enc.push(1_700_000_120, 24.0).unwrap();
/// enc.finish();
///
/// let samples = decode(enc.bytes()).unwrap();
/// assert_eq!(samples.len(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoder {
    w: BitWriter,
    t0: u32,
    /// Timestamp of the most recent sample
    t_prev: u32,
    /// Most recent timestamp delta
    t_delta_prev: u32,
    /// Raw bits of the most recent value
    v_prev_bits: u64,
    window: Option<Window>,
    count: u32,
    finished: bool,
}

impl Encoder {
    /// Create a new encoder anchored at `t0` and write the block header
    #[must_use]
    pub fn new(t0: u32) -> Self {
        let mut w = BitWriter::with_capacity(128);
        w.write_bits(u64::from(t0), 32);
        Self {
            w,
            t0,
            t_prev: 0,
            t_delta_prev: 0,
            v_prev_bits: 0,
            window: None,
            count: 0,
            finished: false,
        }
    }

    /// Block anchor timestamp
    #[inline]
    #[must_use]
    pub fn t0(&self) -> u32 {
        self.t0
    }

    /// Number of samples pushed so far
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Current encoded size in bytes (grows monotonically with each push)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.w.as_bytes().len()
    }

    /// Always false: the block header is written at construction
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.w.as_bytes().is_empty()
    }

    /// Whether [`finish`](Self::finish) has been called
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append a sample
    ///
    /// Timestamps are expected to be non-decreasing in the typical case;
    /// any `u32` sequence round-trips as long as the first sample is in
    /// range, since timestamp arithmetic wraps mod 2^32 on both sides.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The series was already finished
    /// - This is the first sample and `t` is not within [`MAX_FIRST_DELTA`]
    ///   ticks at or after the anchor
    pub fn push(&mut self, t: u32, v: f64) -> Result<(), PushError> {
        if self.finished {
            return Err(PushError::Finished);
        }

        if self.count == 0 {
            let t_delta = t.wrapping_sub(self.t0);
            if t_delta > MAX_FIRST_DELTA {
                return Err(PushError::FirstDeltaOutOfRange { t, t0: self.t0 });
            }
            self.w.write_bits(u64::from(t_delta), 14);
            self.w.write_bits(v.to_bits(), 64);
            self.t_prev = t;
            self.t_delta_prev = t_delta;
            self.v_prev_bits = v.to_bits();
            self.count = 1;
            return Ok(());
        }

        let t_delta = t.wrapping_sub(self.t_prev);
        let dod = t_delta.wrapping_sub(self.t_delta_prev) as i32;
        self.write_dod(dod);
        self.write_value(v.to_bits());

        self.t_delta_prev = t_delta;
        self.t_prev = t;
        self.count += 1;
        Ok(())
    }

    /// Write the end-of-stream marker and flush to a byte boundary.
    /// Idempotent.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        // The marker reuses the widest timestamp prefix with an all-ones
        // payload, a delta-of-delta no sample can produce. The trailing zero
        // bit stands in for the value-changed flag the decoder expects after
        // every record.
        self.w.write_bits(0b1111, 4);
        self.w.write_bits(0xffff_ffff, 32);
        self.w.write_bit(false);
        self.w.flush(false);
        self.finished = true;
    }

    /// Current byte contents; the complete encoded block once
    /// [`finish`](Self::finish) has been called
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.w.as_bytes()
    }

    /// Consume the encoder and return the encoded bytes
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.w.into_bytes()
    }

    /// Decode this block back into a sample cursor
    ///
    /// Meaningful after [`finish`](Self::finish); iterating an unfinished
    /// block is undefined past the last fully-encoded sample.
    ///
    /// # Errors
    /// Returns an error if the header cannot be read back.
    pub fn iter(&self) -> Result<Decoder<'_>, DecodeError> {
        Decoder::new(self.bytes())
    }

    /// Delta-of-delta prefix code, smallest container first:
    ///
    /// | dod            | prefix  | payload |
    /// |----------------|---------|---------|
    /// | 0              | `0`     | —       |
    /// | [-63, 64]      | `10`    | 7 bits  |
    /// | [-255, 256]    | `110`   | 9 bits  |
    /// | [-2047, 2048]  | `1110`  | 12 bits |
    /// | otherwise      | `1111`  | 32 bits |
    fn write_dod(&mut self, dod: i32) {
        if dod == 0 {
            self.w.write_bit(false);
        } else if (-63..=64).contains(&dod) {
            self.w.write_bits(0b10, 2);
            self.w.write_bits(u64::from(dod as u32), 7);
        } else if (-255..=256).contains(&dod) {
            self.w.write_bits(0b110, 3);
            self.w.write_bits(u64::from(dod as u32), 9);
        } else if (-2047..=2048).contains(&dod) {
            self.w.write_bits(0b1110, 4);
            self.w.write_bits(u64::from(dod as u32), 12);
        } else {
            self.w.write_bits(0b1111, 4);
            self.w.write_bits(u64::from(dod as u32), 32);
        }
    }

    fn write_value(&mut self, bits: u64) {
        let xor = bits ^ self.v_prev_bits;
        self.v_prev_bits = bits;

        if xor == 0 {
            self.w.write_bit(false);
            return;
        }
        self.w.write_bit(true);

        // The leading count field is 5 bits wide; counts past 31 clamp.
        let leading = (xor.leading_zeros() as u8).min(31);
        let trailing = xor.trailing_zeros() as u8;

        match self.window {
            Some(win) if leading >= win.leading && trailing >= win.trailing => {
                // Significant bits fit inside the active window.
                self.w.write_bit(false);
                let mbits = 64 - win.leading - win.trailing;
                self.w.write_bits(xor >> win.trailing, mbits);
            }
            _ => {
                self.window = Some(Window { leading, trailing });
                self.w.write_bit(true);
                self.w.write_bits(u64::from(leading), 5);
                // sigbits == 64 (no leading, no trailing zeros) wraps to 0
                // in the 6-bit field; the decoder reads 0 as 64.
                let sigbits = 64 - leading - trailing;
                self.w.write_bits(u64::from(sigbits) & 0x3f, 6);
                self.w.write_bits(xor >> trailing, sigbits);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_written_at_construction() {
        let enc = Encoder::new(0xDEAD_BEEF);
        assert_eq!(enc.bytes(), 0xDEAD_BEEFu32.to_be_bytes());
    }

    #[test]
    fn push_after_finish_rejected() {
        let mut enc = Encoder::new(1000);
        enc.push(1000, 1.0).unwrap();
        enc.finish();
        assert_eq!(enc.push(1060, 2.0), Err(PushError::Finished));
    }

    #[test]
    fn first_delta_out_of_range_rejected() {
        let mut enc = Encoder::new(1000);
        assert_eq!(
            enc.push(1000 + MAX_FIRST_DELTA + 1, 1.0),
            Err(PushError::FirstDeltaOutOfRange {
                t: 1000 + MAX_FIRST_DELTA + 1,
                t0: 1000
            })
        );
        // Before the anchor wraps out of range too.
        assert_eq!(
            enc.push(999, 1.0),
            Err(PushError::FirstDeltaOutOfRange { t: 999, t0: 1000 })
        );
        assert_eq!(enc.count(), 0);
        // The boundary itself is accepted.
        enc.push(1000 + MAX_FIRST_DELTA, 1.0).unwrap();
        assert_eq!(enc.count(), 1);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut enc = Encoder::new(0);
        enc.push(10, 1.5).unwrap();
        enc.finish();
        let first = enc.bytes().to_vec();
        enc.finish();
        assert_eq!(enc.bytes(), first);
    }

    #[test]
    fn empty_block_size_is_fixed() {
        let mut enc = Encoder::new(1000);
        enc.finish();
        // 32-bit header + 37-bit end marker, padded: 9 bytes.
        assert_eq!(enc.len(), 9);
        let mut again = Encoder::new(1000);
        again.finish();
        assert_eq!(enc.bytes(), again.bytes());
    }
}
