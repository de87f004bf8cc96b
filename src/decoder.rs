//! Decoder for tsxor compressed blocks.

use crate::bitstream::BitReader;
use crate::error::DecodeError;
use crate::sample::Sample;

/// Bits a first-sample record occupies: 14-bit timestamp delta plus a raw
/// 64-bit value. A finished empty block carries only the (shorter)
/// end-of-stream marker after the header, which is how the two are told
/// apart.
const FIRST_SAMPLE_BITS: usize = 14 + 64;

/// Cursor over one compressed block
///
/// Mirrors the encoder's state machine and reconstructs samples one at a
/// time. [`next`](Self::next) advances and returns `true` while a sample is
/// ready; afterwards [`values`](Self::values) holds the sample. When `next`
/// returns `false`, [`err`](Self::err) distinguishes normal end-of-stream
/// (`None`) from a truncated stream.
///
/// # Example
/// ```
/// use tsxor::{Decoder, Encoder};
///
/// let mut enc = Encoder::new(1000);
/// enc.push(1060, 3.14).unwrap();
/// enc.finish();
///
/// let mut it = Decoder::new(enc.bytes()).unwrap();
/// while it.next() {
///     let (t, v) = it.values();
///     println!("{t}: {v}");
/// }
/// assert_eq!(it.err(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    r: BitReader<'a>,
    t0: u32,
    t: u32,
    t_delta: u32,
    v_bits: u64,
    leading: u8,
    trailing: u8,
    started: bool,
    finished: bool,
    err: Option<DecodeError>,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over an encoded block and read the 32-bit header
    ///
    /// # Errors
    /// Returns `TruncatedHeader` if fewer than 4 bytes are available.
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let mut r = BitReader::new(bytes);
        let t0 = r
            .read_bits(32)
            .map_err(|_| DecodeError::TruncatedHeader { actual: bytes.len() })?;
        Ok(Self {
            r,
            t0: t0 as u32,
            t: 0,
            t_delta: 0,
            v_bits: 0,
            leading: 0,
            trailing: 0,
            started: false,
            finished: false,
            err: None,
        })
    }

    /// Block anchor timestamp from the header
    #[inline]
    #[must_use]
    pub fn t0(&self) -> u32 {
        self.t0
    }

    /// Advance to the next sample. Returns `true` if a sample is ready,
    /// `false` on end-of-stream or after an error has been latched.
    pub fn next(&mut self) -> bool {
        if self.finished || self.err.is_some() {
            return false;
        }
        match self.step() {
            Ok(true) => true,
            Ok(false) => {
                self.finished = true;
                false
            }
            Err(e) => {
                self.err = Some(e);
                false
            }
        }
    }

    /// The last yielded sample; meaningful after [`next`](Self::next)
    /// returned `true`
    #[inline]
    #[must_use]
    pub fn values(&self) -> (u32, f64) {
        (self.t, f64::from_bits(self.v_bits))
    }

    /// The latched error, if iteration stopped on one
    #[inline]
    #[must_use]
    pub fn err(&self) -> Option<DecodeError> {
        self.err
    }

    /// Consume the cursor and iterate samples as `Result` items
    #[must_use]
    pub fn samples(self) -> Samples<'a> {
        Samples {
            inner: self,
            done: false,
        }
    }

    fn step(&mut self) -> Result<bool, DecodeError> {
        if !self.started {
            return self.read_first();
        }

        // Timestamp prefix: up to four leading ones.
        let mut d = 0u8;
        for _ in 0..4 {
            d <<= 1;
            if !self.r.read_bit()? {
                break;
            }
            d |= 1;
        }

        let mut dod = 0i32;
        match d {
            0b0000 => {}
            0b0010 => dod = Self::decode_signed(self.r.read_bits(7)?, 7),
            0b0110 => dod = Self::decode_signed(self.r.read_bits(9)?, 9),
            0b1110 => dod = Self::decode_signed(self.r.read_bits(12)?, 12),
            _ => {
                let raw = self.r.read_bits(32)?;
                if raw == 0xffff_ffff {
                    // End-of-stream marker.
                    return Ok(false);
                }
                dod = raw as u32 as i32;
            }
        }

        self.t_delta = self.t_delta.wrapping_add(dod as u32);
        self.t = self.t.wrapping_add(self.t_delta);

        self.read_value()?;
        Ok(true)
    }

    fn read_first(&mut self) -> Result<bool, DecodeError> {
        if self.r.remaining() < FIRST_SAMPLE_BITS {
            // Only the end-of-stream marker fits in this tail.
            if self.r.read_bits(4)? == 0b1111 && self.r.read_bits(32)? == 0xffff_ffff {
                return Ok(false);
            }
            return Err(DecodeError::UnexpectedEnd);
        }

        let t_delta = self.r.read_bits(14)? as u32;
        let raw = self.r.read_bits(64)?;
        self.t_delta = t_delta;
        self.t = self.t0.wrapping_add(t_delta);
        self.v_bits = raw;
        self.started = true;
        Ok(true)
    }

    fn read_value(&mut self) -> Result<(), DecodeError> {
        if !self.r.read_bit()? {
            // XOR is zero; value unchanged.
            return Ok(());
        }

        if self.r.read_bit()? {
            // New window.
            let leading = self.r.read_bits(5)? as u8;
            let sigbits = match self.r.read_bits(6)? as u8 {
                // A zero field means all 64 bits are significant.
                0 => 64,
                n => n,
            };
            let span = u32::from(leading) + u32::from(sigbits);
            if span > 64 {
                return Err(DecodeError::UnexpectedEnd);
            }
            self.leading = leading;
            self.trailing = (64 - span) as u8;
        }

        let mbits = 64 - self.leading - self.trailing;
        let significant = self.r.read_bits(mbits)?;
        self.v_bits ^= significant << self.trailing;
        Ok(())
    }

    /// Decode an `sz`-bit payload holding the low bits of a signed value.
    /// Strictly-greater comparison: `2^(sz-1)` itself decodes positive,
    /// matching the encoder's asymmetric tier ranges.
    #[inline]
    fn decode_signed(raw: u64, sz: u8) -> i32 {
        if raw > 1 << (sz - 1) {
            (raw as i64 - (1i64 << sz)) as i32
        } else {
            raw as i32
        }
    }
}

/// Consuming iterator over a [`Decoder`], yielding each sample or the first
/// latched error
#[derive(Debug)]
pub struct Samples<'a> {
    inner: Decoder<'a>,
    done: bool,
}

impl Iterator for Samples<'_> {
    type Item = Result<Sample, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.inner.next() {
            let (t, v) = self.inner.values();
            return Some(Ok(Sample::new(t, v)));
        }
        self.done = true;
        self.inner.err().map(Err)
    }
}
