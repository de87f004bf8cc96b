#![no_main]

use libfuzzer_sys::fuzz_target;
use tsxor::{decode, Encoder};

const T0: u32 = 1_700_000_000;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Bytes are interpreted as (ts_delta: u16, value_bits: u64) tuples.
    let mut enc = Encoder::new(T0);
    let mut samples = Vec::new();
    let mut t = T0;
    for chunk in data.chunks(10) {
        if chunk.len() < 10 {
            break;
        }
        let delta = u32::from(u16::from_le_bytes([chunk[0], chunk[1]]));
        let bits = u64::from_le_bytes([
            chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7], chunk[8], chunk[9],
        ]);
        // The first sample must stay within the 14-bit header field.
        t = if samples.is_empty() {
            T0 + delta % 16384
        } else {
            t.wrapping_add(delta)
        };
        let v = f64::from_bits(bits);
        enc.push(t, v).unwrap();
        samples.push((t, v));
    }
    enc.finish();
    let bytes = enc.bytes();

    // Property 1: the header is the anchor, big-endian
    assert_eq!(&bytes[..4], T0.to_be_bytes(), "header mismatch");

    // Property 2: decoding yields the exact input, values compared as bits
    let decoded = decode(bytes).expect("finished block must decode");
    assert_eq!(decoded.len(), samples.len(), "count mismatch");
    assert_eq!(decoded.len(), enc.count(), "count() mismatch");
    for (s, &(t, v)) in decoded.iter().zip(samples.iter()) {
        assert_eq!(s.t, t, "timestamp mismatch");
        assert_eq!(s.v.to_bits(), v.to_bits(), "value mismatch");
    }
});
