use proptest::prelude::*;

use crate::{decode, DecodeError, Encoder};

prop_compose! {
    /// Arbitrary sample sequences: any anchor, any in-range first offset,
    /// then unconstrained u32 timestamp steps (wraparound included) and
    /// unconstrained f64 bit patterns (NaNs included).
    fn arb_samples()(
        t0 in any::<u32>(),
        first_off in 0u32..16384,
        first_bits in any::<u64>(),
        steps in prop::collection::vec((any::<u32>(), any::<u64>()), 0..200),
    ) -> (u32, Vec<(u32, f64)>) {
        let mut t = t0.wrapping_add(first_off);
        let mut samples = vec![(t, f64::from_bits(first_bits))];
        for (delta, bits) in steps {
            t = t.wrapping_add(delta);
            samples.push((t, f64::from_bits(bits)));
        }
        (t0, samples)
    }
}

prop_compose! {
    /// Near-regular cadence with a slowly drifting value, the shape the
    /// codec is optimized for.
    fn arb_regular_samples()(
        t0 in 0u32..2_000_000_000,
        cadence in 1u32..3600,
        jitters in prop::collection::vec(-2i64..=2, 1..300),
        drifts in prop::collection::vec(-50i64..=50, 1..300),
    ) -> (u32, Vec<(u32, f64)>) {
        let mut v = 20.0f64;
        let samples = jitters.iter().zip(drifts.iter()).enumerate()
            .map(|(i, (&jitter, &drift))| {
                // The first sample must not jitter behind the anchor.
                let jitter = if i == 0 { jitter.max(0) } else { jitter };
                let t = t0
                    .wrapping_add(i as u32 * cadence)
                    .wrapping_add(jitter as u32);
                v += drift as f64 * 0.01;
                (t, v)
            })
            .collect();
        (t0, samples)
    }
}

fn encode_block(t0: u32, samples: &[(u32, f64)]) -> Encoder {
    let mut enc = Encoder::new(t0);
    for &(t, v) in samples {
        enc.push(t, v).unwrap();
    }
    enc.finish();
    enc
}

proptest! {
    /// Property: decoding the encoding yields the exact input, timestamps
    /// as u32 and values as IEEE-754 bit patterns
    #[test]
    fn prop_roundtrip((t0, samples) in arb_samples()) {
        let enc = encode_block(t0, &samples);
        let decoded = decode(enc.bytes()).unwrap();
        prop_assert_eq!(decoded.len(), samples.len());
        for (s, &(t, v)) in decoded.iter().zip(samples.iter()) {
            prop_assert_eq!(s.t, t);
            prop_assert_eq!(s.v.to_bits(), v.to_bits());
        }
    }

    /// Property: the regular-cadence shape round-trips too
    #[test]
    fn prop_roundtrip_regular((t0, samples) in arb_regular_samples()) {
        let enc = encode_block(t0, &samples);
        let decoded = decode(enc.bytes()).unwrap();
        prop_assert_eq!(decoded.len(), samples.len());
        for (s, &(t, v)) in decoded.iter().zip(samples.iter()) {
            prop_assert_eq!(s.t, t);
            prop_assert_eq!(s.v.to_bits(), v.to_bits());
        }
    }

    /// Property: the first 32 bits of any block are the anchor, big-endian
    #[test]
    fn prop_header_exactness((t0, samples) in arb_samples()) {
        let enc = encode_block(t0, &samples);
        prop_assert_eq!(&enc.bytes()[..4], t0.to_be_bytes());
    }

    /// Property: decoded length equals count()
    #[test]
    fn prop_count_consistency((t0, samples) in arb_samples()) {
        let enc = encode_block(t0, &samples);
        prop_assert_eq!(decode(enc.bytes()).unwrap().len(), enc.count());
    }

    /// Property: finishing twice produces the same bytes as finishing once
    #[test]
    fn prop_idempotent_finish((t0, samples) in arb_samples()) {
        let mut enc = encode_block(t0, &samples);
        let once = enc.bytes().to_vec();
        enc.finish();
        prop_assert_eq!(enc.bytes(), once);
    }

    /// Property: push never shrinks the buffer
    #[test]
    fn prop_monotone_length((t0, samples) in arb_samples()) {
        let mut enc = Encoder::new(t0);
        let mut prev = enc.len();
        for &(t, v) in &samples {
            enc.push(t, v).unwrap();
            prop_assert!(enc.len() >= prev);
            prev = enc.len();
        }
    }

    /// Property: truncating a finished block is detected. Cuts through the
    /// header report `TruncatedHeader`; cuts anywhere in the record stream
    /// latch `UnexpectedEnd`. (Cuts inside the first record's head or in
    /// the final pad byte are exercised but left unasserted: a sub-record
    /// tail is undefined input.)
    #[test]
    fn prop_truncation_detected((t0, samples) in arb_samples(), frac in 0.0f64..1.0) {
        let enc = encode_block(t0, &samples);
        let bytes = enc.bytes();
        prop_assert!(decode(bytes).is_ok());

        let cut = ((bytes.len() as f64 * frac) as usize).min(bytes.len() - 1);
        let result = decode(&bytes[..cut]);
        if cut < 4 {
            prop_assert_eq!(result, Err(DecodeError::TruncatedHeader { actual: cut }));
        } else if cut >= 14 && cut < bytes.len() - 1 {
            prop_assert_eq!(result, Err(DecodeError::UnexpectedEnd));
        }
    }
}
