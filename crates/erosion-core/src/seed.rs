//! Deterministic per-fragment seeds.
//!
//! A seed is a 32-bit FNV-1a hash of `"{artifact_id}:{fragment_index}"`,
//! normalized into `[0, 1)`. No platform randomness is involved, so the same
//! artifact always erodes in the same order on every machine.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// `2^32`, so the largest hash still maps strictly below 1.0.
const HASH_SPACE: f64 = 4_294_967_296.0;

/// 32-bit FNV-1a over raw bytes.
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut h = FNV_OFFSET;
    for b in bytes {
        h ^= u32::from(*b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Stable pseudo-random value in `[0, 1)` for a fragment of an artifact.
pub fn seed(artifact_id: &str, fragment_index: u32) -> f64 {
    let key = format!("{artifact_id}:{fragment_index}");
    f64::from(fnv1a32(key.as_bytes())) / HASH_SPACE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fnv_empty_is_offset_basis() {
        assert_eq!(fnv1a32(b""), FNV_OFFSET);
    }

    #[test]
    fn fnv_known_vectors() {
        // Reference values for 32-bit FNV-1a.
        assert_eq!(fnv1a32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn seed_is_stable() {
        let a = seed("artifact123abc", 4);
        let b = seed("artifact123abc", 4);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn seed_differs_between_fragments() {
        let values: Vec<f64> = (0..16).map(|i| seed("artifact123abc", i)).collect();
        for i in 0..values.len() {
            for j in (i + 1)..values.len() {
                assert_ne!(values[i], values[j], "fragments {i} and {j} collided");
            }
        }
    }

    #[test]
    fn seed_differs_between_artifacts() {
        assert_ne!(seed("alpha", 0), seed("beta", 0));
    }

    #[test]
    fn max_hash_stays_below_one() {
        assert!(f64::from(u32::MAX) / HASH_SPACE < 1.0);
    }

    proptest! {
        #[test]
        fn seed_in_unit_interval(id in ".{0,40}", idx in any::<u32>()) {
            let s = seed(&id, idx);
            prop_assert!((0.0..1.0).contains(&s), "seed {s} out of range");
        }

        #[test]
        fn seed_deterministic(id in "[a-z0-9]{1,24}", idx in 0u32..10_000) {
            prop_assert_eq!(seed(&id, idx).to_bits(), seed(&id, idx).to_bits());
        }
    }
}
