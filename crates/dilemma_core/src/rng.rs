//! Deterministic random stream shared by every stochastic decision.
//!
//! Probabilities are compared in fixed point: a rate is an integer in
//! `[0, FIXED_ONE]` and a draw is an integer in `[0, FIXED_ONE)`, so the same
//! seed produces the same run on every platform.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of fractional bits in a fixed-point probability.
pub const FIXED_BITS: u32 = 32;
/// Fixed-point encoding of probability 1.
pub const FIXED_ONE: u64 = 1 << FIXED_BITS;

/// Encodes a probability as fixed point, clamping to `[0, 1]`.
#[must_use]
pub fn to_fixed(x: f64) -> u64 {
    if x.is_nan() || x <= 0.0 {
        0
    } else if x >= 1.0 {
        FIXED_ONE
    } else {
        (x * FIXED_ONE as f64).round() as u64
    }
}

/// Decodes a fixed-point probability.
#[must_use]
pub fn from_fixed(value: u64) -> f64 {
    value as f64 / FIXED_ONE as f64
}

/// Complete internal state of a [`RandomStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamState {
    /// ChaCha key.
    pub key: [u8; 32],
    /// Stream id (nonce).
    pub stream: u64,
    /// Position in the keystream, in 32-bit words.
    pub word_pos: u128,
}

/// The simulation's single source of randomness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    rng: ChaCha8Rng,
}

impl RandomStream {
    /// Creates a stream from a seed. Equal seeds give equal sequences.
    #[must_use]
    pub fn seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform double in the open interval `(0, 1)`.
    pub fn next_unit_interval(&mut self) -> f64 {
        ((self.next_u64() >> 11) as f64 + 0.5) / (1u64 << 53) as f64
    }

    /// Uniform fixed-point value in `[0, FIXED_ONE)`.
    pub fn next_fixed(&mut self) -> u64 {
        self.next_u64() >> (64 - FIXED_BITS)
    }

    /// True with probability `rate / FIXED_ONE`.
    pub fn chance(&mut self, rate: u64) -> bool {
        self.next_fixed() < rate
    }

    /// Uniform integer in `[0, n)` from exactly one draw.
    ///
    /// Uses the high half of a 64x64-bit product, so the bias is at most
    /// `n / 2^64` and the draw count never depends on the value.
    ///
    /// # Panics
    /// If `n` is zero.
    pub fn below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "below() needs a non-empty range");
        ((u128::from(self.next_u64()) * u128::from(n)) >> 64) as u64
    }

    /// Fair coin; `true` selects the first of two alternatives.
    pub fn coin(&mut self) -> bool {
        self.below(2) == 0
    }

    /// Uniform offset in `[-radius, radius]`.
    pub fn offset(&mut self, radius: u32) -> i64 {
        let span = 2 * u64::from(radius) + 1;
        self.below(span) as i64 - i64::from(radius)
    }

    /// Captures the full generator state.
    #[must_use]
    pub fn snapshot(&self) -> StreamState {
        StreamState {
            key: self.rng.get_seed(),
            stream: self.rng.get_stream(),
            word_pos: self.rng.get_word_pos(),
        }
    }

    /// Rebuilds a stream that continues exactly where the snapshot was taken.
    #[must_use]
    pub fn restore(state: &StreamState) -> Self {
        let mut rng = ChaCha8Rng::from_seed(state.key);
        rng.set_stream(state.stream);
        rng.set_word_pos(state.word_pos);
        Self { rng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomStream::seed(7);
        let mut b = RandomStream::seed(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut c = RandomStream::seed(8);
        assert_ne!(a.next_u64(), c.next_u64());
    }

    #[test]
    fn test_restore_continues_mid_stream() {
        let mut original = RandomStream::seed(99);
        for _ in 0..37 {
            original.next_u64();
        }
        // Leave the block buffer half consumed.
        original.below(5);
        let mut restored = RandomStream::restore(&original.snapshot());
        assert_eq!(restored, original);
        for _ in 0..200 {
            assert_eq!(original.next_u64(), restored.next_u64());
        }
    }

    #[test]
    fn test_to_fixed_bounds() {
        assert_eq!(to_fixed(-0.5), 0);
        assert_eq!(to_fixed(0.0), 0);
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(7.0), FIXED_ONE);
        assert_eq!(to_fixed(f64::NAN), 0);
        assert_eq!(to_fixed(0.5), FIXED_ONE / 2);
        assert!((from_fixed(to_fixed(0.25)) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = RandomStream::seed(1);
        for _ in 0..1000 {
            assert!(!rng.chance(0));
            assert!(rng.chance(FIXED_ONE));
        }
    }

    #[test]
    fn test_draw_ranges() {
        let mut rng = RandomStream::seed(3);
        for _ in 0..1000 {
            let u = rng.next_unit_interval();
            assert!(u > 0.0 && u < 1.0);
            assert!(rng.next_fixed() < FIXED_ONE);
            assert!(rng.below(10) < 10);
            let o = rng.offset(2);
            assert!((-2..=2).contains(&o));
        }
    }
}
