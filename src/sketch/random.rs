//! Random sources for sketch jitter.
//!
//! Sketches never reach for global randomness; the controller hands them a
//! `&mut dyn RandomSource` every tick. Production runs use [`Rng64`], tests
//! plug in a fixed source to make output exact.

/// Uniform sample source.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_f64_01(&mut self) -> f64;

    /// Uniform sample in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64_01()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64_01(&mut self) -> f64 {
        (**self).next_f64_01()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64_01(&mut self) -> f64 {
        (**self).next_f64_01()
    }
}

/// SplitMix64 generator.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the wall clock, for runs that are meant to differ every time.
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos ^ u64::from(std::process::id()).rotate_left(32))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl RandomSource for Rng64 {
    fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// Returns the same unit sample forever. `Fixed(0.0)` removes all jitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fixed(pub f64);

impl RandomSource for Fixed {
    fn next_f64_01(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_deterministic() {
        let mut a = Rng64::new(123);
        let mut b = Rng64::new(123);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn uniform_stays_in_half_open_range() {
        let mut rng = Rng64::new(9);
        for _ in 0..10_000 {
            let v = rng.uniform(0.0, 6.0);
            assert!((0.0..6.0).contains(&v));
        }
    }

    #[test]
    fn fixed_source_never_reaches_upper_bound() {
        let mut src = Fixed(1.0);
        assert!(src.uniform(0.0, 10.0) < 10.0);
        assert_eq!(Fixed(0.0).uniform(3.0, 9.0), 3.0);
        assert_eq!(Fixed(0.5).uniform(0.0, 10.0), 5.0);
    }

    #[test]
    fn boxed_and_borrowed_sources_forward() {
        let mut boxed: Box<dyn RandomSource> = Box::new(Fixed(0.25));
        assert_eq!(boxed.uniform(0.0, 4.0), 1.0);

        fn draw<R: RandomSource>(mut src: R) -> f64 {
            src.uniform(0.0, 2.0)
        }
        let mut inner = Fixed(0.5);
        assert_eq!(draw(&mut inner), 1.0);
    }
}
