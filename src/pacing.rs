use eyre::ensure;
use init4_bin_base::deps::tracing::debug;
use rand::Rng;
use std::time::Duration;

/// Inclusive range of pause lengths, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    /// Create a range from millisecond bounds. Fails if `min_ms > max_ms`.
    pub fn from_millis(min_ms: u64, max_ms: u64) -> eyre::Result<Self> {
        ensure!(
            min_ms <= max_ms,
            "min delay {min_ms}ms is greater than max delay {max_ms}ms"
        );
        Ok(Self { min_ms, max_ms })
    }

    /// A range that never pauses.
    pub const fn zero() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    /// Draw a pause length.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    /// Sleep for a freshly sampled duration.
    pub async fn pause(&self) {
        let delay = self.sample(&mut rand::thread_rng());
        debug!(delay_ms = delay.as_millis() as u64, "pausing");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn samples_are_inclusive_of_both_bounds() {
        let range = DelayRange::from_millis(10, 12).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 3];

        for _ in 0..1_000 {
            let ms = range.sample(&mut rng).as_millis() as u64;
            assert!((10..=12).contains(&ms));
            seen[(ms - 10) as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn zero_range_never_waits() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(DelayRange::zero().sample(&mut rng), Duration::ZERO);
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(DelayRange::from_millis(500, 100).is_err());
        assert!(DelayRange::from_millis(100, 100).is_ok());
    }
}
