//! Test utilities for fitrack

use std::time::{Duration, Instant};

/// Latency sample collector used by timing-resistance tests
pub struct LatencySamples {
    samples: Vec<Duration>,
}

impl LatencySamples {
    pub fn new() -> Self {
        LatencySamples {
            samples: Vec::new(),
        }
    }

    pub fn record_operation<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.samples.push(start.elapsed());
        result
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn percentile(&mut self, p: f64) -> Duration {
        assert!((0.0..=100.0).contains(&p), "Percentile must be between 0 and 100");
        assert!(!self.samples.is_empty(), "No samples recorded");

        self.samples.sort();
        let index = ((p / 100.0) * (self.samples.len() - 1) as f64).round() as usize;
        self.samples[index]
    }

    pub fn p50(&mut self) -> Duration {
        self.percentile(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles_over_known_samples() {
        let mut samples = LatencySamples::new();
        for ms in [5u64, 1, 4, 2, 3] {
            samples.samples.push(Duration::from_millis(ms));
        }
        assert_eq!(samples.len(), 5);
        assert_eq!(samples.p50(), Duration::from_millis(3));
        assert_eq!(samples.percentile(100.0), Duration::from_millis(5));
        assert_eq!(samples.percentile(0.0), Duration::from_millis(1));
    }
}
