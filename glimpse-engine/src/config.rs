//! Detector configuration loaded from the environment.

use std::time::Duration;

/// Tuning for `FeatureDetector`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Extra wait at the end of warmup.
    pub warmup_delay: Duration,
    /// Gaussian blur sigma applied before corner detection.
    pub blur_sigma: f32,
    /// Harris sensitivity constant `k`.
    pub harris_k: f32,
    /// Corner threshold as a fraction of the strongest response.
    pub threshold: f32,
    /// Images larger than this on either side are downscaled first.
    pub max_dimension: u32,
    /// Concurrent detections allowed on the blocking pool.
    pub workers: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            warmup_delay: Duration::ZERO,
            blur_sigma: 1.0,
            harris_k: 0.04,
            threshold: 0.01,
            max_dimension: 2048,
            workers: 4,
        }
    }
}

impl DetectorConfig {
    /// Create DetectorConfig from environment variables.
    ///
    /// Environment variables:
    /// - `GLIMPSE_WARMUP_DELAY_MS`: Extra warmup wait (default: 0)
    /// - `GLIMPSE_DETECTOR_BLUR_SIGMA`: Denoise strength (default: 1.0)
    /// - `GLIMPSE_DETECTOR_THRESHOLD`: Relative corner threshold (default: 0.01)
    /// - `GLIMPSE_DETECTOR_MAX_DIMENSION`: Downscale bound in pixels (default: 2048)
    /// - `GLIMPSE_DETECTOR_WORKERS`: Concurrent detections (default: 4)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let warmup_delay = std::env::var("GLIMPSE_WARMUP_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.warmup_delay);

        let blur_sigma = std::env::var("GLIMPSE_DETECTOR_BLUR_SIGMA")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|v: &f32| v.is_finite() && *v >= 0.0)
            .unwrap_or(defaults.blur_sigma);

        let threshold = std::env::var("GLIMPSE_DETECTOR_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|v: &f32| v.is_finite() && *v > 0.0 && *v < 1.0)
            .unwrap_or(defaults.threshold);

        let max_dimension = std::env::var("GLIMPSE_DETECTOR_MAX_DIMENSION")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|v: &u32| *v >= 16)
            .unwrap_or(defaults.max_dimension);

        let workers = std::env::var("GLIMPSE_DETECTOR_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|v: &usize| *v > 0)
            .unwrap_or(defaults.workers);

        Self {
            warmup_delay,
            blur_sigma,
            harris_k: defaults.harris_k,
            threshold,
            max_dimension,
            workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.warmup_delay, Duration::ZERO);
        assert_eq!(config.workers, 4);
        assert!(config.threshold > 0.0 && config.threshold < 1.0);
        assert_eq!(config.max_dimension, 2048);
    }
}
