use crate::engine::collaborators::{EquilibrationDetector, EquilibrationEstimate};

pub const DEFAULT_MINTIME: usize = 3;

/// Statistical inefficiency `g` of a correlated series, or `None` for a series
/// with zero variance.
///
/// The normalized autocorrelation function is summed from lag 1 until it
/// first drops to zero or below after `mintime` lags. In `fast` mode the lag
/// increment grows by one at each step, and each term is weighted by its
/// increment. The result is clamped to at least 1.
pub fn statistical_inefficiency(samples: &[f64], mintime: usize, fast: bool) -> Option<f64> {
    let n = samples.len();
    if n < 2 {
        return Some(1.0);
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let deviations: Vec<f64> = samples.iter().map(|x| x - mean).collect();
    let sigma2 = deviations.iter().map(|d| d * d).sum::<f64>() / n as f64;
    if sigma2 == 0.0 {
        return None;
    }

    let mut g = 1.0;
    let mut t = 1;
    let mut increment = 1;
    while t < n - 1 {
        let lagged: f64 = deviations[..n - t]
            .iter()
            .zip(&deviations[t..])
            .map(|(a, b)| a * b)
            .sum();
        let c = lagged / ((n - t) as f64 * sigma2);
        if c <= 0.0 && t > mintime {
            break;
        }
        g += 2.0 * c * (1.0 - t as f64 / n as f64) * increment as f64;
        t += increment;
        if fast {
            increment += 1;
        }
    }
    Some(g.max(1.0))
}

/// Picks the start of the equilibrated region by maximizing the number of
/// effectively uncorrelated samples that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocorrelationDetector {
    pub fast: bool,
    /// Stride between candidate origins.
    pub nskip: usize,
    pub mintime: usize,
}

impl Default for AutocorrelationDetector {
    fn default() -> Self {
        Self {
            fast: true,
            nskip: 1,
            mintime: DEFAULT_MINTIME,
        }
    }
}

impl AutocorrelationDetector {
    pub fn with_nskip(mut self, nskip: usize) -> Self {
        self.nskip = nskip.max(1);
        self
    }
}

impl EquilibrationDetector for AutocorrelationDetector {
    fn detect(&self, samples: &[f64]) -> EquilibrationEstimate {
        let total = samples.len();
        if total < 2 {
            return EquilibrationEstimate {
                t0: 0,
                g: 1.0,
                neff_max: total as f64,
            };
        }
        if samples.iter().all(|x| *x == samples[0]) {
            return EquilibrationEstimate {
                t0: 0,
                g: 1.0,
                neff_max: 1.0,
            };
        }

        let mut best: Option<EquilibrationEstimate> = None;
        for t in (0..total - 1).step_by(self.nskip.max(1)) {
            let remaining = total - t;
            let g = statistical_inefficiency(&samples[t..], self.mintime, self.fast)
                .unwrap_or(remaining as f64);
            let candidate = EquilibrationEstimate::from_t0_and_g(total, t, g);
            if best.is_none_or(|b| candidate.neff_max > b.neff_max) {
                best = Some(candidate);
            }
        }
        best.unwrap_or(EquilibrationEstimate {
            t0: 0,
            g: 1.0,
            neff_max: total as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random values in [-1, 1).
    fn noise(len: usize, mut state: u64) -> Vec<f64> {
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn constant_series_has_no_correlation_and_one_sample() {
        let estimate = AutocorrelationDetector::default().detect(&[3.0; 50]);
        assert_eq!(
            estimate,
            EquilibrationEstimate {
                t0: 0,
                g: 1.0,
                neff_max: 1.0
            }
        );
    }

    #[test]
    fn tiny_series_are_taken_as_is() {
        let detector = AutocorrelationDetector::default();
        assert_eq!(detector.detect(&[]).neff_max, 0.0);
        assert_eq!(
            detector.detect(&[1.5]),
            EquilibrationEstimate {
                t0: 0,
                g: 1.0,
                neff_max: 1.0
            }
        );
    }

    #[test]
    fn zero_variance_tail_counts_as_one_sample() {
        let mut samples = vec![5.0, -5.0];
        samples.extend([0.0; 8]);
        let estimate = AutocorrelationDetector::default().detect(&samples);
        assert!(estimate.neff_max >= 1.0);
        assert_eq!(statistical_inefficiency(&samples[2..], 3, true), None);
    }

    #[test]
    fn uncorrelated_noise_is_clamped_to_one() {
        assert_eq!(statistical_inefficiency(&noise(500, 1), 3, true), Some(1.0));
    }

    #[test]
    fn fast_mode_sums_at_growing_lags() {
        // Lags 1, 2, 4 contribute; lag 7 is the first non-positive one past mintime.
        let alternating: Vec<f64> = (0..100).map(|k| if k % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let g = statistical_inefficiency(&alternating, 3, true).unwrap();
        assert!((g - 8.7).abs() < 1e-9, "g = {}", g);
    }

    #[test]
    fn smooth_series_is_more_correlated_than_noise() {
        let smooth: Vec<f64> = (0..400).map(|k| (k as f64 / 40.0).sin()).collect();
        let g_smooth = statistical_inefficiency(&smooth, 3, true).unwrap();
        let g_noise = statistical_inefficiency(&noise(400, 7), 3, true).unwrap();
        assert!(g_smooth > 5.0 * g_noise, "{} vs {}", g_smooth, g_noise);
    }

    #[test]
    fn discards_a_relaxing_prefix() {
        let mut samples: Vec<f64> = (0..60).map(|k| 50.0 - k as f64 * 0.8).collect();
        samples.extend(noise(600, 42));
        let estimate = AutocorrelationDetector::default().detect(&samples);

        assert!(estimate.t0 >= 40 && estimate.t0 <= 80, "t0 = {}", estimate.t0);
        assert!(estimate.g >= 1.0);
        let expected = (samples.len() - estimate.t0) as f64 / estimate.g;
        assert!((estimate.neff_max - expected).abs() < 1e-9);
    }

    #[test]
    fn nskip_only_considers_strided_origins() {
        let mut samples: Vec<f64> = (0..30).map(|k| 30.0 - k as f64).collect();
        samples.extend(noise(300, 3));
        let estimate = AutocorrelationDetector::default()
            .with_nskip(7)
            .detect(&samples);
        assert_eq!(estimate.t0 % 7, 0);
    }
}
