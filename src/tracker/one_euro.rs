use crate::config::FilterConfig;
use crate::error::TrackError;

/// Low-pass filter component
struct LowPassFilter {
    prev: Option<f32>,
}

impl LowPassFilter {
    fn new() -> Self {
        Self { prev: None }
    }

    fn filter(&mut self, value: f32, alpha: f32) -> f32 {
        match self.prev {
            Some(prev) => {
                let result = alpha * value + (1.0 - alpha) * prev;
                self.prev = Some(result);
                result
            }
            None => {
                self.prev = Some(value);
                value
            }
        }
    }

    fn reset(&mut self) {
        self.prev = None;
    }
}

/// alpha = r / (r + 1), r = 2*pi*cutoff*Te
fn smoothing_factor(te: f32, cutoff: f32) -> f32 {
    let r = 2.0 * std::f32::consts::PI * cutoff * te;
    r / (r + 1.0)
}

/// One euro filter for a single scalar channel. The cutoff rises with the
/// estimated signal speed, so slow drift is smoothed hard while fast motion
/// passes through with little lag.
struct ScalarFilter {
    min_cutoff: f32,
    beta: f32,
    d_cutoff: f32,
    x_filter: LowPassFilter,
    dx_filter: LowPassFilter,
    prev_value: Option<f32>,
}

impl ScalarFilter {
    fn new(min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            x_filter: LowPassFilter::new(),
            dx_filter: LowPassFilter::new(),
            prev_value: None,
        }
    }

    fn filter(&mut self, value: f32, dt: f32) -> f32 {
        let dx = match self.prev_value {
            Some(prev) => {
                if dt > 0.0 {
                    (value - prev) / dt
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.prev_value = Some(value);

        let edx = self
            .dx_filter
            .filter(dx, smoothing_factor(dt, self.d_cutoff));
        let cutoff = self.min_cutoff + self.beta * edx.abs();
        self.x_filter.filter(value, smoothing_factor(dt, cutoff))
    }

    fn reset(&mut self) {
        self.x_filter.reset();
        self.dx_filter.reset();
        self.prev_value = None;
    }
}

/// One euro filter for a 3D point channel, with explicit frame timestamps.
///
/// Each component is filtered independently. When no timestamp is supplied
/// (or on the first call) the nominal frame period is assumed. Timestamps
/// must be strictly increasing per channel; a non-increasing timestamp is
/// rejected without touching filter state.
pub struct PointFilter {
    period: f32,
    components: [ScalarFilter; 3],
    last_timestamp: Option<f64>,
}

impl PointFilter {
    pub fn new(frequency_hz: f32, min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        // An unusable frequency falls back to the 30 Hz detector rate.
        let period = if frequency_hz > 0.0 {
            1.0 / frequency_hz
        } else {
            1.0 / 30.0
        };
        Self {
            period,
            components: std::array::from_fn(|_| ScalarFilter::new(min_cutoff, beta, d_cutoff)),
            last_timestamp: None,
        }
    }

    pub fn from_config(frequency_hz: f32, config: &FilterConfig) -> Self {
        Self::new(
            frequency_hz,
            config.min_cutoff,
            config.beta,
            config.d_cutoff,
        )
    }

    /// Filter one sample. `timestamp` is seconds on any monotonic clock the
    /// caller chooses; it only ever enters the math as a difference.
    pub fn filter(
        &mut self,
        value: [f32; 3],
        timestamp: Option<f64>,
    ) -> Result<[f32; 3], TrackError> {
        let dt = match (timestamp, self.last_timestamp) {
            (Some(current), Some(previous)) => {
                if current <= previous {
                    return Err(TrackError::NonMonotonicTimestamp { previous, current });
                }
                (current - previous) as f32
            }
            _ => self.period,
        };
        if timestamp.is_some() {
            self.last_timestamp = timestamp;
        }

        Ok([
            self.components[0].filter(value[0], dt),
            self.components[1].filter(value[1], dt),
            self.components[2].filter(value[2], dt),
        ])
    }

    pub fn reset(&mut self) {
        for f in &mut self.components {
            f.reset();
        }
        self.last_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_factor_bounds() {
        // alpha should be between 0 and 1
        for &cutoff in &[0.1, 1.0, 10.0, 100.0] {
            for &te in &[0.001, 0.01, 0.033, 0.1] {
                let alpha = smoothing_factor(te, cutoff);
                assert!(
                    alpha > 0.0 && alpha < 1.0,
                    "alpha={} for te={}, cutoff={}",
                    alpha,
                    te,
                    cutoff
                );
            }
        }
    }

    #[test]
    fn test_scalar_filter_passthrough_first() {
        let mut f = ScalarFilter::new(1.0, 0.0, 1.0);
        let result = f.filter(5.0, 0.033);
        assert_eq!(result, 5.0);
    }

    #[test]
    fn test_scalar_filter_smooths() {
        let mut f = ScalarFilter::new(1.0, 0.0, 1.0);
        f.filter(0.0, 0.033);
        let result = f.filter(10.0, 0.033);
        assert!(result < 10.0, "Expected smoothing, got {}", result);
        assert!(result > 0.0, "Expected positive value, got {}", result);
    }

    #[test]
    fn test_scalar_filter_high_beta_responsive() {
        // High beta: fast movements should pass through with less filtering
        let mut f_low_beta = ScalarFilter::new(1.0, 0.0, 1.0);
        let mut f_high_beta = ScalarFilter::new(1.0, 1.0, 1.0);

        f_low_beta.filter(0.0, 0.033);
        f_high_beta.filter(0.0, 0.033);

        let r_low = f_low_beta.filter(10.0, 0.033);
        let r_high = f_high_beta.filter(10.0, 0.033);

        assert!(
            r_high > r_low,
            "High beta ({}) should be more responsive than low beta ({})",
            r_high,
            r_low
        );
    }

    #[test]
    fn test_point_filter_first_call_passthrough() {
        let mut f = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        let result = f.filter([1.0, 2.0, 3.0], Some(0.0)).unwrap();
        assert_eq!(result, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_point_filter_converges_to_constant() {
        let mut f = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        let target = [0.5, 1.0, 0.2];

        let mut result = [0.0; 3];
        f.filter([0.0, 0.0, 0.0], Some(0.0)).unwrap();
        for i in 1..100 {
            result = f.filter(target, Some(i as f64 / 30.0)).unwrap();
        }

        for axis in 0..3 {
            assert!(
                (result[axis] - target[axis]).abs() < 1e-4,
                "axis {} did not converge: {} vs {}",
                axis,
                result[axis],
                target[axis]
            );
        }
    }

    #[test]
    fn test_point_filter_smooths_between_samples() {
        // Without timestamps the nominal period drives the blend.
        let mut f = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        f.filter([0.0, 0.0, 0.0], None).unwrap();
        let result = f.filter([1.0, 1.0, 1.0], None).unwrap();
        for axis in 0..3 {
            assert!(
                result[axis] > 0.0 && result[axis] < 1.0,
                "axis {} should land strictly between samples, got {}",
                axis,
                result[axis]
            );
        }
    }

    #[test]
    fn test_point_filter_rejects_non_monotonic_timestamp() {
        let mut f = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        f.filter([1.0, 1.0, 1.0], Some(0.5)).unwrap();

        let err = f.filter([2.0, 2.0, 2.0], Some(0.5)).unwrap_err();
        match err {
            TrackError::NonMonotonicTimestamp { previous, current } => {
                assert_eq!(previous, 0.5);
                assert_eq!(current, 0.5);
            }
            other => panic!("expected NonMonotonicTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_point_filter_state_untouched_on_error() {
        // A rejected sample must leave the filter exactly where it was.
        let step = 1.0 / 30.0;

        let mut rejected = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        rejected.filter([1.0, 2.0, 3.0], Some(0.0)).unwrap();
        rejected.filter([9.0, 9.0, 9.0], Some(0.0)).unwrap_err();
        let after_error = rejected.filter([4.0, 5.0, 6.0], Some(step)).unwrap();

        let mut clean = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        clean.filter([1.0, 2.0, 3.0], Some(0.0)).unwrap();
        let without_error = clean.filter([4.0, 5.0, 6.0], Some(step)).unwrap();

        assert_eq!(after_error, without_error);
    }

    #[test]
    fn test_point_filter_reset() {
        let mut f = PointFilter::new(30.0, 1.0, 0.0, 1.0);
        f.filter([1.0, 2.0, 3.0], Some(0.0)).unwrap();
        f.reset();

        // After reset, the next call passes through and any timestamp is
        // accepted again.
        let result = f.filter([10.0, 20.0, 30.0], Some(0.0)).unwrap();
        assert_eq!(result, [10.0, 20.0, 30.0]);
    }
}
