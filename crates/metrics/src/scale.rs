//! Linear scaling of raw metric values toward the metric's ideal.

use crate::catalog::MetricKind;

/// Rescales a raw metric value to [0, 1] in relation to the metric's ideal.
///
/// A metric whose ideal sits at its upper bound scales upward (raw at the
/// lower bound scores 0, at the ideal scores 1); an ideal at the lower bound
/// scales the other way; an ideal between the bounds scales toward it from
/// both sides. Raw values outside the scaling bounds clamp. NaN passes
/// through so undefined scores stay undefined.
pub fn scale_value(kind: MetricKind, raw: f64) -> f64 {
    if raw.is_nan() {
        return f64::NAN;
    }

    let (lower, upper) = kind.bounds();
    let ideal = kind.ideal();

    let (rise, run) = if ideal == lower {
        (-1.0, upper - lower)
    } else if ideal == upper {
        (1.0, upper - lower)
    } else if raw <= ideal {
        (1.0, ideal - lower)
    } else {
        (-1.0, upper - ideal)
    };

    let slope = rise / run;
    let y_intercept = 1.0 - slope * ideal;
    let scaled = slope * raw + y_intercept;

    scaled.clamp(lower.max(0.0), 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ideal_at_upper_bound() {
        // Pearson: [-1, 1] with ideal 1.
        assert_relative_eq!(
            scale_value(MetricKind::PearsonCorrelation, 1.0),
            1.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            scale_value(MetricKind::PearsonCorrelation, 0.0),
            0.5,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            scale_value(MetricKind::PearsonCorrelation, -1.0),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn ideal_at_lower_bound() {
        // False alarm ratio: [0, 1] with ideal 0 — lower is better.
        assert_relative_eq!(
            scale_value(MetricKind::FalseAlarmRatio, 0.0),
            1.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            scale_value(MetricKind::FalseAlarmRatio, 0.75),
            0.25,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            scale_value(MetricKind::FalseAlarmRatio, 1.0),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn ideal_between_bounds() {
        // Volume error: [-1, 1] with ideal 0, scaled toward it from both sides.
        assert_relative_eq!(scale_value(MetricKind::VolumeError, 0.0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(
            scale_value(MetricKind::VolumeError, 0.25),
            0.75,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            scale_value(MetricKind::VolumeError, -0.25),
            0.75,
            epsilon = 1e-9
        );
        assert_relative_eq!(scale_value(MetricKind::VolumeError, 1.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn out_of_bounds_clamps() {
        // Efficiency scores run to negative infinity but scale no lower than 0.
        assert_relative_eq!(
            scale_value(MetricKind::NashSutcliffe, -5.0),
            0.0,
            epsilon = 1e-9
        );
        // A wildly overforecast frequency bias clamps to 0 as well.
        assert_relative_eq!(scale_value(MetricKind::FrequencyBias, 5.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(scale_value(MetricKind::VolumeError, 3.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn nan_passes_through() {
        assert!(scale_value(MetricKind::PearsonCorrelation, f64::NAN).is_nan());
    }

    #[test]
    fn frequency_bias_scales_toward_one() {
        assert_relative_eq!(scale_value(MetricKind::FrequencyBias, 1.0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(scale_value(MetricKind::FrequencyBias, 0.5), 0.5, epsilon = 1e-9);
        assert_relative_eq!(scale_value(MetricKind::FrequencyBias, 1.5), 0.5, epsilon = 1e-9);
        assert_relative_eq!(scale_value(MetricKind::FrequencyBias, 0.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(scale_value(MetricKind::FrequencyBias, 2.0), 0.0, epsilon = 1e-9);
    }
}
