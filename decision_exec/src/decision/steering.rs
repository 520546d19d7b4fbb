//! # Steering computations
//!
//! Pure functions converting the navigable terrain angles into a single steering demand. All
//! averages are taken in degrees.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use ndarray::Array1;
use ndarray_stats::{errors::MultiInputError, SummaryStatisticsExt};

use super::{EMPTY_TERRAIN_STEER_DEG, MAX_STEER_DEG};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Mean of the given angles in degrees, or `None` if there are no angles.
pub fn mean_degrees(angles_rad: &Array1<f64>) -> Option<f64> {
    angles_rad.mapv(f64::to_degrees).mean()
}

/// Weighted mean of the given angles in degrees.
///
/// Errors if there are no angles or the weights are not the same length as the angles.
pub fn weighted_mean_degrees(
    angles_rad: &Array1<f64>,
    weights: &Array1<f64>,
) -> Result<f64, MultiInputError> {
    angles_rad.mapv(f64::to_degrees).weighted_mean(weights)
}

/// Clamp a steering demand to the steering range. NaN is mapped to straight ahead.
pub fn clamp_steer(steer_deg: f64) -> f64 {
    if steer_deg.is_nan() {
        return 0.0;
    }

    util::maths::clamp(steer_deg, -MAX_STEER_DEG, MAX_STEER_DEG)
}

/// Steering demand towards the navigable terrain when driving forward.
///
/// Uses the weighted mean if weights are available, falling back to the plain mean if they
/// aren't or if the weighted mean is undefined (for example all weights are zero). With no
/// terrain at all the fixed [`EMPTY_TERRAIN_STEER_DEG`] is used.
pub fn terrain_steer_deg(angles_rad: Option<&Array1<f64>>, weights: Option<&Array1<f64>>) -> f64 {
    let angles = match angles_rad {
        Some(a) if !a.is_empty() => a,
        _ => return EMPTY_TERRAIN_STEER_DEG,
    };

    let weighted = weights
        .and_then(|w| weighted_mean_degrees(angles, w).ok())
        .filter(|s| s.is_finite());

    match weighted.or_else(|| mean_degrees(angles)) {
        Some(s) => clamp_steer(s),
        None => EMPTY_TERRAIN_STEER_DEG,
    }
}

/// Steering demand when reversing, the unweighted mean of the terrain angles.
pub fn reverse_steer_deg(angles_rad: Option<&Array1<f64>>) -> f64 {
    match angles_rad.and_then(mean_degrees) {
        Some(s) => clamp_steer(s),
        None => EMPTY_TERRAIN_STEER_DEG,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::arr1;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_mean_degrees() {
        let angles = arr1(&[0.1, 0.2, 0.3]);

        let mean = mean_degrees(&angles).unwrap();
        assert!((mean - 0.2f64.to_degrees()).abs() < EPS);

        assert_eq!(mean_degrees(&Array1::zeros(0)), None);
    }

    #[test]
    fn test_weighted_mean_degrees() {
        let angles = arr1(&[0.0, 0.2]);
        let weights = arr1(&[1.0, 3.0]);

        let mean = weighted_mean_degrees(&angles, &weights).unwrap();
        assert!((mean - 0.15f64.to_degrees()).abs() < EPS);

        // Empty and mismatched inputs are errors, not divisions by zero
        assert!(weighted_mean_degrees(&Array1::zeros(0), &Array1::zeros(0)).is_err());
        assert!(weighted_mean_degrees(&angles, &arr1(&[1.0])).is_err());
    }

    #[test]
    fn test_clamp_steer() {
        assert_eq!(clamp_steer(40.0), 15.0);
        assert_eq!(clamp_steer(-40.0), -15.0);
        assert_eq!(clamp_steer(7.5), 7.5);
        assert_eq!(clamp_steer(std::f64::NAN), 0.0);
    }

    #[test]
    fn test_terrain_steer() {
        let angles = arr1(&[0.05, 0.1]);
        let weights = arr1(&[3.0, 1.0]);

        // Weighted
        let steer = terrain_steer_deg(Some(&angles), Some(&weights));
        assert!((steer - 0.0625f64.to_degrees()).abs() < EPS);

        // Unweighted without weights
        let steer = terrain_steer_deg(Some(&angles), None);
        assert!((steer - 0.075f64.to_degrees()).abs() < EPS);

        // Zero weights fall back to the plain mean
        let steer = terrain_steer_deg(Some(&angles), Some(&arr1(&[0.0, 0.0])));
        assert!((steer - 0.075f64.to_degrees()).abs() < EPS);

        // No terrain
        assert_eq!(terrain_steer_deg(Some(&Array1::zeros(0)), None), -15.0);
        assert_eq!(terrain_steer_deg(None, None), -15.0);

        // Wide angles are clamped
        assert_eq!(terrain_steer_deg(Some(&arr1(&[1.0, 1.2])), None), 15.0);
        assert_eq!(terrain_steer_deg(Some(&arr1(&[-1.0, -1.2])), None), -15.0);
    }

    #[test]
    fn test_reverse_steer_ignores_weights() {
        let angles = arr1(&[0.05, 0.1]);

        let steer = reverse_steer_deg(Some(&angles));
        assert!((steer - 0.075f64.to_degrees()).abs() < EPS);

        assert_eq!(reverse_steer_deg(Some(&Array1::zeros(0))), -15.0);
        assert_eq!(reverse_steer_deg(None), -15.0);
    }

    #[test]
    fn test_steer_always_in_range() {
        // Sweep a range of finite angle sets including extreme values
        let sets = vec![
            vec![1e6, -1e6, 3.0],
            vec![-3.1, -2.9, -0.5],
            vec![std::f64::MAX / 1e3, 0.0],
            vec![0.26, 0.27],
            vec![-0.26, -0.27],
        ];

        for set in sets {
            let angles = Array1::from(set);
            let weights = Array1::from_elem(angles.len(), 0.5);

            for steer in &[
                terrain_steer_deg(Some(&angles), Some(&weights)),
                terrain_steer_deg(Some(&angles), None),
                reverse_steer_deg(Some(&angles)),
            ] {
                assert!(*steer >= -15.0 && *steer <= 15.0, "steer {} out of range", steer);
            }
        }
    }
}
