//! Helper functions for integration tests

use std::sync::Arc;

use nalgebra::DVector;
use pvstring_rs::{PvConstants, PvString};

/// Assert that two curve arrays agree elementwise within tolerance
pub fn assert_vectors_close(
    left: &DVector<f64>,
    right: &DVector<f64>,
    tolerance: f64,
    message: &str,
) {
    assert_eq!(left.len(), right.len(), "{}: length mismatch", message);

    for (k, (&a, &b)) in left.iter().zip(right.iter()).enumerate() {
        let diff = (a - b).abs();
        assert!(
            diff < tolerance,
            "{}: element {} differs by {} (tolerance {})",
            message,
            k,
            diff,
            tolerance
        );
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Create a uniformly lit string for testing
pub fn uniform_string(number_mods: usize, number_cells: usize, ee: f64) -> PvString {
    let pvconst = Arc::new(PvConstants::default());
    PvString::new(pvconst, number_mods, number_cells, ee)
        .expect("valid uniform string")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }
}
