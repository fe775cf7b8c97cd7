//! Physical constants and curve resampling utilities
//!
//! This module provides the two cross-cutting pieces the rest of the crate
//! builds on:
//!
//! - [`PvConstants`]: immutable reference values (short-circuit current,
//!   sampling resolution) together with the pre-computed ratio profiles that
//!   shape how I-V curves are resampled onto a common current grid.
//! - [`interp_extrap`]: vectorized linear interpolation with linear
//!   extrapolation, tolerant of the non-strictly-monotonic curves produced by
//!   partial shading.
//!
//! # Sharing
//!
//! `PvConstants` is constructed once and shared by reference
//! (`Arc<PvConstants>`) across every module and string that uses it. It is
//! never mutated after construction; there is no global default instance, so
//! the dependency is always explicit.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pvstring_rs::constants::PvConstants;
//!
//! let pvconst = Arc::new(PvConstants::default());
//! assert_eq!(pvconst.imod_pts.len(), pvconst.npts);
//! ```

use nalgebra::DVector;

use crate::error::{PvError, PvResult};

// =================================================================================================
// Default reference values
// =================================================================================================

/// Default number of modules in a string
pub const NUMBERMODS: usize = 10;

/// Default number of series cells per module
pub const NUMBERCELLS: usize = 96;

/// Default number of interpolation points per half-curve
pub const NPTS: usize = 101;

/// Default reference short-circuit current at 1 sun \[A\]
pub const ISC0: f64 = 6.3;

// =================================================================================================
// Constants provider
// =================================================================================================

/// Immutable physical and numerical constants
///
/// Holds the reference short-circuit current, the resampling resolution and
/// the two ratio profiles used to spread current samples over the positive
/// and negative half-curves.
///
/// # Ratio profiles
///
/// Both profiles are log-spaced ramps `(11^t - 1) / 10`:
///
/// - `imod_pts` ascends 0 → 1 with samples denser near 0, so the positive
///   half-curve `(Imax - Isc) * imod_pts + Isc` concentrates points near the
///   knee at Isc where the curve bends hardest.
/// - `imod_negpts` descends from `1 + eps` to `eps` with `eps = 1/(10*npts)`,
///   so the negative half-curve `(Imin - Isc) * imod_negpts + Isc` runs from
///   just below the reverse-breakdown bound up to just short of Isc. The
///   offset keeps the concatenated grid free of a duplicated sample at Isc.
#[derive(Debug, Clone)]
pub struct PvConstants {
    /// Reference short-circuit current at 1 sun \[A\]
    pub isc0: f64,

    /// Number of interpolation points per half-curve
    pub npts: usize,

    /// Ratio profile for the positive current half-curve, length `npts`
    pub imod_pts: DVector<f64>,

    /// Ratio profile for the negative (reverse-bias) half-curve, length `npts`
    pub imod_negpts: DVector<f64>,
}

impl PvConstants {
    /// Create constants with the given resolution and reference current
    ///
    /// # Panics
    ///
    /// Panics if `npts < 2` or `isc0 <= 0` (these are programming errors in
    /// the caller's fixed configuration, not runtime data).
    pub fn new(npts: usize, isc0: f64) -> Self {
        assert!(npts >= 2, "Need at least 2 points per half-curve, got {}", npts);
        assert!(isc0 > 0.0, "Reference Isc must be positive, got {}", isc0);

        let eps = 1.0 / (10.0 * npts as f64);
        let last = (npts - 1) as f64;

        // (11^t - 1)/10 maps [0,1] onto [0,1] with increasing step size
        let ramp = |t: f64| (11.0_f64.powf(t) - 1.0) / 10.0;

        let imod_pts = DVector::from_fn(npts, |k, _| ramp(k as f64 / last));
        let imod_negpts = DVector::from_fn(npts, |k, _| ramp(1.0 - k as f64 / last) + eps);

        Self { isc0, npts, imod_pts, imod_negpts }
    }
}

impl Default for PvConstants {
    fn default() -> Self {
        Self::new(NPTS, ISC0)
    }
}

// =================================================================================================
// Interpolation
// =================================================================================================

/// Vectorized linear interpolation with linear extrapolation
///
/// Evaluates the piecewise-linear curve `(xp, fp)` at every target in `x`.
/// Targets beyond either end of `xp` are extrapolated along the first or
/// last segment, since a string current grid spans the union of all modules'
/// current ranges rather than any single module's.
///
/// # Non-monotonic sources
///
/// Mismatch curves are only "monotonic-ish": flat stretches and small local
/// reversals occur near bypass knees. The search walks segments in curve
/// order and takes the first one that brackets the target (in either
/// direction), so ties and reversals resolve deterministically. A tie
/// (`xp[i] == xp[i+1]`) collapses to the right-hand sample.
///
/// # Errors
///
/// Returns [`PvError::CurveData`] if the source curve is degenerate: fewer
/// than two samples, or `xp` and `fp` of different lengths.
pub fn interp_extrap(
    x: &DVector<f64>,
    xp: &DVector<f64>,
    fp: &DVector<f64>,
) -> PvResult<DVector<f64>> {
    if xp.len() != fp.len() {
        return Err(PvError::CurveData(format!(
            "source curve length mismatch: {} x-samples vs {} y-samples",
            xp.len(),
            fp.len()
        )));
    }
    if xp.len() < 2 {
        return Err(PvError::CurveData(format!(
            "source curve is degenerate: {} sample(s), need at least 2",
            xp.len()
        )));
    }

    let n = xp.len();
    // Overall direction decides which end counts as "below" for extrapolation
    let ascending = xp[n - 1] >= xp[0];

    let result = DVector::from_fn(x.len(), |k, _| {
        let xi = x[k];

        let below = if ascending { xi < xp[0] } else { xi > xp[0] };
        let above = if ascending { xi > xp[n - 1] } else { xi < xp[n - 1] };

        if below {
            return segment_value(xi, xp[0], xp[1], fp[0], fp[1]);
        }
        if above {
            return segment_value(xi, xp[n - 2], xp[n - 1], fp[n - 2], fp[n - 1]);
        }

        // Interior: first bracketing segment in curve order wins
        for i in 0..n - 1 {
            let (lo, hi) = (xp[i].min(xp[i + 1]), xp[i].max(xp[i + 1]));
            if xi >= lo && xi <= hi {
                return segment_value(xi, xp[i], xp[i + 1], fp[i], fp[i + 1]);
            }
        }

        // A wiggly interior can leave a target unbracketed; fall back to the
        // nearest end segment
        let mid = 0.5 * (xp[0] + xp[n - 1]);
        if (xi - xp[0]).abs() <= (xi - mid).abs() {
            segment_value(xi, xp[0], xp[1], fp[0], fp[1])
        } else {
            segment_value(xi, xp[n - 2], xp[n - 1], fp[n - 2], fp[n - 1])
        }
    });

    Ok(result)
}

/// Linear value on the segment (x0,f0)-(x1,f1), collapsing ties to f1
#[inline]
fn segment_value(x: f64, x0: f64, x1: f64, f0: f64, f1: f64) -> f64 {
    let dx = x1 - x0;
    if dx == 0.0 {
        f1
    } else {
        f0 + (x - x0) * (f1 - f0) / dx
    }
}

// =================================================================================================
// Tests
// =================================================================================================
