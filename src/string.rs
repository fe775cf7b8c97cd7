//! PV string aggregator
//!
//! A [`PvString`] composes the I-V curves of series-connected modules into
//! one string-level curve. Series wiring forces a common current through
//! every module, so the composition resamples each module's curve onto a
//! shared current grid and sums voltages there:
//!
//! 1. build the grid from the union of the modules' current ranges, shaped
//!    by the ratio profiles in [`PvConstants`];
//! 2. interpolate every module's voltage at each grid current, extrapolating
//!    where the grid leaves that module's own range;
//! 3. sum voltages in module order, multiply by current for power.
//!
//! The string Isc is approximated as the mean of the modules' mean
//! irradiance times the reference Isc. That averaging stands in for true
//! series-current matching at the cell level; the approximation is part of
//! the algorithm's definition, not an implementation shortcut.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pvstring_rs::constants::PvConstants;
//! use pvstring_rs::string::PvString;
//! use pvstring_rs::irradiance::{ModuleIrradiance, StringIrradiance};
//!
//! let pvconst = Arc::new(PvConstants::default());
//! let mut string = PvString::new(pvconst, 10, 96, 1.0).unwrap();
//!
//! // Shade one cell of module 0 and recompute the aggregate
//! let spec = StringIrradiance::one_module(0, ModuleIrradiance::cells(vec![0.5], vec![0]));
//! string.set_suns(&spec).unwrap();
//!
//! let curve = string.curve();
//! assert_eq!(curve.len(), 2 * string.pvconst().npts);
//! ```

use std::sync::Arc;

use nalgebra::DVector;

use crate::constants::{interp_extrap, PvConstants};
use crate::error::{PvError, PvResult};
use crate::irradiance::{ModuleIrradiance, StringIrradiance};
use crate::module::PvModule;

// =================================================================================================
// Aggregate curve
// =================================================================================================

/// String-level I-V/P-V curve
///
/// All three arrays have length `2 * npts`. The curve is replaced wholesale
/// whenever any underlying module changes; it is never patched in place.
#[derive(Debug, Clone)]
pub struct StringCurve {
    /// Current samples spanning the full operating range \[A\]
    pub istring: DVector<f64>,

    /// Summed module voltage at each current sample \[V\]
    pub vstring: DVector<f64>,

    /// Power, `istring * vstring` elementwise \[W\]
    pub pstring: DVector<f64>,
}

impl StringCurve {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.istring.len()
    }

    /// True if the curve holds no samples
    pub fn is_empty(&self) -> bool {
        self.istring.is_empty()
    }

    /// Maximum power over the sampled curve \[W\]
    pub fn pmax(&self) -> f64 {
        self.pstring.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }
}

// =================================================================================================
// String
// =================================================================================================

/// A series string of PV modules and its aggregate curve
#[derive(Debug, Clone)]
pub struct PvString {
    pvconst: Arc<PvConstants>,
    pvmods: Vec<PvModule>,
    number_mods: usize,
    number_cells: usize,
    curve: StringCurve,
}

impl PvString {
    /// Create a string of `number_mods` identical modules at uniform
    /// irradiance `ee`
    ///
    /// Each module is constructed independently in a loop, so no two modules
    /// share irradiance state. The initial aggregate curve is computed
    /// before the constructor returns.
    ///
    /// # Errors
    ///
    /// [`PvError::Configuration`] if `number_mods` or `number_cells` is zero
    /// or `ee` is not a valid irradiance.
    pub fn new(
        pvconst: Arc<PvConstants>,
        number_mods: usize,
        number_cells: usize,
        ee: f64,
    ) -> PvResult<Self> {
        if number_mods == 0 {
            return Err(PvError::Configuration(
                "String needs at least one module".to_string(),
            ));
        }

        let mut pvmods = Vec::with_capacity(number_mods);
        for _ in 0..number_mods {
            pvmods.push(PvModule::new(Arc::clone(&pvconst), number_cells, ee)?);
        }
        Self::with_modules(pvconst, pvmods)
    }

    /// Create a string from pre-built modules
    ///
    /// All modules must expose the same number of series cells, otherwise
    /// per-cell irradiance addressing would be ambiguous. `number_mods` and
    /// `number_cells` are derived from the list.
    ///
    /// # Errors
    ///
    /// [`PvError::Configuration`] if the list is empty or cell counts
    /// differ; [`PvError::CurveData`] if any module curve cannot be
    /// interpolated.
    pub fn with_modules(pvconst: Arc<PvConstants>, pvmods: Vec<PvModule>) -> PvResult<Self> {
        let first = pvmods.first().ok_or_else(|| {
            PvError::Configuration("Module list is empty".to_string())
        })?;

        let number_cells = first.number_cells();
        for (index, module) in pvmods.iter().enumerate() {
            if module.number_cells() != number_cells {
                return Err(PvError::Configuration(format!(
                    "All modules must have the same number of cells: \
                     module {} has {}, module 0 has {}",
                    index,
                    module.number_cells(),
                    number_cells
                )));
            }
        }

        let number_mods = pvmods.len();
        let curve = calc_string(&pvconst, &pvmods)?;
        Ok(Self {
            pvconst,
            pvmods,
            number_mods,
            number_cells,
            curve,
        })
    }

    /// Shared constants
    pub fn pvconst(&self) -> &Arc<PvConstants> {
        &self.pvconst
    }

    /// Modules in series order
    pub fn modules(&self) -> &[PvModule] {
        &self.pvmods
    }

    /// Number of modules
    pub fn number_mods(&self) -> usize {
        self.number_mods
    }

    /// Series cells per module
    pub fn number_cells(&self) -> usize {
        self.number_cells
    }

    /// Current aggregate curve
    pub fn curve(&self) -> &StringCurve {
        &self.curve
    }

    /// Current samples \[A\]
    pub fn istring(&self) -> &DVector<f64> {
        &self.curve.istring
    }

    /// Voltage samples \[V\]
    pub fn vstring(&self) -> &DVector<f64> {
        &self.curve.vstring
    }

    /// Power samples \[W\]
    pub fn pstring(&self) -> &DVector<f64> {
        &self.curve.pstring
    }

    /// Recompute the aggregate curve from the current module curves
    ///
    /// Pure with respect to the string: returns a fresh curve without
    /// touching stored state. Construction and [`PvString::set_suns`] call
    /// this and store the result.
    pub fn calc_string(&self) -> PvResult<StringCurve> {
        calc_string(&self.pvconst, &self.pvmods)
    }

    /// Reassign irradiance and recompute the aggregate curve once
    ///
    /// Every entry of the specification is validated before any module is
    /// mutated, so a failed call leaves the string exactly as it was. The
    /// aggregate is recomputed in a single pass after all modules have been
    /// updated, never once per module.
    ///
    /// # Errors
    ///
    /// [`PvError::ModuleIndex`] for an out-of-range module index,
    /// [`PvError::Configuration`] / [`PvError::CellIndex`] for a malformed
    /// per-module specification.
    pub fn set_suns(&mut self, spec: &StringIrradiance) -> PvResult<()> {
        match spec {
            StringIrradiance::Uniform(ee) => {
                let module_spec = ModuleIrradiance::Uniform(*ee);
                for module in &self.pvmods {
                    module.validate_spec(&module_spec)?;
                }
                for module in &mut self.pvmods {
                    module.set_suns(&module_spec)?;
                }
            }
            StringIrradiance::PerModule(entries) => {
                for (&index, module_spec) in entries {
                    let module = self.pvmods.get(index).ok_or(PvError::ModuleIndex {
                        index,
                        number_mods: self.number_mods,
                    })?;
                    module.validate_spec(module_spec)?;
                }
                for (&index, module_spec) in entries {
                    self.pvmods[index].set_suns(module_spec)?;
                }
            }
        }

        self.curve = calc_string(&self.pvconst, &self.pvmods)?;
        Ok(())
    }
}

// =================================================================================================
// Curve composition
// =================================================================================================

/// Compose module curves into a string curve at common current
///
/// Deterministic for identical inputs: the voltage sum runs in module-list
/// order, so floating-point results are reproducible.
fn calc_string(pvconst: &PvConstants, pvmods: &[PvModule]) -> PvResult<StringCurve> {
    let npts = pvconst.npts;

    // Per-module range scalars, rejecting degenerate curves up front
    let mut imin = f64::INFINITY;
    let mut imax = f64::NEG_INFINITY;
    let mut ee_sum = 0.0;
    for (index, module) in pvmods.iter().enumerate() {
        let imod = module.imod();
        if imod.len() < 2 || imod.len() != module.vmod().len() {
            return Err(PvError::CurveData(format!(
                "module {}: curve has {} current and {} voltage sample(s), \
                 need at least 2 of each",
                index,
                imod.len(),
                module.vmod().len()
            )));
        }
        imin = imin.min(imod[0]);
        imax = imax.max(imod[imod.len() - 1]);
        ee_sum += module.ee_mean();
    }

    // String Isc from mean module irradiance (averaging approximation)
    let isc = ee_sum / pvmods.len() as f64 * pvconst.isc0;

    // Current grid: negative half up to Isc, then positive half to the
    // global maximum, each shaped by its ratio profile
    let mut istring = DVector::zeros(2 * npts);
    for k in 0..npts {
        istring[k] = (imin - isc) * pvconst.imod_negpts[k] + isc;
        istring[npts + k] = (imax - isc) * pvconst.imod_pts[k] + isc;
    }

    // Series composition: voltages add at common current, summed in module
    // order
    let mut vstring = DVector::zeros(2 * npts);
    for module in pvmods {
        vstring += interp_extrap(&istring, module.imod(), module.vmod())?;
    }

    let pstring = istring.component_mul(&vstring);
    Ok(StringCurve { istring, vstring, pstring })
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pvconst() -> Arc<PvConstants> {
        Arc::new(PvConstants::default())
    }

    /// Module wrapping the hand-built curve Imod=[-1,0,1] -> Vmod=[5,3,0]
    fn raw_curve_module(pvconst: &Arc<PvConstants>) -> PvModule {
        PvModule::from_curve_parts(
            Arc::clone(pvconst),
            1,
            DVector::from_row_slice(&[-1.0, 0.0, 1.0]),
            DVector::from_row_slice(&[5.0, 3.0, 0.0]),
            1.0,
        )
    }

    #[test]
    fn test_homogeneous_construction() {
        let string = PvString::new(pvconst(), 3, 24, 1.0).unwrap();
        assert_eq!(string.number_mods(), 3);
        assert_eq!(string.number_cells(), 24);
        assert_eq!(string.modules().len(), 3);
    }

    #[test]
    fn test_output_lengths_are_twice_npts() {
        let pvconst = pvconst();
        let string = PvString::new(Arc::clone(&pvconst), 2, 12, 1.0).unwrap();
        assert_eq!(string.istring().len(), 2 * pvconst.npts);
        assert_eq!(string.vstring().len(), 2 * pvconst.npts);
        assert_eq!(string.pstring().len(), 2 * pvconst.npts);
    }

    #[test]
    fn test_modules_are_independently_owned() {
        let mut string = PvString::new(pvconst(), 2, 4, 1.0).unwrap();
        let vmod_other = string.modules()[1].vmod().clone();

        let spec = StringIrradiance::one_module(0, ModuleIrradiance::Uniform(0.4));
        string.set_suns(&spec).unwrap();

        // Module 1's curve untouched by module 0's update
        let vmod_after = string.modules()[1].vmod();
        for k in 0..vmod_other.len() {
            assert_relative_eq!(vmod_other[k], vmod_after[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mismatched_cell_counts_rejected() {
        let pvconst = pvconst();
        let mods = vec![
            PvModule::new(Arc::clone(&pvconst), 24, 1.0).unwrap(),
            PvModule::new(Arc::clone(&pvconst), 36, 1.0).unwrap(),
        ];
        let err = PvString::with_modules(pvconst, mods).unwrap_err();
        assert!(matches!(err, PvError::Configuration(_)));
        assert!(err.to_string().contains("module 1"));
    }

    #[test]
    fn test_counts_derived_from_module_list() {
        let pvconst = pvconst();
        let mods = vec![
            PvModule::new(Arc::clone(&pvconst), 36, 1.0).unwrap(),
            PvModule::new(Arc::clone(&pvconst), 36, 1.0).unwrap(),
            PvModule::new(Arc::clone(&pvconst), 36, 1.0).unwrap(),
        ];
        let string = PvString::with_modules(pvconst, mods).unwrap();
        assert_eq!(string.number_mods(), 3);
        assert_eq!(string.number_cells(), 36);
    }

    #[test]
    fn test_empty_module_list_rejected() {
        let err = PvString::with_modules(pvconst(), vec![]).unwrap_err();
        assert!(matches!(err, PvError::Configuration(_)));
    }

    #[test]
    fn test_power_is_current_times_voltage() {
        let string = PvString::new(pvconst(), 4, 24, 0.9).unwrap();
        let curve = string.curve();
        for k in 0..curve.len() {
            assert_relative_eq!(
                curve.pstring[k],
                curve.istring[k] * curve.vstring[k],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_series_voltage_doubles_with_two_identical_raw_curves() {
        let pvconst = pvconst();
        let mods = vec![raw_curve_module(&pvconst), raw_curve_module(&pvconst)];
        let string = PvString::with_modules(Arc::clone(&pvconst), mods).unwrap();

        // At every grid current, string voltage is twice one module's
        // voltage at that current
        let single = raw_curve_module(&pvconst);
        let vmod = interp_extrap(string.istring(), single.imod(), single.vmod()).unwrap();
        for k in 0..vmod.len() {
            assert_relative_eq!(string.vstring()[k], 2.0 * vmod[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_set_suns_uniform_idempotent() {
        let mut string = PvString::new(pvconst(), 2, 8, 1.0).unwrap();
        let vstring_initial = string.vstring().clone();

        string.set_suns(&StringIrradiance::Uniform(1.0)).unwrap();
        string.set_suns(&StringIrradiance::Uniform(1.0)).unwrap();

        for k in 0..vstring_initial.len() {
            assert_relative_eq!(
                string.vstring()[k],
                vstring_initial[k],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_targeted_set_suns_leaves_other_modules_alone() {
        let mut string = PvString::new(pvconst(), 2, 1, 1.0).unwrap();
        let pmax_before = string.curve().pmax();

        let spec = StringIrradiance::one_module(
            0,
            ModuleIrradiance::cells(vec![0.5], vec![0]),
        );
        string.set_suns(&spec).unwrap();

        assert_relative_eq!(string.modules()[0].ee()[0], 0.5);
        assert_relative_eq!(string.modules()[1].ee()[0], 1.0);
        // Reduced current contribution shows up in the aggregate
        assert!(string.curve().pmax() < pmax_before);
    }

    #[test]
    fn test_invalid_module_index_mutates_nothing() {
        let mut string = PvString::new(pvconst(), 2, 4, 1.0).unwrap();
        let vstring_before = string.vstring().clone();

        let mut entries = std::collections::BTreeMap::new();
        // Valid entry first: it must not be applied either
        entries.insert(0, ModuleIrradiance::Uniform(0.2));
        entries.insert(2, ModuleIrradiance::Uniform(0.2));
        let err = string
            .set_suns(&StringIrradiance::PerModule(entries))
            .unwrap_err();

        assert!(matches!(err, PvError::ModuleIndex { index: 2, number_mods: 2 }));
        assert_relative_eq!(string.modules()[0].ee_mean(), 1.0);
        for k in 0..vstring_before.len() {
            assert_relative_eq!(string.vstring()[k], vstring_before[k]);
        }
    }

    #[test]
    fn test_bad_cell_spec_mutates_nothing() {
        let mut string = PvString::new(pvconst(), 2, 4, 1.0).unwrap();

        let mut entries = std::collections::BTreeMap::new();
        entries.insert(0, ModuleIrradiance::Uniform(0.2));
        entries.insert(1, ModuleIrradiance::cells(vec![0.5], vec![9]));
        let err = string
            .set_suns(&StringIrradiance::PerModule(entries))
            .unwrap_err();

        assert!(matches!(err, PvError::CellIndex { index: 9, number_cells: 4 }));
        assert_relative_eq!(string.modules()[0].ee_mean(), 1.0);
        assert_relative_eq!(string.modules()[1].ee_mean(), 1.0);
    }

    #[test]
    fn test_degenerate_module_curve_is_curve_data_error() {
        let pvconst = pvconst();
        let degenerate = PvModule::from_curve_parts(
            Arc::clone(&pvconst),
            1,
            DVector::from_row_slice(&[1.0]),
            DVector::from_row_slice(&[0.0]),
            1.0,
        );
        let err = PvString::with_modules(pvconst, vec![degenerate]).unwrap_err();
        assert!(matches!(err, PvError::CurveData(_)));
        assert!(err.to_string().contains("module 0"));
    }

    #[test]
    fn test_calc_string_is_deterministic() {
        let string = PvString::new(pvconst(), 3, 12, 0.8).unwrap();
        let first = string.calc_string().unwrap();
        let second = string.calc_string().unwrap();
        for k in 0..first.len() {
            assert_eq!(first.vstring[k], second.vstring[k]);
        }
    }

    #[test]
    fn test_mismatch_lowers_peak_power() {
        let mut string = PvString::new(pvconst(), 4, 24, 1.0).unwrap();
        let pmax_uniform = string.curve().pmax();

        // Heavy shade on one module
        let spec = StringIrradiance::one_module(2, ModuleIrradiance::Uniform(0.3));
        string.set_suns(&spec).unwrap();

        assert!(string.curve().pmax() < pmax_uniform);
    }
}
