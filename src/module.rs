//! PV module curve source
//!
//! A [`PvModule`] owns the I-V curve of one module: `number_cells` series
//! cells under individually assignable irradiance. The curve is produced by
//! an explicit voltage-from-current cell model (a single-diode forward
//! branch and a linear reverse-breakdown branch) with cell voltages summed
//! at common current, since series cells all carry the string current.
//!
//! The module is a collaborator of the string aggregator: the aggregator
//! consumes `imod`/`vmod`/`ee_mean` and calls [`PvModule::set_suns`] when
//! irradiance changes. Any irradiance update recomputes the whole curve;
//! curves are replaced, never patched.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pvstring_rs::constants::PvConstants;
//! use pvstring_rs::module::PvModule;
//! use pvstring_rs::irradiance::ModuleIrradiance;
//!
//! let pvconst = Arc::new(PvConstants::default());
//! let mut module = PvModule::new(pvconst, 96, 1.0).unwrap();
//!
//! // Shade three cells to 30% sun
//! module.set_suns(&ModuleIrradiance::cells(vec![0.3], vec![10, 11, 12])).unwrap();
//! assert!(module.ee_mean() < 1.0);
//! ```

use std::sync::Arc;

use nalgebra::DVector;

use crate::constants::PvConstants;
use crate::error::{PvError, PvResult};
use crate::irradiance::ModuleIrradiance;

// Cell model parameters (crystalline silicon)

/// Effective thermal voltage n*k*T/q at 25 C, ideality n = 1.5 \[V\]
const VT_CELL: f64 = 0.038;

/// Open-circuit voltage of a fully lit cell at 1 sun \[V\]
const VOC_CELL: f64 = 0.65;

/// Reverse-bias breakdown voltage, clamp for shaded cells \[V\]
const V_RBD: f64 = -5.5;

/// Slope of the linear reverse branch \[Ohm\]
const R_RBD: f64 = 0.5;

/// One PV module: series cells, per-cell irradiance and the resulting curve
#[derive(Debug, Clone)]
pub struct PvModule {
    pvconst: Arc<PvConstants>,
    number_cells: usize,

    /// Per-cell irradiance \[suns\]
    ee: DVector<f64>,

    /// Current samples, ascending from the reverse bound to the
    /// breakdown-limited maximum \[A\]
    imod: DVector<f64>,

    /// Voltage at each current sample \[V\]
    vmod: DVector<f64>,

    /// Diode saturation current, derived from `isc0` and `VOC_CELL` \[A\]
    isat: f64,
}

impl PvModule {
    /// Create a module with uniform irradiance on every cell
    ///
    /// # Errors
    ///
    /// [`PvError::Configuration`] if `number_cells` is zero or `ee` is
    /// negative or non-finite.
    pub fn new(pvconst: Arc<PvConstants>, number_cells: usize, ee: f64) -> PvResult<Self> {
        if number_cells == 0 {
            return Err(PvError::Configuration(
                "Module needs at least one cell".to_string(),
            ));
        }
        check_suns(ee)?;

        let isat = pvconst.isc0 / ((VOC_CELL / VT_CELL).exp() - 1.0);
        let mut module = Self {
            pvconst,
            number_cells,
            ee: DVector::from_element(number_cells, ee),
            imod: DVector::zeros(0),
            vmod: DVector::zeros(0),
            isat,
        };
        module.calc_mod();
        Ok(module)
    }

    /// Module from an externally supplied curve, bypassing the cell model.
    /// Crate-internal: used to exercise the aggregator against hand-built
    /// curves.
    pub(crate) fn from_curve_parts(
        pvconst: Arc<PvConstants>,
        number_cells: usize,
        imod: DVector<f64>,
        vmod: DVector<f64>,
        ee: f64,
    ) -> Self {
        let isat = pvconst.isc0 / ((VOC_CELL / VT_CELL).exp() - 1.0);
        Self {
            pvconst,
            number_cells,
            ee: DVector::from_element(number_cells, ee),
            imod,
            vmod,
            isat,
        }
    }

    /// Current samples, ascending \[A\]
    pub fn imod(&self) -> &DVector<f64> {
        &self.imod
    }

    /// Voltage samples, one per current sample \[V\]
    pub fn vmod(&self) -> &DVector<f64> {
        &self.vmod
    }

    /// Per-cell irradiance \[suns\]
    pub fn ee(&self) -> &DVector<f64> {
        &self.ee
    }

    /// Mean irradiance over all cells \[suns\]
    pub fn ee_mean(&self) -> f64 {
        self.ee.mean()
    }

    /// Number of series cells
    pub fn number_cells(&self) -> usize {
        self.number_cells
    }

    /// Validate an irradiance specification against this module without
    /// applying it
    ///
    /// Used by the string aggregator to check every entry of a multi-module
    /// update before mutating any module.
    ///
    /// # Errors
    ///
    /// [`PvError::Configuration`] for malformed shapes or non-physical
    /// values, [`PvError::CellIndex`] for out-of-range cell indices.
    pub fn validate_spec(&self, spec: &ModuleIrradiance) -> PvResult<()> {
        match spec {
            ModuleIrradiance::Uniform(ee) => check_suns(*ee),
            ModuleIrradiance::Cells { ee, cells } => {
                if cells.is_empty() {
                    return Err(PvError::Configuration(
                        "Per-cell irradiance spec lists no cells".to_string(),
                    ));
                }
                if ee.len() != cells.len() && ee.len() != 1 {
                    return Err(PvError::Configuration(format!(
                        "Per-cell irradiance spec shape mismatch: {} values for {} cells \
                         (need one per cell, or a single broadcast value)",
                        ee.len(),
                        cells.len()
                    )));
                }
                for &cell in cells {
                    if cell >= self.number_cells {
                        return Err(PvError::CellIndex {
                            index: cell,
                            number_cells: self.number_cells,
                        });
                    }
                }
                for &value in ee {
                    check_suns(value)?;
                }
                Ok(())
            }
        }
    }

    /// Reassign irradiance and recompute the module curve
    ///
    /// Safe to call repeatedly; applying the same specification twice leaves
    /// the curve unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`PvModule::validate_spec`]; nothing is mutated on failure.
    pub fn set_suns(&mut self, spec: &ModuleIrradiance) -> PvResult<()> {
        self.validate_spec(spec)?;
        match spec {
            ModuleIrradiance::Uniform(ee) => self.ee.fill(*ee),
            ModuleIrradiance::Cells { ee, cells } => {
                for (k, &cell) in cells.iter().enumerate() {
                    self.ee[cell] = if ee.len() == 1 { ee[0] } else { ee[k] };
                }
            }
        }
        self.calc_mod();
        Ok(())
    }

    /// Voltage of one cell at the given current \[V\]
    ///
    /// Forward branch: V = VT * ln(1 + (Isc_cell - I)/Isat), zero at the
    /// cell's own short-circuit current. Above Isc_cell the cell is driven
    /// into reverse bias along a linear branch clamped at breakdown.
    fn cell_voltage(&self, current: f64, ee: f64) -> f64 {
        let isc_cell = ee * self.pvconst.isc0;
        if current <= isc_cell {
            VT_CELL * (1.0 + (isc_cell - current) / self.isat).ln()
        } else {
            (-(current - isc_cell) * R_RBD).max(V_RBD)
        }
    }

    /// Rebuild the module curve from the current per-cell irradiance
    ///
    /// The current grid reuses the shared ratio profiles: the positive half
    /// runs from the module Isc (mean irradiance times reference Isc) up to
    /// the breakdown-limited current of the best-lit cell, the negative half
    /// down to -isc0. Cell voltages are summed at common current.
    fn calc_mod(&mut self) {
        let pvconst = &self.pvconst;
        let npts = pvconst.npts;

        let isc_mod = self.ee.mean() * pvconst.isc0;
        let imax = self.ee.max() * pvconst.isc0 + (-V_RBD) / R_RBD;
        let imin = -pvconst.isc0;

        let mut imod = DVector::zeros(2 * npts);
        for k in 0..npts {
            imod[k] = (imin - isc_mod) * pvconst.imod_negpts[k] + isc_mod;
            imod[npts + k] = (imax - isc_mod) * pvconst.imod_pts[k] + isc_mod;
        }

        let vmod = DVector::from_fn(2 * npts, |k, _| {
            self.ee.iter().map(|&ee| self.cell_voltage(imod[k], ee)).sum()
        });

        self.imod = imod;
        self.vmod = vmod;
    }
}

fn check_suns(ee: f64) -> PvResult<()> {
    if !ee.is_finite() || ee < 0.0 {
        return Err(PvError::Configuration(format!(
            "Irradiance must be finite and non-negative, got {}",
            ee
        )));
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
