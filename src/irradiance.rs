//! Tagged irradiance specifications
//!
//! Irradiance updates arrive in one of a small number of shapes: a single
//! scalar for a whole string, a scalar for one module, or explicit per-cell
//! values. Instead of sniffing the shape at dispatch time, the shape is
//! resolved once at the API boundary into these variants, and every consumer
//! matches on the tag.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use pvstring_rs::irradiance::{ModuleIrradiance, StringIrradiance};
//!
//! // Everything at 0.91 suns
//! let uniform = StringIrradiance::Uniform(0.91);
//!
//! // Shade cell 0 of module 0 to half a sun
//! let mut per_module = BTreeMap::new();
//! per_module.insert(0, ModuleIrradiance::cells(vec![0.5], vec![0]));
//! let shaded = StringIrradiance::PerModule(per_module);
//! # let _ = (uniform, shaded);
//! ```

use std::collections::BTreeMap;

/// Irradiance specification for a single module
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleIrradiance {
    /// One value applied to every cell \[suns\]
    Uniform(f64),

    /// Explicit values for the listed cell indices \[suns\]
    ///
    /// `ee` holds either one value per listed cell, or a single value
    /// broadcast across all listed cells.
    Cells { ee: Vec<f64>, cells: Vec<usize> },
}

impl ModuleIrradiance {
    /// Per-cell specification from value and index lists
    pub fn cells(ee: Vec<f64>, cells: Vec<usize>) -> Self {
        Self::Cells { ee, cells }
    }
}

/// Irradiance specification for a whole string
///
/// The per-module map is keyed by module index. A `BTreeMap` keeps the
/// application order deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum StringIrradiance {
    /// One value applied to every cell of every module \[suns\]
    Uniform(f64),

    /// Targeted updates, module index → module specification
    PerModule(BTreeMap<usize, ModuleIrradiance>),
}

impl StringIrradiance {
    /// Single targeted update for one module
    pub fn one_module(index: usize, spec: ModuleIrradiance) -> Self {
        let mut map = BTreeMap::new();
        map.insert(index, spec);
        Self::PerModule(map)
    }
}

impl From<f64> for StringIrradiance {
    fn from(ee: f64) -> Self {
        Self::Uniform(ee)
    }
}

impl From<f64> for ModuleIrradiance {
    fn from(ee: f64) -> Self {
        Self::Uniform(ee)
    }
}
