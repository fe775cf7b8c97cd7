//! pvstring-rs: PV String Mismatch Modeling
//!
//! Models the electrical behavior of a photovoltaic string (a series chain
//! of PV modules) by composing per-module I-V curves into a string-level
//! I-V/P-V curve under non-uniform irradiance ("mismatch").
//!
//! # Architecture
//!
//! The crate is built on two principles:
//!
//! 1. **Separation of curve sources and composition**
//!    - Modules produce their own I-V curves (cell physics)
//!    - The string aggregator composes them at common current (numerics)
//!
//! 2. **Explicit dependencies and typed errors**
//!    - Constants are injected via `Arc<PvConstants>`, never a shared global
//!    - Irradiance updates are tagged variants, validated before any mutation
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use pvstring_rs::{PvConstants, PvString};
//! use pvstring_rs::irradiance::{ModuleIrradiance, StringIrradiance};
//!
//! # fn main() -> Result<(), pvstring_rs::PvError> {
//! // 1. Shared constants (explicit, immutable)
//! let pvconst = Arc::new(PvConstants::default());
//!
//! // 2. A string of 10 modules, 96 cells each, at 1 sun
//! let mut string = PvString::new(Arc::clone(&pvconst), 10, 96, 1.0)?;
//!
//! // 3. Shade three cells of module 4
//! let spec = StringIrradiance::one_module(
//!     4,
//!     ModuleIrradiance::cells(vec![0.2], vec![10, 11, 12]),
//! );
//! string.set_suns(&spec)?;
//!
//! // 4. Access the recomputed aggregate curve
//! let curve = string.curve();
//! assert_eq!(curve.len(), 2 * pvconst.npts);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **`constants`**: reference values, resampling profiles, interpolation
//! - **`module`**: per-module curve source with per-cell irradiance
//! - **`string`**: the series-composition aggregator (core algorithm)
//! - **`irradiance`**: tagged irradiance specifications
//! - **`output`**: plotting (`plotters`) and CSV export
//! - **`error`**: error taxonomy

pub mod constants;
pub mod error;
pub mod irradiance;
pub mod module;
pub mod output;
pub mod string;

pub use constants::PvConstants;
pub use error::{PvError, PvResult};
pub use irradiance::{ModuleIrradiance, StringIrradiance};
pub use module::PvModule;
pub use string::{PvString, StringCurve};
