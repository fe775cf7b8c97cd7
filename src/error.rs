//! Error taxonomy for PV string modeling
//!
//! All validation failures are raised at the point of detection: constructors
//! and setters return before any partial state escapes. Errors reflect caller
//! misuse, not transient conditions, so nothing here is retryable.

use thiserror::Error;

/// Errors raised by string/module construction, irradiance updates and
/// curve composition.
#[derive(Error, Debug)]
pub enum PvError {
    /// Malformed constructor or irradiance-specification arguments
    /// (mismatched cell counts, empty module list, bad spec shape, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Module index outside the string
    #[error("Module index {index} out of range: string has {number_mods} modules")]
    ModuleIndex { index: usize, number_mods: usize },

    /// Cell index outside a module
    #[error("Cell index {index} out of range: module has {number_cells} cells")]
    CellIndex { index: usize, number_cells: usize },

    /// Degenerate or malformed I-V curve that cannot be interpolated
    #[error("Curve data error: {0}")]
    CurveData(String),

    /// Plot backend failure
    #[error("Render error: {0}")]
    Render(String),

    /// IO error (CSV export)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate
pub type PvResult<T> = Result<T, PvError>;
