//! Output: plotting and data export
//!
//! External-facing side effects live here, separate from the curve
//! computation itself:
//!
//! - **`plot`**: static two-panel I-V / P-V figures via `plotters`
//! - **`csv`**: curve export to CSV for spreadsheets and analysis tools
//!
//! Both consume a finished [`StringCurve`](crate::string::StringCurve) and
//! retain no state.

pub mod csv;
pub mod plot;

pub use csv::{export_string_csv, CsvConfig};
pub use plot::{plot_string, PlotConfig};
