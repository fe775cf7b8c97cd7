//! CSV export for string curves
//!
//! Writes a [`StringCurve`] as voltage/current/power columns, compatible
//! with Excel, pandas and most analysis tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use pvstring_rs::output::export_string_csv;
//!
//! export_string_csv(string.curve(), "string.csv", None)?;
//! ```
//!
//! **Output** (`string.csv`):
//! ```csv
//! Voltage (V),Current (A),Power (W)
//! -12.456789,12.600001,-156.955...
//! ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::{PvError, PvResult};
use crate::string::StringCurve;

/// Configuration for CSV export
///
/// # Fields
///
/// - `delimiter`: column separator (default ',')
/// - `precision`: decimal places for every value (default 6)
/// - `include_header`: write the column-name row (default true)
#[derive(Debug, Clone)]
pub struct CsvConfig {
    pub delimiter: char,
    pub precision: usize,
    pub include_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            precision: 6,
            include_header: true,
        }
    }
}

/// Export a string curve to CSV
///
/// One row per curve sample, in grid order: voltage, current, power.
///
/// # Errors
///
/// [`PvError::CurveData`] for an empty curve, [`PvError::Io`] on write
/// failure.
pub fn export_string_csv(
    curve: &StringCurve,
    output_path: &str,
    config: Option<&CsvConfig>,
) -> PvResult<()> {
    let owned_config = config.cloned().unwrap_or_default();
    let config = &owned_config;

    if curve.is_empty() {
        return Err(PvError::CurveData("cannot export an empty curve".to_string()));
    }

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    if config.include_header {
        writeln!(
            writer,
            "Voltage (V){d}Current (A){d}Power (W)",
            d = config.delimiter
        )?;
    }

    for k in 0..curve.len() {
        writeln!(
            writer,
            "{v:.p$}{d}{i:.p$}{d}{w:.p$}",
            v = curve.vstring[k],
            i = curve.istring[k],
            w = curve.pstring[k],
            d = config.delimiter,
            p = config.precision,
        )?;
    }

    writer.flush()?;
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
