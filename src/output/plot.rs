//! Static plot generation for string curves
//!
//! Uses the `plotters` library to render a two-panel figure from a
//! [`StringCurve`]: string I-V on top, string P-V below, sharing the voltage
//! axis. Output format (PNG or SVG) follows the file extension.
//!
//! # Example
//!
//! ```rust,ignore
//! use pvstring_rs::output::{plot_string, PlotConfig};
//!
//! let string = PvString::new(pvconst, 10, 96, 1.0)?;
//! plot_string(string.curve(), string.pvconst().isc0, "string.png", None)?;
//!
//! // Or with a custom configuration
//! let mut config = PlotConfig::default();
//! config.title = "Partially shaded string".to_string();
//! plot_string(string.curve(), string.pvconst().isc0, "shaded.svg", Some(&config))?;
//! ```

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{PvError, PvResult};
use crate::string::StringCurve;

// =================================================================================================
// Configuration
// =================================================================================================

/// Configuration for string plots
///
/// # Fields
///
/// - `width`, `height`: figure dimensions in pixels
/// - `title`: overall figure title (shown on the I-V panel)
/// - `line_color`: curve color for both panels
/// - `background`: background fill
/// - `line_width`: line thickness in pixels
/// - `show_grid`: whether to draw grid lines
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub line_color: RGBColor,
    pub background: RGBColor,
    pub line_width: u32,
    pub show_grid: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "String I-V Characteristics".to_string(),
            line_color: BLUE,
            background: WHITE,
            line_width: 2,
            show_grid: true,
        }
    }
}

// =================================================================================================
// Public API
// =================================================================================================

/// Render a string curve as two stacked panels (I-V above P-V)
///
/// The I-V panel's current axis is capped at `isc0 + 1` so the forward
/// operating region stays readable even when the sampled curve reaches deep
/// into reverse breakdown.
///
/// # Arguments
///
/// * `curve` - aggregate curve to draw
/// * `isc0` - reference short-circuit current, used for the I-V axis cap \[A\]
/// * `output_path` - output file (.png or .svg)
/// * `config` - optional plot configuration
///
/// # Errors
///
/// [`PvError::CurveData`] for an empty curve, [`PvError::Render`] if the
/// backend fails.
pub fn plot_string(
    curve: &StringCurve,
    isc0: f64,
    output_path: &str,
    config: Option<&PlotConfig>,
) -> PvResult<()> {
    let owned_config = config.cloned().unwrap_or_default();
    let config = &owned_config;

    if curve.is_empty() {
        return Err(PvError::CurveData("cannot plot an empty curve".to_string()));
    }

    if output_path.ends_with(".svg") {
        let root = SVGBackend::new(output_path, (config.width, config.height))
            .into_drawing_area();
        draw_panels(&root, curve, isc0, config)
    } else {
        let root = BitMapBackend::new(output_path, (config.width, config.height))
            .into_drawing_area();
        draw_panels(&root, curve, isc0, config)
    }
}

// =================================================================================================
// Drawing
// =================================================================================================

/// Draw both panels on any drawing area backend
fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    curve: &StringCurve,
    isc0: f64,
    config: &PlotConfig,
) -> PvResult<()> {
    root.fill(&config.background).map_err(render_err)?;

    let panels = root.split_evenly((2, 1));

    let (v_min, v_max) = axis_range(&curve.vstring);
    let i_min = curve.istring.min().min(0.0);
    let i_max = isc0 + 1.0;
    let (p_min, p_max) = axis_range(&curve.pstring);

    // ====== Top panel: I-V ======

    let mut iv_chart = ChartBuilder::on(&panels[0])
        .caption(&config.title, ("sans-serif", 30.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(v_min..v_max, i_min..i_max)
        .map_err(render_err)?;

    let mut mesh = iv_chart.configure_mesh();
    mesh.x_desc("String Voltage, V [V]")
        .y_desc("String Current, I [A]");
    if config.show_grid {
        mesh.draw().map_err(render_err)?;
    } else {
        mesh.disable_mesh().draw().map_err(render_err)?;
    }

    iv_chart
        .draw_series(LineSeries::new(
            curve
                .vstring
                .iter()
                .zip(curve.istring.iter())
                .map(|(&v, &i)| (v, i)),
            config.line_color.stroke_width(config.line_width),
        ))
        .map_err(render_err)?;

    // ====== Bottom panel: P-V ======

    let mut pv_chart = ChartBuilder::on(&panels[1])
        .caption("String P-V Characteristics", ("sans-serif", 30.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(v_min..v_max, p_min..p_max)
        .map_err(render_err)?;

    let mut mesh = pv_chart.configure_mesh();
    mesh.x_desc("String Voltage, V [V]")
        .y_desc("String Power, P [W]");
    if config.show_grid {
        mesh.draw().map_err(render_err)?;
    } else {
        mesh.disable_mesh().draw().map_err(render_err)?;
    }

    pv_chart
        .draw_series(LineSeries::new(
            curve
                .vstring
                .iter()
                .zip(curve.pstring.iter())
                .map(|(&v, &p)| (v, p)),
            config.line_color.stroke_width(config.line_width),
        ))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Axis range with a 10% margin on both sides
fn axis_range(values: &nalgebra::DVector<f64>) -> (f64, f64) {
    let min = values.min();
    let max = values.max();
    let span = (max - min).max(f64::MIN_POSITIVE);
    (min - 0.1 * span, max + 0.1 * span)
}

fn render_err<E: std::fmt::Display>(err: E) -> PvError {
    PvError::Render(err.to_string())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PvConstants;
    use crate::string::PvString;
    use std::sync::Arc;

    fn test_curve() -> (StringCurve, f64) {
        let pvconst = Arc::new(PvConstants::default());
        let string = PvString::new(Arc::clone(&pvconst), 2, 24, 1.0).unwrap();
        (string.curve().clone(), pvconst.isc0)
    }

    #[test]
    fn test_plot_png() {
        let (curve, isc0) = test_curve();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("string.png");

        plot_string(&curve, isc0, path.to_str().unwrap(), None).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_svg_with_config() {
        let (curve, isc0) = test_curve();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("string.svg");

        let mut config = PlotConfig::default();
        config.title = "Two module string".to_string();
        config.show_grid = false;

        plot_string(&curve, isc0, path.to_str().unwrap(), Some(&config)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_empty_curve_rejected() {
        use nalgebra::DVector;
        let curve = StringCurve {
            istring: DVector::zeros(0),
            vstring: DVector::zeros(0),
            pstring: DVector::zeros(0),
        };
        let err = plot_string(&curve, 6.3, "unused.png", None).unwrap_err();
        assert!(matches!(err, PvError::CurveData(_)));
    }
}
