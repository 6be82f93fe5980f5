//! Incremental multi-curve overlay plots.
//!
//! A `SpectralOverlay` accepts histograms one at a time, fixes its axis
//! frame when the first drawable histogram arrives, and exports the finished
//! figure in five interchangeable formats (see `plot::export`).
//!
//! Known quirk, kept on purpose: a zero-integral histogram still registers a
//! legend entry but is excluded from the drawn set. The original tool behaved
//! this way, and downstream consumers rely on legend order matching add
//! order, so the skip is documented rather than "fixed".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::hist::Hist1D;
use crate::plot::export;
use crate::plot::palette::{LineStyle, Rgb};

/// Sentinel y-range meaning "derive the range from the drawn curves".
pub const AUTO_RANGE: (f64, f64) = (-1.0, -1.0);

/// How a curve is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawStyle {
    /// Stepped line following the bin contents.
    Line,
    /// Markers at bin centers (used for observed data).
    Points,
}

/// Full per-curve cosmetics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveStyle {
    pub color: Rgb,
    pub line: LineStyle,
    pub draw: DrawStyle,
}

/// Overlay construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub line_width: u32,
    pub x_range: (f64, f64),
    /// `AUTO_RANGE` means "auto".
    pub y_range: (f64, f64),
    pub log_y: bool,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
}

/// One histogram registered with an overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayCurve {
    /// Internal object name (`__<name>` of the name passed to `add`).
    pub name: String,
    /// Legend title.
    pub legend: String,
    pub hist: Hist1D,
    pub style: CurveStyle,
    /// Whether the curve is part of the drawn set. Zero-integral histograms
    /// keep their legend entry but are not drawn.
    pub drawn: bool,
}

/// Axis frame fixed by the first drawn histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x_range: (f64, f64),
    /// `None` when the configured y-range was `AUTO_RANGE`.
    pub y_range: Option<(f64, f64)>,
}

/// An incremental multi-curve plot with a legend.
#[derive(Debug, Clone)]
pub struct SpectralOverlay {
    config: OverlayConfig,
    curves: Vec<OverlayCurve>,
    frame: Option<Frame>,
}

impl SpectralOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            curves: Vec::new(),
            frame: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// All registered curves, in add order (legend order).
    pub fn curves(&self) -> &[OverlayCurve] {
        &self.curves
    }

    /// The axis frame, once a drawable histogram has been added.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// First drawn histogram (the base curve).
    pub fn base_histogram(&self) -> Option<&Hist1D> {
        self.curves.iter().find(|c| c.drawn).map(|c| &c.hist)
    }

    /// Register a histogram.
    ///
    /// The input is cloned under an internal name, decoupling the overlay
    /// from the caller's copy. The legend entry is registered
    /// unconditionally; the curve joins the drawn set only if its integral is
    /// non-zero. The first drawn curve fixes the axis frame from the
    /// configured ranges; later additions render superimposed and never
    /// re-trigger ranging.
    pub fn add(
        &mut self,
        hist: &Hist1D,
        name: &str,
        legend_title: &str,
        style: CurveStyle,
    ) {
        let mut clone = hist.clone();
        clone.set_name(format!("__{name}"));

        let drawn = clone.integral() != 0.0;
        if drawn && self.frame.is_none() {
            self.frame = Some(Frame {
                x_range: self.config.x_range,
                y_range: if self.config.y_range == AUTO_RANGE {
                    None
                } else {
                    Some(self.config.y_range)
                },
            });
        }

        self.curves.push(OverlayCurve {
            name: format!("__{name}"),
            legend: legend_title.to_string(),
            hist: clone,
            style,
            drawn,
        });
    }

    /// An empty histogram with binning identical to `hist`, used to seed data
    /// histograms that must align with the drawn curves.
    pub fn make_like(hist: &Hist1D, name: &str) -> Hist1D {
        hist.zeroed_like(name)
    }

    /// X-range used for rendering.
    pub fn x_bounds(&self) -> (f64, f64) {
        self.frame
            .as_ref()
            .map(|f| f.x_range)
            .unwrap_or(self.config.x_range)
    }

    /// Y-range used for rendering: the fixed frame range when configured,
    /// otherwise derived from the drawn curves.
    pub fn y_bounds(&self) -> (f64, f64) {
        if let Some(range) = self.frame.as_ref().and_then(|f| f.y_range) {
            return range;
        }

        let mut max = f64::NEG_INFINITY;
        let mut min_positive = f64::INFINITY;
        for curve in self.curves.iter().filter(|c| c.drawn) {
            for &v in curve.hist.counts() {
                if v > max {
                    max = v;
                }
                if v > 0.0 && v < min_positive {
                    min_positive = v;
                }
            }
        }

        if self.config.log_y {
            if !max.is_finite() || max <= 0.0 {
                return (0.1, 10.0);
            }
            let lo = if min_positive.is_finite() {
                (min_positive * 0.5).max(max * 1e-6)
            } else {
                max * 1e-3
            };
            (lo, max * 2.0)
        } else {
            if !max.is_finite() || max <= 0.0 {
                return (0.0, 1.0);
            }
            (0.0, max * 1.15)
        }
    }

    /// Draw the legend and export the composed figure under `base`, one
    /// sibling file per format. Returns the written paths.
    pub fn save(&self, base: &Path) -> Result<Vec<PathBuf>, PlotError> {
        export::save_all(self, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hist::BinAxis;
    use crate::plot::palette::Palette;

    fn config() -> OverlayConfig {
        OverlayConfig {
            line_width: 2,
            x_range: (0.0, 10.0),
            y_range: AUTO_RANGE,
            log_y: false,
            title: String::new(),
            x_title: "Energy (MeV)".to_string(),
            y_title: "Events/1 MeV/1 y".to_string(),
        }
    }

    fn filled(name: &str, value: f64) -> Hist1D {
        let mut h = Hist1D::new(name, BinAxis::new(0.0, 10.0, 10));
        h.fill(value);
        h
    }

    fn style() -> CurveStyle {
        let entry = Palette::standard().entry(0);
        CurveStyle {
            color: entry.color,
            line: entry.style,
            draw: DrawStyle::Line,
        }
    }

    #[test]
    fn first_add_fixes_the_frame_and_second_does_not_retrigger() {
        let mut overlay = SpectralOverlay::new(config());
        assert!(overlay.frame().is_none());

        overlay.add(&filled("a", 1.0), "a", "A", style());
        let frame = *overlay.frame().unwrap();
        assert_eq!(frame.x_range, (0.0, 10.0));
        assert_eq!(frame.y_range, None);

        overlay.add(&filled("b", 2.0), "b", "B", style());
        assert_eq!(*overlay.frame().unwrap(), frame);
    }

    #[test]
    fn configured_y_range_is_applied_on_first_add() {
        let mut cfg = config();
        cfg.y_range = (0.0, 50.0);
        let mut overlay = SpectralOverlay::new(cfg);
        overlay.add(&filled("a", 1.0), "a", "A", style());
        assert_eq!(overlay.frame().unwrap().y_range, Some((0.0, 50.0)));
        assert_eq!(overlay.y_bounds(), (0.0, 50.0));
    }

    #[test]
    fn zero_integral_histogram_keeps_legend_entry_but_is_not_drawn() {
        let mut overlay = SpectralOverlay::new(config());
        let empty = Hist1D::new("empty", BinAxis::new(0.0, 10.0, 10));
        overlay.add(&empty, "empty", "Empty", style());

        assert_eq!(overlay.curves().len(), 1);
        assert_eq!(overlay.curves()[0].legend, "Empty");
        assert!(!overlay.curves()[0].drawn);
        // A skipped histogram does not fix the frame either.
        assert!(overlay.frame().is_none());
        assert!(overlay.base_histogram().is_none());
    }

    #[test]
    fn add_clones_under_an_internal_name() {
        let mut overlay = SpectralOverlay::new(config());
        let h = filled("sig", 1.0);
        overlay.add(&h, "sig", "Signal", style());
        assert_eq!(overlay.curves()[0].hist.name(), "__sig");
        // Caller's copy is untouched.
        assert_eq!(h.name(), "sig");
    }

    #[test]
    fn make_like_yields_an_empty_histogram_with_identical_binning() {
        let h = filled("sig", 1.0);
        let like = SpectralOverlay::make_like(&h, "hdata");
        assert_eq!(like.name(), "hdata");
        assert_eq!(like.axis(), h.axis());
        assert_eq!(like.integral(), 0.0);
    }

    #[test]
    fn auto_y_bounds_cover_the_tallest_drawn_curve() {
        let mut overlay = SpectralOverlay::new(config());
        let mut h = filled("a", 1.0);
        h.scale(40.0);
        overlay.add(&h, "a", "A", style());
        let (lo, hi) = overlay.y_bounds();
        assert_eq!(lo, 0.0);
        assert!(hi >= 40.0);
    }
}
