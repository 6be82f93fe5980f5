//! Fit-plot orchestration.
//!
//! `plot_fit` drives the whole pipeline for one best-fit result:
//!
//! parameter vector -> per-signal model evaluation -> yield scaling ->
//! per-axis projection -> per-dataset totals -> overlays -> exports
//!
//! Either every (dataset, observable) overlay and the persisted totals
//! container are produced, or the invocation fails with a diagnostic naming
//! the offending signal/source/systematic. The container is written last, so
//! a failure during signal evaluation leaves no partial container behind.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub mod aggregate;

pub use aggregate::*;

use crate::domain::{BestFit, DatasetId, Observable, Signal, Source, Systematic};
use crate::error::PlotError;
use crate::fit::{build_parameter_vector, expected_events, scale_to_expected};
use crate::hist::{BinAxis, Hist1D};
use crate::io::write_totals;
use crate::plot::{
    CurveStyle, DrawStyle, LineStyle, OverlayConfig, Palette, Rgb, SpectralOverlay,
};

/// Everything `plot_fit` wrote.
#[derive(Debug, Clone)]
pub struct PlotFitOutput {
    /// All per-(dataset, observable) export files, in save order.
    pub overlay_paths: Vec<PathBuf>,
    /// The persisted totals container.
    pub totals_path: PathBuf,
}

/// Render one best-fit result as comparison plots.
///
/// For every dataset and observable this overlays the scaled expected-signal
/// spectra, their summed "total fit" curve, and the observed-data histogram,
/// then exports the figure and persists the full-dimensional totals.
///
/// `live_time` (years) only appears in the synthesized y-axis title. `data`
/// is the flat observed-event array: `observables.len() + 1` values per
/// record, the last being the dataset id.
#[allow(clippy::too_many_arguments)]
pub fn plot_fit(
    best_fit: &BestFit,
    live_time: f64,
    sources: &[Source],
    signals: &mut [Signal],
    systematics: &[Systematic],
    observables: &[Observable],
    datasets: &BTreeSet<DatasetId>,
    data: &[f64],
    palette: &Palette,
    output_dir: &Path,
) -> Result<PlotFitOutput, PlotError> {
    validate_inputs(signals, observables, datasets, data)?;

    std::fs::create_dir_all(output_dir).map_err(|e| {
        PlotError::export(format!(
            "failed to create output directory '{}': {e}",
            output_dir.display()
        ))
    })?;

    // One overlay per (dataset, observable).
    let mut overlays: BTreeMap<DatasetId, Vec<SpectralOverlay>> = datasets
        .iter()
        .map(|&ds| {
            let plots = observables
                .iter()
                .map(|o| SpectralOverlay::new(overlay_config(o, live_time)))
                .collect();
            (ds, plots)
        })
        .collect();

    let params = build_parameter_vector(best_fit, sources, systematics)?;
    info!(parameters = params.len(), signals = signals.len(), "plotting best fit");

    let mut aggregator = FitAggregator::new(datasets, observables);
    let mut ordinals: BTreeMap<DatasetId, usize> = BTreeMap::new();

    for signal in signals.iter_mut() {
        // One outstanding evaluation at a time, consumed before the next
        // submit. A pipelined driver may interleave these as long as each
        // evaluator's outputs are read after its own completion.
        signal.evaluator.submit(&params, sources.len())?;
        signal.evaluator.await_completion()?;

        let accepted = signal.evaluator.accepted_events();
        let hist = signal.evaluator.create_histogram()?;
        if hist.dim() != observables.len() {
            return Err(PlotError::dimensionality(format!(
                "model histogram for signal '{}' has {} dimensions but {} observables are configured",
                signal.name,
                hist.dim(),
                observables.len()
            )));
        }

        let expected = expected_events(signal, accepted, &params)?;
        let mut scaled = scale_to_expected(hist, expected, &signal.name)?;
        scaled.set_name(signal.name.clone());
        let marginals = scaled.project();

        let ordinal = ordinals.entry(signal.dataset).or_insert(0);
        let slot = palette.entry(*ordinal);
        *ordinal += 1;

        aggregator.add_signal(signal.dataset, &scaled, &marginals)?;

        if let Some(plots) = overlays.get_mut(&signal.dataset) {
            for (j, marginal) in marginals.iter().enumerate() {
                plots[j].add(
                    marginal,
                    &signal.name,
                    &signal.title,
                    CurveStyle {
                        color: slot.color,
                        line: slot.style,
                        draw: DrawStyle::Line,
                    },
                );
            }
        }

        debug!(
            signal = %signal.name,
            dataset = signal.dataset,
            accepted,
            expected,
            "accumulated scaled signal spectrum"
        );
    }

    // Finish every overlay: total fit curve, data histogram, export.
    let mut overlay_paths = Vec::new();
    for (&ds, plots) in overlays.iter_mut() {
        for (j, observable) in observables.iter().enumerate() {
            let overlay = &mut plots[j];

            if let Some(total) = aggregator.totals(ds).and_then(|t| t.marginal(j)) {
                overlay.add(
                    total,
                    "fit",
                    "Fit",
                    CurveStyle {
                        color: Rgb::MAGENTA,
                        line: LineStyle::Solid,
                        draw: DrawStyle::Line,
                    },
                );
            }

            let template = match overlay.base_histogram() {
                Some(base) => SpectralOverlay::make_like(base, "hdata"),
                // Dataset drew no curves; fall back to the observable's own
                // binning, which every drawn curve shares anyway.
                None => Hist1D::new("hdata", BinAxis::from_observable(observable)),
            };
            let hdata = build_data_histogram(&template, data, observables.len(), j, ds)?;
            overlay.add(
                &hdata,
                "data",
                "Data",
                CurveStyle {
                    color: Rgb::BLACK,
                    line: LineStyle::Solid,
                    draw: DrawStyle::Points,
                },
            );

            let base = output_dir.join(format!("{}_{}", observable.name, ds));
            overlay_paths.extend(overlay.save(&base)?);
        }
    }

    let totals_path = output_dir.join("fit_pdfs.json");
    write_totals(&totals_path, &aggregator.into_nd_totals())?;
    info!(container = %totals_path.display(), plots = overlay_paths.len(), "fit plots written");

    Ok(PlotFitOutput {
        overlay_paths,
        totals_path,
    })
}

fn overlay_config(observable: &Observable, live_time: f64) -> OverlayConfig {
    let bin_width = (observable.upper - observable.lower) / observable.bins as f64;
    OverlayConfig {
        line_width: 2,
        x_range: (observable.lower, observable.upper),
        y_range: observable.yrange,
        log_y: observable.logscale,
        title: String::new(),
        x_title: observable.title.clone(),
        y_title: format!("Events/{bin_width:.3} {}/{live_time} y", observable.units),
    }
}

fn validate_inputs(
    signals: &[Signal],
    observables: &[Observable],
    datasets: &BTreeSet<DatasetId>,
    data: &[f64],
) -> Result<(), PlotError> {
    if observables.is_empty() {
        return Err(PlotError::config("no observables configured"));
    }
    for signal in signals {
        if !datasets.contains(&signal.dataset) {
            return Err(PlotError::config(format!(
                "signal '{}' references dataset {} which is not in the dataset set",
                signal.name, signal.dataset
            )));
        }
    }
    let stride = observables.len() + 1;
    if data.len() % stride != 0 {
        return Err(PlotError::config(format!(
            "data array length {} is not a multiple of the record stride {stride}",
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use crate::hist::{Hist2D, Histogram};
    use crate::models::ModelEvaluator;
    use crate::plot::export::read_overlay_archive;
    use nalgebra::DVector;
    use std::collections::HashMap;

    /// Deterministic stand-in for the model-evaluation engine.
    struct StubEvaluator {
        hist: Histogram,
        accepted: u64,
        completed: bool,
    }

    impl StubEvaluator {
        fn new(hist: Histogram, accepted: u64) -> Box<Self> {
            Box::new(Self {
                hist,
                accepted,
                completed: false,
            })
        }
    }

    impl ModelEvaluator for StubEvaluator {
        fn submit(&mut self, params: &DVector<f64>, source_offset: usize) -> Result<(), PlotError> {
            assert!(source_offset <= params.len());
            self.completed = false;
            Ok(())
        }

        fn await_completion(&mut self) -> Result<(), PlotError> {
            self.completed = true;
            Ok(())
        }

        fn accepted_events(&self) -> u64 {
            self.accepted
        }

        fn create_histogram(&self) -> Result<Histogram, PlotError> {
            if !self.completed {
                return Err(PlotError::evaluation("histogram requested before completion"));
            }
            Ok(self.hist.clone())
        }
    }

    fn energy_observable() -> Observable {
        Observable {
            name: "energy".to_string(),
            title: "Energy (MeV)".to_string(),
            units: "MeV".to_string(),
            lower: 0.0,
            upper: 10.0,
            bins: 10,
            yrange: (-1.0, -1.0),
            logscale: false,
        }
    }

    fn model_hist_1d() -> Histogram {
        let mut h = Hist1D::new("model", BinAxis::new(0.0, 10.0, 10));
        h.fill(1.5);
        h.fill(4.5);
        h.fill(4.5);
        h.fill(8.5);
        Histogram::Dim1(h)
    }

    fn signal(name: &str, dataset: DatasetId, evaluator: Box<dyn ModelEvaluator>) -> Signal {
        Signal {
            name: name.to_string(),
            title: name.to_uppercase(),
            source: Source {
                name: "tl208".to_string(),
                index: 0,
            },
            dataset,
            nexpected: 100.0,
            n_mc: 1000,
            evaluator,
        }
    }

    fn best_fit() -> BestFit {
        let mut bf = HashMap::new();
        bf.insert("tl208".to_string(), Interval::point(2.0));
        bf
    }

    fn temp_out(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "fit_spectra_pipeline_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ))
    }

    #[test]
    fn end_to_end_single_signal_scenario() {
        let out = temp_out("e2e");
        std::fs::remove_dir_all(&out).ok();

        let sources = vec![Source {
            name: "tl208".to_string(),
            index: 0,
        }];
        let mut signals = vec![signal(
            "tl208",
            0,
            StubEvaluator::new(model_hist_1d(), 500),
        )];
        let observables = vec![energy_observable()];
        let datasets: BTreeSet<DatasetId> = [0u32].into_iter().collect();
        // Two observed events in dataset 0.
        let data = [1.0, 0.0, 5.0, 0.0];

        let output = plot_fit(
            &best_fit(),
            1.0,
            &sources,
            &mut signals,
            &[],
            &observables,
            &datasets,
            &data,
            &Palette::standard(),
            &out,
        )
        .unwrap();

        // Five sibling exports for the single (dataset, observable) pair.
        assert_eq!(output.overlay_paths.len(), 5);
        for path in &output.overlay_paths {
            assert!(path.exists(), "missing {}", path.display());
        }

        // nexpected * (accepted/n_mc) * point_estimate = 100 * 0.5 * 2.0.
        let totals = crate::io::read_totals(&output.totals_path).unwrap();
        let total = totals.get("htotal_0").unwrap();
        assert!((total.integral() - 100.0).abs() < 1e-9);

        // Overlay holds signal + fit + data curves, in add order.
        let archive_path = out.join("energy_0.json");
        let archive = read_overlay_archive(&archive_path).unwrap();
        assert_eq!(archive.curves.len(), 3);
        assert_eq!(archive.curves[0].legend, "TL208");
        assert_eq!(archive.curves[1].legend, "Fit");
        assert_eq!(archive.curves[2].legend, "Data");
        assert!((archive.curves[1].hist.integral() - 100.0).abs() < 1e-9);
        assert!((archive.curves[2].hist.integral() - 2.0).abs() < 1e-12);

        std::fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn dimensionality_mismatch_is_fatal_before_any_file_is_written() {
        let out = temp_out("dim");
        std::fs::remove_dir_all(&out).ok();

        let sources = vec![Source {
            name: "tl208".to_string(),
            index: 0,
        }];
        let bad = Histogram::Dim2(Hist2D::new(
            "model",
            BinAxis::new(0.0, 10.0, 10),
            BinAxis::new(0.0, 10.0, 10),
        ));
        let mut signals = vec![signal("tl208", 0, StubEvaluator::new(bad, 500))];
        let observables = vec![energy_observable()];
        let datasets: BTreeSet<DatasetId> = [0u32].into_iter().collect();

        let err = plot_fit(
            &best_fit(),
            1.0,
            &sources,
            &mut signals,
            &[],
            &observables,
            &datasets,
            &[],
            &Palette::standard(),
            &out,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::Dimensionality(_)));
        assert!(err.to_string().contains("tl208"));

        // The output directory exists but holds nothing.
        let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert!(written.is_empty());

        std::fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn signal_with_unknown_dataset_aborts_before_evaluation() {
        let out = temp_out("unknown_ds");
        let sources = vec![Source {
            name: "tl208".to_string(),
            index: 0,
        }];
        let mut signals = vec![signal("tl208", 5, StubEvaluator::new(model_hist_1d(), 500))];
        let observables = vec![energy_observable()];
        let datasets: BTreeSet<DatasetId> = [0u32].into_iter().collect();

        let err = plot_fit(
            &best_fit(),
            1.0,
            &sources,
            &mut signals,
            &[],
            &observables,
            &datasets,
            &[],
            &Palette::standard(),
            &out,
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::Configuration(_)));
        std::fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn palette_ordinal_is_per_dataset() {
        let out = temp_out("palette");
        std::fs::remove_dir_all(&out).ok();

        let sources = vec![Source {
            name: "tl208".to_string(),
            index: 0,
        }];
        // One signal in each of two datasets; both should wear palette slot 0.
        let mut signals = vec![
            signal("tl208_a", 0, StubEvaluator::new(model_hist_1d(), 500)),
            signal("tl208_b", 1, StubEvaluator::new(model_hist_1d(), 500)),
        ];
        let mut bf = best_fit();
        bf.insert("tl208_a".to_string(), Interval::point(1.0));
        let observables = vec![energy_observable()];
        let datasets: BTreeSet<DatasetId> = [0u32, 1u32].into_iter().collect();

        plot_fit(
            &bf,
            1.0,
            &sources,
            &mut signals,
            &[],
            &observables,
            &datasets,
            &[],
            &Palette::standard(),
            &out,
        )
        .unwrap();

        let slot0 = Palette::standard().entry(0);
        for ds in 0..2u32 {
            let archive = read_overlay_archive(&out.join(format!("energy_{ds}.json"))).unwrap();
            assert_eq!(archive.curves[0].style.color, slot0.color);
            assert_eq!(archive.curves[0].style.line, slot0.style);
        }

        std::fs::remove_dir_all(&out).ok();
    }

    #[test]
    fn empty_dataset_still_gets_a_data_only_overlay() {
        let out = temp_out("empty_ds");
        std::fs::remove_dir_all(&out).ok();

        let observables = vec![energy_observable()];
        let datasets: BTreeSet<DatasetId> = [0u32].into_iter().collect();
        let data = [3.0, 0.0];

        let output = plot_fit(
            &BestFit::new(),
            1.0,
            &[],
            &mut [],
            &[],
            &observables,
            &datasets,
            &data,
            &Palette::standard(),
            &out,
        )
        .unwrap();
        assert_eq!(output.overlay_paths.len(), 5);

        let archive = read_overlay_archive(&out.join("energy_0.json")).unwrap();
        assert_eq!(archive.curves.len(), 1);
        assert_eq!(archive.curves[0].legend, "Data");
        assert!((archive.curves[0].hist.integral() - 1.0).abs() < 1e-12);

        // No signal contributed, so no totals are persisted.
        let totals = crate::io::read_totals(&output.totals_path).unwrap();
        assert!(totals.is_empty());

        std::fs::remove_dir_all(&out).ok();
    }
}
