//! Yield scaling: raw model-evaluation output to absolute expected spectra.
//!
//! For signal `i`:
//!
//! ```text
//! efficiency = accepted_i / n_mc_i
//! expected   = nexpected_i * efficiency * params[source_i]
//! ```
//!
//! and the model histogram is rescaled so its integral equals `expected`
//! exactly. Efficiency is expected in `[0, 1]` but deliberately not clamped;
//! an evaluation that accepts more events than were generated is a modelling
//! problem the plots should make visible, not hide.

use nalgebra::DVector;

use crate::domain::Signal;
use crate::error::PlotError;
use crate::hist::Histogram;

/// Absolute expected event count for a signal given the accepted-event count
/// reported by its evaluator.
pub fn expected_events(
    signal: &Signal,
    accepted: u64,
    params: &DVector<f64>,
) -> Result<f64, PlotError> {
    if signal.n_mc == 0 {
        return Err(PlotError::config(format!(
            "signal '{}' has zero generated MC events",
            signal.name
        )));
    }
    if signal.source.index >= params.len() {
        return Err(PlotError::config(format!(
            "signal '{}' references source index {} but the parameter vector has {} entries",
            signal.name,
            signal.source.index,
            params.len()
        )));
    }
    let efficiency = accepted as f64 / signal.n_mc as f64;
    Ok(signal.nexpected * efficiency * params[signal.source.index])
}

/// Rescale a model histogram so its integral equals `expected` exactly.
///
/// The caller owns the result. A non-positive model integral makes the
/// rescale undefined and is fatal.
pub fn scale_to_expected(
    mut hist: Histogram,
    expected: f64,
    signal_name: &str,
) -> Result<Histogram, PlotError> {
    let integral = hist.integral();
    if !(integral > 0.0) {
        return Err(PlotError::degenerate(format!(
            "model histogram for signal '{signal_name}' has integral {integral}; \
             cannot rescale to an absolute yield"
        )));
    }
    hist.scale(expected / integral);
    Ok(hist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Source;
    use crate::hist::{BinAxis, Hist1D};
    use crate::models::ModelEvaluator;

    struct NeverEvaluator;

    impl ModelEvaluator for NeverEvaluator {
        fn submit(&mut self, _: &DVector<f64>, _: usize) -> Result<(), PlotError> {
            Ok(())
        }
        fn await_completion(&mut self) -> Result<(), PlotError> {
            Ok(())
        }
        fn accepted_events(&self) -> u64 {
            0
        }
        fn create_histogram(&self) -> Result<Histogram, PlotError> {
            Err(PlotError::evaluation("not used"))
        }
    }

    fn signal(nexpected: f64, n_mc: u64) -> Signal {
        Signal {
            name: "tl208".to_string(),
            title: "Tl-208".to_string(),
            source: Source {
                name: "tl208".to_string(),
                index: 0,
            },
            dataset: 0,
            nexpected,
            n_mc,
            evaluator: Box::new(NeverEvaluator),
        }
    }

    #[test]
    fn expected_count_combines_efficiency_and_fit_scale() {
        let s = signal(100.0, 1000);
        let params = DVector::from_row_slice(&[2.0]);
        let expected = expected_events(&s, 500, &params).unwrap();
        assert!((expected - 100.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mc_count_is_a_configuration_error() {
        let s = signal(100.0, 0);
        let params = DVector::from_row_slice(&[2.0]);
        assert!(matches!(
            expected_events(&s, 500, &params),
            Err(PlotError::Configuration(_))
        ));
    }

    #[test]
    fn scale_to_expected_sets_integral_exactly() {
        let mut h = Hist1D::new("h", BinAxis::new(0.0, 10.0, 10));
        h.fill(1.0);
        h.fill(2.0);
        h.fill(3.0);
        let scaled = scale_to_expected(Histogram::Dim1(h), 100.0, "tl208").unwrap();
        assert!((scaled.integral() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_integral_rescale_is_fatal() {
        let h = Hist1D::new("h", BinAxis::new(0.0, 10.0, 10));
        let err = scale_to_expected(Histogram::Dim1(h), 100.0, "tl208").unwrap_err();
        assert!(matches!(err, PlotError::DegenerateNormalization(_)));
        assert!(err.to_string().contains("tl208"));
    }
}
