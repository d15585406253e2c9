//! Chart specifications and the render context that owns them.
//!
//! The crate does not draw charts; it hands `ChartSpec` values to whatever
//! consumes them (the bundled terminal renderer, or a charting frontend via
//! `--json`). `RenderContext` replaces ambient chart singletons with state
//! the caller owns: installing a new spec explicitly disposes the previous
//! one first.

use serde::Serialize;

use crate::classify::adapter::{self, PredictionSeries};
use crate::classify::detection::{self, Detection, Interval};

/// A highlighted `[start, end]` span labeling a merged detection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSpan {
    pub start: f64,
    pub end: f64,
    pub label: String,
}

/// Everything a chart consumer needs for one plot: the series, the
/// highlighted spans, and the probability-axis ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub series: Vec<PredictionSeries>,
    pub annotations: Vec<AnnotationSpan>,
    pub y_max: f64,
}

/// Build the presence chart for an event-only result.
pub fn event_chart(predictions: &[[f64; 2]]) -> ChartSpec {
    ChartSpec {
        series: vec![adapter::presence_series(predictions)],
        annotations: Vec::new(),
        y_max: 1.0,
    }
}

/// Build the species chart: one series per label, one annotation per merged
/// same-species interval.
///
/// Returns the combined intervals alongside the spec so callers can reuse
/// them for textual output without merging twice.
pub fn species_chart(detections: &[Detection]) -> (ChartSpec, Vec<Interval>) {
    let intervals = detection::combine_contiguous(detections);
    let annotations = intervals
        .iter()
        .map(|interval| AnnotationSpan {
            start: interval.start,
            end: interval.end,
            label: interval.species.clone(),
        })
        .collect();

    let spec = ChartSpec {
        series: adapter::species_series(detections),
        annotations,
        // Headroom above 1.0 keeps annotation labels clear of the topmost points.
        y_max: 1.1,
    };
    (spec, intervals)
}

/// Caller-owned chart state for one classification view.
///
/// Each render call replaces, never merges: `install_*` drops whatever spec
/// was previously displayed and returns it so the caller can log or verify
/// the disposal.
#[derive(Debug, Default)]
pub struct RenderContext {
    events: Option<ChartSpec>,
    species: Option<ChartSpec>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the presence chart, disposing the previous one.
    pub fn install_events(&mut self, spec: ChartSpec) -> Option<ChartSpec> {
        self.events.replace(spec)
    }

    /// Install the species chart, disposing the previous one.
    pub fn install_species(&mut self, spec: ChartSpec) -> Option<ChartSpec> {
        self.species.replace(spec)
    }

    /// Drop both charts (e.g. when a new file is selected).
    pub fn clear(&mut self) {
        self.events = None;
        self.species = None;
    }

    pub fn events(&self) -> Option<&ChartSpec> {
        self.events.as_ref()
    }

    pub fn species(&self) -> Option<&ChartSpec> {
        self.species.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn detection(start: f64, end: f64, species: &str, probability: f64) -> Detection {
        let mut predictions = BTreeMap::new();
        predictions.insert(species.to_string(), probability);
        Detection {
            start,
            end,
            species: species.to_string(),
            predictions,
        }
    }

    #[test]
    fn event_chart_has_single_series_no_annotations() {
        let spec = event_chart(&[[0.9, 0.1], [0.3, 0.7]]);

        assert_eq!(spec.series.len(), 1);
        assert!(spec.annotations.is_empty());
        assert_eq!(spec.y_max, 1.0);
        assert_eq!(spec.series[0].points.len(), 3);
    }

    #[test]
    fn species_chart_annotates_merged_intervals() {
        let detections = [
            detection(0.0, 1.0, "A", 0.8),
            detection(1.0, 2.0, "A", 0.6),
            detection(2.0, 3.0, "B", 0.9),
        ];
        let (spec, intervals) = species_chart(&detections);

        assert_eq!(intervals.len(), 2);
        assert_eq!(spec.annotations.len(), 2);
        assert_eq!(spec.annotations[0].start, 0.0);
        assert_eq!(spec.annotations[0].end, 2.0);
        assert_eq!(spec.annotations[0].label, "A");
        assert_eq!(spec.annotations[1].label, "B");
        assert_eq!(spec.y_max, 1.1);
    }

    #[test]
    fn install_returns_the_disposed_spec() {
        let mut context = RenderContext::new();

        assert!(context.install_events(event_chart(&[[0.5, 0.5]])).is_none());

        let replacement = event_chart(&[[0.1, 0.9], [0.2, 0.8]]);
        let disposed = context.install_events(replacement).unwrap();
        assert_eq!(disposed.series[0].points.len(), 2);

        // The context now holds the replacement.
        assert_eq!(context.events().unwrap().series[0].points.len(), 3);
    }

    #[test]
    fn clear_drops_both_charts() {
        let mut context = RenderContext::new();
        context.install_events(event_chart(&[[0.5, 0.5]]));
        let (spec, _) = species_chart(&[detection(0.0, 1.0, "A", 0.8)]);
        context.install_species(spec);

        context.clear();
        assert!(context.events().is_none());
        assert!(context.species().is_none());
    }
}
