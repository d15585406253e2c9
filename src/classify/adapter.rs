//! Adapts raw service results into chart-ready series.
//!
//! Presence probabilities arrive per frame and are mapped onto wall-clock
//! time; species detections additionally yield one series per label and a
//! tabular per-label mean.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::classify::detection::Detection;
use crate::defaults::FRAME_SECS;
use crate::error::{MozzieError, Result};

/// One `(time, probability)` chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: f64,
    pub probability: f64,
}

/// An ordered, labeled probability-over-time series.
///
/// Every series starts with a synthetic `(0, 0)` origin point so charts
/// anchor at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSeries {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl PredictionSeries {
    fn with_origin(label: String, rest: impl IntoIterator<Item = SeriesPoint>) -> Self {
        let mut points = vec![SeriesPoint {
            time: 0.0,
            probability: 0.0,
        }];
        points.extend(rest);
        Self { label, points }
    }
}

/// Build the presence series from the per-frame `[absent, present]` pairs.
///
/// Only the presence component (index 1) is charted; frame `i` is plotted at
/// `(i + 1) * 1.92` seconds.
pub fn presence_series(predictions: &[[f64; 2]]) -> PredictionSeries {
    PredictionSeries::with_origin(
        "Probability of mosquito presence".to_string(),
        predictions.iter().enumerate().map(|(index, pair)| SeriesPoint {
            time: (index + 1) as f64 * FRAME_SECS,
            probability: pair[1],
        }),
    )
}

/// Build one series per species label seen anywhere in the detections.
///
/// Each detection contributes the point `(end, predictions[label])`; a
/// detection lacking the label contributes nothing to that series. Labels
/// are emitted in sorted order.
pub fn species_series(detections: &[Detection]) -> Vec<PredictionSeries> {
    let labels: BTreeSet<&str> = detections
        .iter()
        .flat_map(|d| d.predictions.keys().map(String::as_str))
        .collect();

    labels
        .into_iter()
        .map(|label| {
            PredictionSeries::with_origin(
                label.to_string(),
                detections.iter().filter_map(|detection| {
                    detection.predictions.get(label).map(|&probability| SeriesPoint {
                        time: detection.end,
                        probability,
                    })
                }),
            )
        })
        .collect()
}

/// Per-label mean probability across all raw detections.
///
/// All detections must carry the same label set; summing mismatched sets
/// into one accumulator would silently corrupt the averages, so a mismatch
/// is a protocol failure.
pub fn species_summary(detections: &[Detection]) -> Result<BTreeMap<String, f64>> {
    let Some(first) = detections.first() else {
        return Ok(BTreeMap::new());
    };

    let expected: BTreeSet<&String> = first.predictions.keys().collect();
    let mut sums: BTreeMap<String, f64> =
        first.predictions.keys().map(|k| (k.clone(), 0.0)).collect();

    for detection in detections {
        let labels: BTreeSet<&String> = detection.predictions.keys().collect();
        if labels != expected {
            return Err(MozzieError::protocol(format!(
                "detections disagree on the label set (expected {:?}, got {:?} for the window starting at {})",
                expected, labels, detection.start
            )));
        }
        for (label, probability) in &detection.predictions {
            // Every label is present: validated just above.
            if let Some(sum) = sums.get_mut(label) {
                *sum += probability;
            }
        }
    }

    let count = detections.len() as f64;
    for sum in sums.values_mut() {
        *sum /= count;
    }
    Ok(sums)
}
