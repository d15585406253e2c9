//! Species detections and contiguous-interval merging.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One time-windowed species classification from the service.
///
/// `predictions` maps every candidate species label to its probability for
/// this window; `species` names the winning label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub start: f64,
    pub end: f64,
    pub species: String,
    pub predictions: BTreeMap<String, f64>,
}

impl Detection {
    /// Probability the detection assigns to its own winning species.
    pub fn own_probability(&self) -> f64 {
        self.predictions.get(&self.species).copied().unwrap_or(0.0)
    }
}

/// One or more contiguous same-species detections merged into a span.
///
/// `predictions` keeps the per-label maximum across the merged detections;
/// `mean_presence` is the arithmetic mean of the winning species' own
/// probability over them. Invariant: `start < end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
    pub species: String,
    pub predictions: BTreeMap<String, f64>,
    pub mean_presence: f64,
}

/// Merge an ordered detection sequence into contiguous same-species
/// intervals.
///
/// A detection extends the open interval only when the species matches and
/// its start equals the interval's end exactly; any gap or species change
/// closes the interval. Single pass, order preserving, deterministic.
pub fn combine_contiguous(detections: &[Detection]) -> Vec<Interval> {
    let mut combined = Vec::new();
    let mut current: Option<Interval> = None;
    let mut presence_sum = 0.0;
    let mut segment_count = 0usize;

    for detection in detections {
        match current.as_mut() {
            Some(interval)
                if interval.species == detection.species && interval.end == detection.start =>
            {
                interval.end = detection.end;

                // Keep the peak probability seen for each label.
                for (label, &probability) in &detection.predictions {
                    let entry = interval.predictions.entry(label.clone()).or_insert(0.0);
                    if probability > *entry {
                        *entry = probability;
                    }
                }

                presence_sum += detection.own_probability();
                segment_count += 1;
            }
            _ => {
                if let Some(mut interval) = current.take() {
                    interval.mean_presence = presence_sum / segment_count as f64;
                    combined.push(interval);
                }

                presence_sum = detection.own_probability();
                segment_count = 1;
                current = Some(Interval {
                    start: detection.start,
                    end: detection.end,
                    species: detection.species.clone(),
                    predictions: detection.predictions.clone(),
                    mean_presence: detection.own_probability(),
                });
            }
        }
    }

    if let Some(mut interval) = current.take() {
        interval.mean_presence = presence_sum / segment_count as f64;
        combined.push(interval);
    }

    combined
}
