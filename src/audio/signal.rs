//! Channel downmix and linear-interpolation resampling.
//!
//! The classification service consumes mono 8 kHz signal; `normalize` takes
//! decoded audio of any channel count and rate there in two steps, each pure
//! and deterministic.

use crate::audio::decode::DecodedAudio;
use crate::defaults::TARGET_SAMPLE_RATE;
use crate::error::{MozzieError, Result};

/// Mix an arbitrary number of channels down to mono by equal-weight
/// averaging.
///
/// A single channel is moved out without copying.
pub fn downmix(channels: Vec<Vec<f32>>) -> Result<Vec<f32>> {
    let mut iter = channels.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| MozzieError::invalid_input("audio contains no channels"))?;

    let rest: Vec<Vec<f32>> = iter.collect();
    if rest.is_empty() {
        return Ok(first);
    }

    let count = (rest.len() + 1) as f32;
    let mut mono = first;
    for channel in &rest {
        for (acc, &sample) in mono.iter_mut().zip(channel) {
            *acc += sample;
        }
    }
    for sample in &mut mono {
        *sample /= count;
    }
    Ok(mono)
}

/// Resample by linear interpolation.
///
/// For each target index the fractional source position is interpolated from
/// its floor/ceil neighbors; positions past either end read as zero. Output
/// length is `round(len * target / source)`. Resampling to the source rate
/// degenerates to weight-zero interpolation and returns the input unchanged
/// up to floating rounding.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    let factor = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * factor).round() as usize;

    let sample_at = |index: usize| -> f64 {
        samples.get(index).copied().unwrap_or(0.0) as f64
    };

    (0..output_len)
        .map(|i| {
            let source_index = i as f64 / factor;
            let lower = source_index.floor() as usize;
            let upper = source_index.ceil() as usize;
            let weight = source_index - lower as f64;
            (sample_at(lower) * (1.0 - weight) + sample_at(upper) * weight) as f32
        })
        .collect()
}

/// Normalize decoded audio into the mono signal at the service rate.
pub fn normalize(audio: DecodedAudio) -> Result<Vec<f32>> {
    let source_rate = audio.sample_rate();
    let mono = downmix(audio.into_channels())?;
    Ok(resample_linear(&mono, source_rate, TARGET_SAMPLE_RATE))
}
