//! Fixed-length framing of a normalized signal.
//!
//! The service scores the signal in windows of exactly `FRAME_LEN` samples.
//! Short frames are padded on both sides with the frame's own mean so the
//! padding is spectrally quiet relative to the content.

use crate::defaults::FRAME_LEN;
use crate::error::{MozzieError, Result};

/// Split a signal into consecutive frames of exactly `FRAME_LEN` samples.
///
/// A signal shorter than one frame is center-padded with its mean; a short
/// final chunk is padded with that chunk's own mean. Samples are never
/// dropped or reordered.
pub fn frame_signal(signal: &[f32]) -> Result<Vec<Vec<f32>>> {
    if signal.is_empty() {
        return Err(MozzieError::invalid_input(
            "cannot batch an empty signal (padding mean is undefined)",
        ));
    }

    let mut frames = Vec::with_capacity(signal.len().div_ceil(FRAME_LEN));
    for chunk in signal.chunks(FRAME_LEN) {
        if chunk.len() < FRAME_LEN {
            frames.push(pad_mean(chunk, FRAME_LEN));
        } else {
            frames.push(chunk.to_vec());
        }
    }
    Ok(frames)
}

/// Center-pad a chunk to `len` samples using the chunk's mean value.
///
/// Left pad gets `floor((len - chunk) / 2)` samples, the right pad the
/// remainder.
fn pad_mean(chunk: &[f32], len: usize) -> Vec<f32> {
    debug_assert!(!chunk.is_empty() && chunk.len() < len);

    let mean = chunk.iter().sum::<f32>() / chunk.len() as f32;
    let left = (len - chunk.len()) / 2;
    let right = len - chunk.len() - left;

    let mut padded = Vec::with_capacity(len);
    padded.extend(std::iter::repeat_n(mean, left));
    padded.extend_from_slice(chunk);
    padded.extend(std::iter::repeat_n(mean, right));
    padded
}

/// Concatenate frames back into the flat sample array sent to the service.
pub fn flatten_frames(frames: &[Vec<f32>]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(frames.iter().map(Vec::len).sum());
    for frame in frames {
        flat.extend_from_slice(frame);
    }
    flat
}
