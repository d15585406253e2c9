//! WAV decoding into per-channel float samples.

use crate::error::{MozzieError, Result};
use std::io::Read;
use std::path::Path;

/// Decoded PCM audio: one buffer per channel, all the same length, plus the
/// source sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Build from already-deinterleaved channel buffers.
    ///
    /// All channels must be non-empty and of equal length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() || channels[0].is_empty() {
            return Err(MozzieError::invalid_input("audio contains no samples"));
        }
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(MozzieError::invalid_input(
                "audio channels have mismatched lengths",
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Decode a WAV stream from any reader.
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| MozzieError::Decode {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();
        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(MozzieError::Decode {
                message: "WAV file reports zero channels".to_string(),
            });
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MozzieError::Decode {
                    message: format!("Failed to read WAV samples: {}", e),
                })?,
            hound::SampleFormat::Int => {
                // Scale integer PCM to [-1, 1] by the format's full range.
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| MozzieError::Decode {
                        message: format!("Failed to read WAV samples: {}", e),
                    })?
            }
        };

        if interleaved.is_empty() {
            return Err(MozzieError::invalid_input("audio contains no samples"));
        }

        // Deinterleave; a trailing partial frame is dropped.
        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(channels, spec.sample_rate)
    }

    /// Decode a WAV file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)))
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// True when the audio holds no samples. `new` rejects empty input, so
    /// this only exists to satisfy the usual len/is_empty pairing.
    pub fn is_empty(&self) -> bool {
        self.channels[0].is_empty()
    }

    /// Source sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Borrow the channel buffers.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Consume the audio, yielding the channel buffers.
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}
