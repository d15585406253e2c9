//! Audio ingestion: decode a WAV file, normalize it to the mono 8 kHz
//! signal the classification service expects, and batch it into
//! fixed-length frames.
//!
//! ```text
//! ┌────────┐    ┌──────────────────┐    ┌─────────────┐
//! │ decode │───▶│ downmix/resample │───▶│ frame/pad   │───▶ session
//! └────────┘    └──────────────────┘    └─────────────┘
//! ```

pub mod batch;
pub mod decode;
pub mod signal;
