//! mozzie - mosquito audio classification client
//!
//! Decodes a recording, normalizes it to the signal the classification
//! service expects, streams it over a WebSocket, and turns the results into
//! chart-ready series.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod classify;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod render;
pub mod session;

// Preprocessing pipeline
pub use audio::batch::{flatten_frames, frame_signal};
pub use audio::decode::DecodedAudio;
pub use audio::signal::{downmix, normalize, resample_linear};

// Results
pub use classify::adapter::{PredictionSeries, SeriesPoint, species_summary};
pub use classify::detection::{Detection, Interval, combine_contiguous};
pub use render::{AnnotationSpan, ChartSpec, RenderContext};

// Sessions
pub use session::classify::{Classifier, ClassifySession, SessionEvent, SessionState};
pub use session::protocol::{ClassifyResult, Mode, StatusSnapshot};
pub use session::reconnect::ReconnectPolicy;
pub use session::status::{StatusFeed, StatusHandler};

// Error handling
pub use error::{MozzieError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
