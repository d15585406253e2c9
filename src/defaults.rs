//! Default configuration constants for mozzie.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Sample rate the classification service expects, in Hz.
///
/// All decoded audio is downmixed and resampled to this rate before it is
/// batched and sent. The models on the service side were trained on 8 kHz
/// mono recordings.
pub const TARGET_SAMPLE_RATE: u32 = 8000;

/// Number of samples per classification frame.
///
/// The service consumes the signal in windows of exactly this many samples;
/// shorter frames are mean-padded up to this length before sending.
pub const FRAME_LEN: usize = 15360;

/// Duration of one classification frame in seconds.
///
/// Fixed by the service contract (one prediction per frame); result series
/// use this to map frame indices to wall-clock time.
pub const FRAME_SECS: f64 = 1.92;

/// Default classification service URL.
pub const DEFAULT_SERVICE_URL: &str = "ws://localhost:8000";

/// Default connection timeout in seconds for classification sessions.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Delay between reconnection attempts for the admin status feed, in
/// milliseconds.
///
/// The status feed reconnects unconditionally after this delay. Snapshots
/// are full state, not deltas, so a missed message costs nothing.
pub const RECONNECT_DELAY_MS: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_duration_matches_rate_and_length() {
        // 15360 samples at 8 kHz is exactly 1.92 s.
        let secs = FRAME_LEN as f64 / TARGET_SAMPLE_RATE as f64;
        assert!((secs - FRAME_SECS).abs() < f64::EPSILON);
    }
}
