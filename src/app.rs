//! Application entry points wiring the full classification flow:
//! decode → normalize → batch → session → adapt → render.

use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::audio::batch;
use crate::audio::decode::DecodedAudio;
use crate::audio::signal;
use crate::classify::adapter;
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::render::{self, RenderContext};
use crate::session::classify::{Classifier, SessionEvent};
use crate::session::protocol::{ClassifyResult, Mode};
use crate::session::reconnect::ReconnectPolicy;
use crate::session::status::{StatusFeed, StatusHandler};

/// Chart data printed by `classify --json`, consumed by external charting
/// frontends.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    events: Option<&'a render::ChartSpec>,
    species: Option<&'a render::ChartSpec>,
    summary: Option<&'a std::collections::BTreeMap<String, f64>>,
}

/// Run the classify command: read a WAV file, stream it to the service,
/// render the result.
#[allow(clippy::too_many_arguments)]
pub async fn run_classify_command(
    config: Config,
    file: &Path,
    mode: Mode,
    service: Option<String>,
    timeout: Option<u64>,
    json: bool,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    let mut config = config;
    if let Some(url) = service {
        config.service.url = url;
    }
    if let Some(secs) = timeout {
        config.service.connect_timeout_secs = secs;
    }

    if !quiet {
        output::banner(&format!("Processing {}", file.display()));
    }

    let audio = DecodedAudio::from_path(file)?;
    if verbose > 0 {
        output::banner(&format!(
            "Decoded {} channel(s) at {} Hz, {} samples",
            audio.channel_count(),
            audio.sample_rate(),
            audio.len()
        ));
    }

    let normalized = signal::normalize(audio)?;
    let frames = batch::frame_signal(&normalized)?;
    let flat = batch::flatten_frames(&frames);
    if verbose > 0 {
        output::banner(&format!(
            "Normalized to {} samples, {} frame(s)",
            normalized.len(),
            frames.len()
        ));
    }

    if !quiet {
        output::banner(&format!("Sending to {} endpoint...", mode));
    }

    let classifier = Classifier::new(&config);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                SessionEvent::State(state) => {
                    if verbose > 0 {
                        output::banner(&format!("Session {}", state));
                    }
                }
                SessionEvent::Progress { message, percent } => {
                    if !quiet {
                        output::progress(&message, percent.as_deref());
                    }
                }
                SessionEvent::Malformed { raw, error } => {
                    output::error_banner(&error);
                    output::error_banner(&format!("Raw message: {}", raw));
                }
            }
        }
    });

    let result = classifier.classify(mode, &flat, Some(events_tx)).await;
    // The sender is gone once classify returns; drain the printer first so
    // event lines land before the result.
    let _ = printer.await;
    let result = result?;

    render_result(&result, json, quiet)
}

/// Adapt a terminal result into chart specs and print them.
fn render_result(result: &ClassifyResult, json: bool, quiet: bool) -> Result<()> {
    let mut context = RenderContext::new();
    let mut intervals = Vec::new();
    let mut summary = None;

    context.install_events(render::event_chart(result.event_predictions()));
    if let Some(detections) = result.detections() {
        let (spec, merged) = render::species_chart(detections);
        context.install_species(spec);
        intervals = merged;
        summary = Some(adapter::species_summary(detections)?);
    }

    if json {
        let report = JsonReport {
            events: context.events(),
            species: context.species(),
            summary: summary.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report).map_err(|e| {
            crate::error::MozzieError::Other(format!("Failed to serialize report: {}", e))
        })?);
        return Ok(());
    }

    if !quiet {
        output::banner("Processing complete.");
    }

    if let Some(spec) = context.events() {
        output::render_presence_chart(spec);
    }
    if let Some(spec) = context.species() {
        output::render_species_chart(spec, &intervals);
    }
    if let Some(summary) = &summary {
        output::render_summary(summary);
    }

    Ok(())
}

/// Terminal-rendering status handler for the watch command.
struct TerminalStatus {
    quiet: bool,
}

#[async_trait::async_trait]
impl StatusHandler for TerminalStatus {
    async fn on_snapshot(&mut self, snapshot: crate::session::protocol::StatusSnapshot) {
        output::render_status(&snapshot);
    }

    async fn on_malformed(&mut self, raw: &str, error: &crate::error::MozzieError) {
        output::error_banner(&error.to_string());
        output::error_banner(&format!("Raw message: {}", raw));
    }

    async fn on_disconnect(&mut self, error: Option<&crate::error::MozzieError>) {
        if self.quiet {
            return;
        }
        match error {
            Some(error) => output::error_banner(&format!("{}; reconnecting", error)),
            None => output::banner("Status feed closed; reconnecting"),
        }
    }
}

/// Run the watch command: follow the admin status feed indefinitely.
pub async fn run_watch_command(
    config: Config,
    service: Option<String>,
    quiet: bool,
) -> Result<()> {
    let url = service.unwrap_or_else(|| config.status_url());
    if !quiet {
        output::banner(&format!("Following status feed at {}", url));
    }

    let policy = ReconnectPolicy::fixed(Duration::from_millis(config.status.reconnect_delay_ms));
    let feed = StatusFeed::new(url, policy);
    let mut handler = TerminalStatus { quiet };
    feed.run(&mut handler).await
}
