//! Terminal rendering of classification results and the admin status feed.
//!
//! Status lines go to stderr so `--json` output on stdout stays clean for
//! piping.

use owo_colors::OwoColorize;
use std::collections::BTreeMap;

use crate::classify::detection::Interval;
use crate::render::ChartSpec;
use crate::session::protocol::StatusSnapshot;

/// Width of the probability bar in chart rows.
const BAR_WIDTH: usize = 40;

/// Informational status line.
pub fn banner(message: &str) {
    eprintln!("{} {}", "::".cyan(), message);
}

/// Error status line.
pub fn error_banner(message: &str) {
    eprintln!("{} {}", "!!".red().bold(), message);
}

/// Transient progress line from the service.
pub fn progress(message: &str, percent: Option<&str>) {
    match percent {
        Some(percent) => eprintln!("{} [{}] {}", "..".dimmed(), percent, message),
        None => eprintln!("{} {}", "..".dimmed(), message),
    }
}

/// Render a probability value as a fixed-width bar.
fn probability_bar(probability: f64) -> String {
    let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let mut bar = String::with_capacity(BAR_WIDTH);
    for _ in 0..filled {
        bar.push('█');
    }
    for _ in filled..BAR_WIDTH {
        bar.push('·');
    }
    bar
}

/// Print the presence-over-time chart.
pub fn render_presence_chart(spec: &ChartSpec) {
    let Some(series) = spec.series.first() else {
        return;
    };

    println!();
    println!("{}", series.label.bold());
    println!("{:>9}  {:>6}", "time (s)", "prob");
    // Skip the synthetic origin point; it carries no information here.
    for point in series.points.iter().skip(1) {
        println!(
            "{:>9.2}  {:>6.3}  {}",
            point.time,
            point.probability,
            probability_bar(point.probability)
        );
    }
}

/// Print per-species series and the merged detection spans.
pub fn render_species_chart(spec: &ChartSpec, intervals: &[Interval]) {
    if !spec.series.is_empty() {
        println!();
        println!("{}", "Species probability over time".bold());
        for series in &spec.series {
            println!("  {}", series.label.italic());
            for point in series.points.iter().skip(1) {
                println!(
                    "{:>9.2}  {:>6.3}  {}",
                    point.time,
                    point.probability,
                    probability_bar(point.probability)
                );
            }
        }
    }

    if intervals.is_empty() {
        return;
    }

    println!();
    println!("{}", "Detected species".bold());
    println!(
        "{:>9}  {:>9}  {:>13}  species",
        "start (s)", "end (s)", "mean presence"
    );
    for interval in intervals {
        println!(
            "{:>9.2}  {:>9.2}  {:>12.1}%  {}",
            interval.start,
            interval.end,
            interval.mean_presence * 100.0,
            interval.species.green()
        );
    }
}

/// Print the per-species mean probability table.
pub fn render_summary(summary: &BTreeMap<String, f64>) {
    if summary.is_empty() {
        return;
    }

    println!();
    println!("{}", "Overall species probabilities".bold());
    for (species, probability) in summary {
        println!("  {:<30} {:>6.2}%", species.bold(), probability * 100.0);
    }
}

/// Re-render the admin status view for one snapshot.
pub fn render_status(snapshot: &StatusSnapshot) {
    println!();
    match &snapshot.current_recording {
        Some(recording) => {
            println!(
                "{} recording {}: {} ({}%)",
                "processing".green().bold(),
                recording.recording_id,
                recording.status,
                recording.progress
            );
        }
        None => {
            println!("{}", "No recording is currently being processed".dimmed());
        }
    }

    if snapshot.queue.is_empty() {
        println!("{}", "Queue is empty".dimmed());
        return;
    }

    println!("{:>12}  type", "recording");
    for entry in &snapshot.queue {
        println!("{:>12}  {}", entry.recording_id, entry.job_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_empty_at_zero() {
        let bar = probability_bar(0.0);
        assert_eq!(bar.chars().count(), BAR_WIDTH);
        assert!(bar.chars().all(|c| c == '·'));
    }

    #[test]
    fn bar_is_full_at_one() {
        let bar = probability_bar(1.0);
        assert_eq!(bar.chars().count(), BAR_WIDTH);
        assert!(bar.chars().all(|c| c == '█'));
    }

    #[test]
    fn bar_is_half_filled_at_half() {
        let bar = probability_bar(0.5);
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn bar_clamps_out_of_range_values() {
        assert!(probability_bar(1.5).chars().all(|c| c == '█'));
        assert!(probability_bar(-0.5).chars().all(|c| c == '·'));
    }
}
