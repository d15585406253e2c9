//! Command-line interface for mozzie
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::session::protocol::Mode;

/// Mosquito audio classification client
#[derive(Parser, Debug)]
#[command(
    name = "mozzie",
    version,
    about = "Command-line client for a mosquito bioacoustic classification service"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: session events, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a WAV recording against the service
    Classify {
        /// WAV file to classify
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Request type: med (presence events) or msc (events + species)
        #[arg(long, short = 'm', value_name = "MODE", default_value = "med", value_parser = parse_mode)]
        mode: Mode,

        /// Classification service URL override (e.g. wss://classify.example.org)
        #[arg(long, value_name = "URL")]
        service: Option<String>,

        /// Connection timeout (default from config). Examples: 30s, 2m
        #[arg(long, value_name = "DURATION", value_parser = parse_timeout_secs)]
        timeout: Option<u64>,

        /// Print the chart data as JSON on stdout instead of rendering tables
        #[arg(long)]
        json: bool,
    },

    /// Follow the service's admin status feed
    Watch {
        /// Status feed URL override (default: <service.url>/updates)
        #[arg(long, value_name = "URL")]
        service: Option<String>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g. service.url)
    Get {
        /// Dotted key path (e.g. service.url, status.reconnect_delay_ms)
        key: String,
    },
    /// Set a configuration value by key
    Set {
        /// Dotted key path (e.g. service.url, status.reconnect_delay_ms)
        key: String,
        /// Value to set
        value: String,
    },
    /// Dump the current configuration as TOML
    Dump,
}

/// Parse the classification mode argument.
fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

/// Parse a timeout duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_timeout_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify_defaults() {
        let cli = Cli::try_parse_from(["mozzie", "classify", "recording.wav"]).unwrap();

        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());

        match cli.command {
            Commands::Classify {
                file,
                mode,
                service,
                timeout,
                json,
            } => {
                assert_eq!(file, PathBuf::from("recording.wav"));
                assert_eq!(mode, Mode::Med);
                assert!(service.is_none());
                assert!(timeout.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_parse_classify_msc_mode() {
        let cli =
            Cli::try_parse_from(["mozzie", "classify", "recording.wav", "--mode", "msc"]).unwrap();
        match cli.command {
            Commands::Classify { mode, .. } => assert_eq!(mode, Mode::Msc),
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_parse_classify_mode_short_flag() {
        let cli = Cli::try_parse_from(["mozzie", "classify", "recording.wav", "-m", "msc"]).unwrap();
        match cli.command {
            Commands::Classify { mode, .. } => assert_eq!(mode, Mode::Msc),
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_parse_classify_invalid_mode() {
        let result = Cli::try_parse_from(["mozzie", "classify", "recording.wav", "--mode", "all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_classify_requires_file() {
        let result = Cli::try_parse_from(["mozzie", "classify"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_classify_with_service_and_json() {
        let cli = Cli::try_parse_from([
            "mozzie",
            "classify",
            "recording.wav",
            "--service",
            "wss://classify.example.org",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Classify { service, json, .. } => {
                assert_eq!(service.as_deref(), Some("wss://classify.example.org"));
                assert!(json);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_parse_classify_timeout() {
        let cli = Cli::try_parse_from([
            "mozzie",
            "classify",
            "recording.wav",
            "--timeout",
            "1m30s",
        ])
        .unwrap();
        match cli.command {
            Commands::Classify { timeout, .. } => assert_eq!(timeout, Some(90)),
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from(["mozzie", "watch"]).unwrap();
        match cli.command {
            Commands::Watch { service } => assert!(service.is_none()),
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_parse_watch_with_service() {
        let cli =
            Cli::try_parse_from(["mozzie", "watch", "--service", "ws://localhost:9000/updates"])
                .unwrap();
        match cli.command {
            Commands::Watch { service } => {
                assert_eq!(service.as_deref(), Some("ws://localhost:9000/updates"));
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["mozzie", "-q", "-vv", "watch"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_global_config_after_command() {
        let cli = Cli::try_parse_from(["mozzie", "watch", "--config", "/tmp/mozzie.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/mozzie.toml")));
    }

    #[test]
    fn test_parse_config_get() {
        let cli = Cli::try_parse_from(["mozzie", "config", "get", "service.url"]).unwrap();
        match cli.command {
            Commands::Config { action } => match action {
                ConfigAction::Get { key } => assert_eq!(key, "service.url"),
                _ => panic!("Expected Get action"),
            },
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "mozzie",
            "config",
            "set",
            "service.url",
            "wss://classify.example.org",
        ])
        .unwrap();
        match cli.command {
            Commands::Config { action } => match action {
                ConfigAction::Set { key, value } => {
                    assert_eq!(key, "service.url");
                    assert_eq!(value, "wss://classify.example.org");
                }
                _ => panic!("Expected Set action"),
            },
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_config_dump() {
        let cli = Cli::try_parse_from(["mozzie", "config", "dump"]).unwrap();
        match cli.command {
            Commands::Config { action } => match action {
                ConfigAction::Dump => {}
                _ => panic!("Expected Dump action"),
            },
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_config_requires_subcommand() {
        let result = Cli::try_parse_from(["mozzie", "config"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        let result = Cli::try_parse_from(["mozzie"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_timeout_secs_bare_number() {
        assert_eq!(parse_timeout_secs("30").unwrap(), 30);
        assert_eq!(parse_timeout_secs("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_timeout_secs_units() {
        assert_eq!(parse_timeout_secs("30s").unwrap(), 30);
        assert_eq!(parse_timeout_secs("2m").unwrap(), 120);
        assert_eq!(parse_timeout_secs("1m30s").unwrap(), 90);
    }

    #[test]
    fn test_parse_timeout_secs_invalid() {
        assert!(parse_timeout_secs("soon").is_err());
        assert!(parse_timeout_secs("").is_err());
    }
}
