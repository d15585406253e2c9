use anyhow::Result;
use clap::Parser;
use mozzie::cli::{Cli, Commands, ConfigAction};
use mozzie::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            file,
            mode,
            service,
            timeout,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            mozzie::app::run_classify_command(
                config,
                &file,
                mode,
                service,
                timeout,
                json,
                cli.quiet,
                cli.verbose,
            )
            .await?;
        }
        Commands::Watch { service } => {
            let config = load_config(cli.config.as_deref())?;
            mozzie::app::run_watch_command(config, service, cli.quiet).await?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/mozzie/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        Config::load_or_default(&Config::default_path())?
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    let config_path = custom_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            match config.get_value_by_path(&key) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            Config::set_value_by_path(&config_path, &key, &value)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Dump => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            print!("{}", config.dump()?);
        }
    }

    Ok(())
}
