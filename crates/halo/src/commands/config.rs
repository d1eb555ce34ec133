use std::path::PathBuf;

use clap::Args;
use halo_core::config::{self, Config};

#[derive(Args)]
pub struct ConfigArgs {
    /// Print as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
    /// Read this file instead of ~/.config/halo/config.toml
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Print the built-in defaults, ignoring any config file
    #[arg(long, conflicts_with = "file")]
    pub defaults: bool,
}

/// Prints the configuration Halo would run with, after validation.
///
/// An explicit `--file` that fails to load is an error; the default
/// location falls back to defaults the same way `halo run` does.
pub fn execute(args: &ConfigArgs) {
    let config = if args.defaults {
        Config::default()
    } else if let Some(path) = &args.file {
        match config::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        config::load()
    };

    match render(&config, args.json) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: could not serialize config: {e}");
            std::process::exit(1);
        }
    }
}

fn render(config: &Config, json: bool) -> Result<String, String> {
    if json {
        serde_json::to_string_pretty(config).map_err(|e| e.to_string())
    } else {
        toml::to_string_pretty(config).map_err(|e| e.to_string())
    }
}
