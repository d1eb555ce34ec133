use clap::Args;

#[derive(Args)]
pub struct RunArgs {
    /// Window title
    #[arg(long, default_value = "Halo")]
    pub title: String,
    /// Disable the glow regardless of config
    #[arg(long)]
    pub no_glow: bool,
    /// Cycle the border and glow colors from a background thread every N milliseconds
    #[arg(long, value_name = "MS")]
    pub cycle_border: Option<u64>,
}

/// Opens the demo window and blocks until it is closed.
#[cfg(windows)]
pub fn execute(args: &RunArgs) {
    use std::time::Duration;

    let mut config = halo_core::config::load();
    halo_core::log::init(&config.logging);
    if args.no_glow {
        config.glow.enabled = false;
    }

    let options = halo_windows::RunOptions {
        title: args.title.clone(),
        cycle_border: args.cycle_border.map(Duration::from_millis),
    };
    halo_core::log_info!("halo run: glow {}", config.glow.enabled);

    if let Err(e) = halo_windows::run(&config, &options) {
        halo_core::log_error!("halo run failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
pub fn execute(_args: &RunArgs) {
    eprintln!("Error: `halo run` needs Windows; there is no window backend for this platform.");
    std::process::exit(1);
}
