mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "halo",
    version,
    about = "Custom window chrome with a glow halo that follows the window"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default configuration file
    Init(commands::init::InitArgs),
    /// Print the effective configuration
    Config(commands::config::ConfigArgs),
    /// Open a demo window with custom chrome and glow
    Run(commands::run::RunArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => commands::init::execute(&args),
        Commands::Config(args) => commands::config::execute(&args),
        Commands::Run(args) => commands::run::execute(&args),
    }
}
