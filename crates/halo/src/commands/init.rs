use std::io;
use std::path::Path;

use halo_core::config;

#[derive(clap::Args)]
pub struct InitArgs {
    /// Replace an existing config.toml with the commented defaults
    #[arg(long)]
    force: bool,
    /// Print the starter config instead of writing it
    #[arg(long, conflicts_with = "force")]
    stdout: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Created,
    Replaced,
    Kept,
}

/// Writes the commented starter `config.toml` into `~/.config/halo/`.
pub fn execute(args: &InitArgs) {
    let template = config::template::generate_config();
    if args.stdout {
        print!("{template}");
        return;
    }

    let Some(path) = config::config_path() else {
        eprintln!("Error: could not determine home directory.");
        std::process::exit(1);
    };

    match write_config(&path, &template, args.force) {
        Ok(Outcome::Created) => println!("Created {}", path.display()),
        Ok(Outcome::Replaced) => println!("Replaced {}", path.display()),
        Ok(Outcome::Kept) => {
            println!("Already exists: {} (use --force to replace)", path.display());
            return;
        }
        Err(e) => {
            eprintln!("Error: could not write {}: {e}", path.display());
            std::process::exit(1);
        }
    }
    println!("\nEdit config.toml to change the caption buttons, border color, and glow.");
}

fn write_config(path: &Path, content: &str, force: bool) -> io::Result<Outcome> {
    let existed = path.exists();
    if existed && !force {
        return Ok(Outcome::Kept);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, content)?;
    Ok(if existed { Outcome::Replaced } else { Outcome::Created })
}
