//! `rephp`: an interactive PHP shell front end.
//!
//! ```text
//! rephp                        # Interactive REPL
//! rephp clean file.php         # Clean a file as one turn
//! rephp clean file.php --json  # ... and report the outcome as JSON
//! rephp config                 # Print the effective configuration
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rephp_cleaner::CodeCleaner;
use rephp_cli::config::{load_config, RephpConfig};
use rephp_cli::error::CliError;
use rephp_cli::{clean, repl};
use tracing_subscriber::EnvFilter;

/// rephp, an interactive PHP shell
#[derive(Debug, Parser)]
#[command(name = "rephp", version, about)]
struct Cli {
    /// Config file (defaults to ~/.rephp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Prepend declare(strict_types=1) to every turn
    #[arg(long, global = true)]
    strict_types: bool,
    /// Skip all validation
    #[arg(long, global = true)]
    yolo: bool,
    /// Only finish a turn at an explicit semicolon
    #[arg(long, global = true)]
    require_semicolons: bool,
    /// Reject unknown namespaced classes instead of assuming autoloading
    #[arg(long, global = true)]
    no_autoload: bool,
    /// Seed namespace and use statements from this file
    #[arg(long, global = true)]
    warm_up: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean a PHP file as a single turn and print the result
    Clean {
        file: PathBuf,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    fn apply(&self, config: &mut RephpConfig) {
        config.strict_types |= self.strict_types;
        config.yolo |= self.yolo;
        config.require_semicolons |= self.require_semicolons;
        if self.no_autoload {
            config.assume_autoload = false;
        }
        if let Some(path) = &self.warm_up {
            config.warm_up_file = Some(path.display().to_string());
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rephp=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());
    cli.apply(&mut config);

    if let Err(err) = run(cli.command, &config) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Option<Command>, config: &RephpConfig) -> Result<(), CliError> {
    match command {
        Some(Command::Config) => {
            print!("{}", toml::to_string(config)?);
            Ok(())
        }
        Some(Command::Clean { file, json }) => {
            let mut cleaner = new_cleaner(config);
            println!("{}", clean::cmd_clean(&mut cleaner, &file, json)?);
            Ok(())
        }
        None => repl::run_interactive(new_cleaner(config), config.history_path()),
    }
}

fn new_cleaner(config: &RephpConfig) -> CodeCleaner {
    let mut cleaner = CodeCleaner::new(config.cleaner_options());
    if let Some(path) = config.warm_up_path() {
        cleaner.warm_up(&path);
    }
    cleaner
}
