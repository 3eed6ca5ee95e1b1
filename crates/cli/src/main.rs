//! Shine CLI - command-line runner for the Unicorn scripting language.

mod commands;
mod discovery;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{Result, miette};

#[derive(Parser)]
#[command(name = "shine")]
#[command(
    author,
    version,
    about = "Runner, plugin host, and self-updater for the Unicorn scripting language"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script to run (shorthand for `shine run <FILE>`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Plugins directory (auto-detected if not specified)
    #[arg(long, value_name = "DIR")]
    plugins_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file
    Run {
        /// File to execute
        file: PathBuf,
    },

    /// Check for a new release and download its installer
    Update,

    /// List loaded plugins
    Plugins,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Handle update separately (doesn't need the plugin registry)
    if let Some(Commands::Update) = &cli.command {
        return commands::update::execute(env!("CARGO_PKG_VERSION")).await;
    }

    // The registry is built once here and passed down by reference.
    let plugins_dir = cli.plugins_dir.clone().or_else(discovery::find_plugins_dir);
    let registry = match &plugins_dir {
        Some(dir) => shine_plugin::PluginRegistry::load(dir).await,
        None => shine_plugin::PluginRegistry::empty(),
    };

    match cli.command {
        Some(Commands::Run { file }) => commands::run::execute(&file, &registry).await,

        Some(Commands::Plugins) => commands::plugins::execute(&registry),

        Some(Commands::Update) => unreachable!("Update is handled earlier"),

        None => match cli.file {
            Some(file) => commands::run::execute(&file, &registry).await,
            None => Err(miette!("\u{1f984} Usage: shine <file.unicorn>")),
        },
    }
}
