// Ramani - farming assistant chat client
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ramani::cli::{build_session, Repl};
use ramani::config::{load_config, Persona};

#[derive(Parser)]
#[command(name = "ramani", version, about = "Chat with Ramani, the AgriCare farming assistant")]
struct Cli {
    /// Config file (default: ~/.ramani/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Persona TOML overriding the configured preamble
    #[arg(long, global = true)]
    persona: Option<PathBuf>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Send one message and print the reply
    Ask {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Print the effective configuration (API key redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = &cli.persona {
        config.persona = Persona::load(path)
            .with_context(|| format!("Failed to load persona {}", path.display()))?;
    }

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let session = build_session(&config)?;
            let mut repl = Repl::new(config, session)?;
            repl.run().await?;
        }
        Commands::Ask { message } => {
            let session = build_session(&config)?;
            let reply = session.send_turn(&message.join(" ")).await?;
            println!("{}", reply);
        }
        Commands::Config => {
            print!("{}", config.to_redacted_toml()?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ramani=debug" } else { "ramani=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
