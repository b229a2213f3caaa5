mod commands;
mod fixture;
mod output;
mod render;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::Result;
use petcare_core::config::DashboardConfig;
use tracing::info;

use crate::output::Output;

#[derive(Parser)]
#[command(name = "petcare")]
#[command(about = "Petcare home dashboard harness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one interactive refresh and print the dashboard
    Refresh {
        /// JSON file with pets and calendar events
        #[arg(long)]
        fixture: PathBuf,
    },
    /// Refresh now, then in the background until Ctrl-C
    Watch {
        /// JSON file with pets and calendar events
        #[arg(long)]
        fixture: PathBuf,

        /// Override the configured refresh interval
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Write the default configuration
    Init {
        /// Output path (defaults to the standard config location)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if debug {
        "petcare_core=debug,petcare_cli=debug,info"
    } else {
        "petcare_core=info,petcare_cli=info,warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let terminal_layer = fmt::layer()
        .with_target(debug)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(terminal_layer)
        .init();
}

/// An explicitly requested config must exist; the standard location may not.
fn load_config(path: &Path, explicit: bool) -> Result<DashboardConfig> {
    info!("Loading config from: {:?}", path);
    let config = if explicit {
        DashboardConfig::load(path)?
    } else {
        DashboardConfig::load_or_default(path)?
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    init_tracing(cli.debug);

    let config_path = cli.config.clone().unwrap_or_else(DashboardConfig::default_path);
    let output = Output::new();

    match cli.command {
        Commands::Refresh { fixture } => {
            let config = load_config(&config_path, cli.config.is_some())?;
            commands::dashboard::refresh(&config, &fixture, &output).await
        }
        Commands::Watch {
            fixture,
            interval_secs,
        } => {
            let config = load_config(&config_path, cli.config.is_some())?;
            commands::dashboard::watch(&config, &fixture, interval_secs, &output).await
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => {
                let config = load_config(&config_path, cli.config.is_some())?;
                commands::config::show(&config, &output)
            }
            ConfigCommands::Init {
                output: path,
                force,
            } => commands::config::init(&path.unwrap_or(config_path), force, &output),
        },
    }
}
