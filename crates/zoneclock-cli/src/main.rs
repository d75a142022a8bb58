use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zoneclock_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "zoneclock-cli", version, about = "Zoneclock focus timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a focus session in the foreground
    Run {
        /// Focus length in minutes (defaults to the configured duration)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Complete first-run onboarding
    Onboard,
    /// Focus and break settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Focus statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Do-not-disturb mode
    Dnd {
        #[command(subcommand)]
        action: commands::dnd::DndAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(&config);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "failed to load config, using defaults");
    }

    let result = match cli.command {
        Commands::Run { minutes } => commands::run::run(minutes, &config),
        Commands::Onboard => commands::onboard::run(&config),
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::Stats { action } => commands::stats::run(action, &config),
        Commands::Dnd { action } => commands::dnd::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
