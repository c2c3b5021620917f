use anyhow::Result;
use clap::{Parser, Subcommand};
use hireflow_infrastructure::ConfigService;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "hireflow")]
#[command(about = "Hireflow CLI - candidate evaluation runs and hiring pipeline", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch evaluate and/or debate runs and follow their progress
    Run(commands::run::RunArgs),
    /// Move a candidate to another pipeline stage
    Stage(commands::stage::StageArgs),
    /// Show the pipeline board of a job
    Board(commands::board::BoardArgs),
    /// Reconstruct debate progress from a telemetry file
    Timeline(commands::timeline::TimelineArgs),
    /// Inspect or initialize the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::new().with_path(path),
        None => ConfigService::new(),
    };

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config_service).await?,
        Commands::Stage(args) => {
            hireflow_execution::init_tracing(None)?;
            commands::stage::execute(args, &config_service).await?
        }
        Commands::Board(args) => {
            hireflow_execution::init_tracing(None)?;
            commands::board::execute(args, &config_service).await?
        }
        Commands::Timeline(args) => commands::timeline::execute(args)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_service)?,
            ConfigAction::Path => commands::config::path(&config_service)?,
            ConfigAction::Init => commands::config::init(&config_service)?,
        },
    }

    Ok(())
}
