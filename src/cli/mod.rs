use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::ConfigLoader;
use crate::storage;

pub mod commands;

use self::commands::{AddArgs, EditArgs, ListArgs, StatsArgs};

#[derive(Parser, Debug)]
#[command(
    name = "moodlog",
    version,
    about = "Terminal emotion diary with a monthly mood calendar"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over MOODLOG_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over MOODLOG_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive calendar TUI (default)
    Tui,
    /// Record a diary entry from the command line
    Add(AddArgs),
    /// Revise an existing diary entry
    Edit(EditArgs),
    /// Print recent diary entries
    List(ListArgs),
    /// Print the emotion breakdown for one month
    Stats(StatsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("MOODLOG_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("MOODLOG_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;
    let store = storage::init(loader.paths(), &config.store)?;

    let config = Arc::new(config);
    let command = cli.command.unwrap_or(Commands::Tui);
    match command {
        Commands::Tui => {
            let mut app = App::new(config.clone(), store.clone())?;
            commands::run_tui(&mut app)
        }
        Commands::Add(args) => commands::add_entry(config.clone(), store.clone(), args),
        Commands::Edit(args) => commands::edit_entry(config.clone(), store.clone(), args),
        Commands::List(args) => commands::list_entries(config.clone(), store.clone(), args),
        Commands::Stats(args) => commands::month_stats(config, store, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
