//! Careerlog CLI - serve and inspect the person/job store

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use careerlog::config::{self, ServerSettings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "careerlog")]
#[command(version)]
#[command(about = "Track people and their employment history")]
#[command(long_about = r#"
Careerlog keeps persons and the jobs they held in a SQLite database and
serves them over a small REST API.

Example usage:
  careerlog init
  careerlog serve --port 3000
  careerlog persons --company OpenAI
  careerlog jobs --person <ID> --from 2023-06-01 --to 2023-06-30
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = "careerlog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Port to listen on (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List persons with their jobs
    Persons {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Only persons who worked at this company (exact match)
        #[arg(long)]
        company: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a person's jobs overlapping a date range
    Jobs {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Person id
        #[arg(long)]
        person: String,

        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show database statistics
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print the version
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        tracing::debug!("command failed: {:?}", e);
        careerlog::ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { database, port } => {
            let file_config = config::load_config(Some(&cli.config))?;
            let port_env = std::env::var("PORT").ok();
            let settings = ServerSettings::resolve(
                file_config.as_ref(),
                &cli.config,
                database,
                port,
                port_env.as_deref(),
            )?;
            tracing::info!(?settings, "resolved server settings");

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(careerlog::server::start_server(settings))
        }
        Commands::Init { force } => commands::run_init(&cli.config, force),
        Commands::Persons { database, company, json } => {
            let database = commands::resolve_database(database, &cli.config)?;
            commands::run_persons(&database, company.as_deref(), json)
        }
        Commands::Jobs { database, person, from, to, json } => {
            let database = commands::resolve_database(database, &cli.config)?;
            commands::run_jobs(&database, &person, &from, &to, json)
        }
        Commands::Stats { database } => {
            let database = commands::resolve_database(database, &cli.config)?;
            commands::run_stats(&database)
        }
        Commands::Version => commands::run_version(),
    }
}
