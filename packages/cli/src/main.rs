#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the quote vision toolchain.
//!
//! ```text
//! quote_vision serve
//! quote_vision seed [--quotes 50] [--projects 1000] [--rng-seed 42]
//! quote_vision stats [--state AZ] [--roof-type TPO] [--date-from 2024-01-01] [--date-to 2024-12-31]
//! quote_vision export [filters...] [--output projects.csv]
//! ```
//!
//! Running `quote_vision` with no subcommand starts the server in
//! interactive mode. The database path comes from `--database`, then
//! `DATABASE_PATH`, then the default.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quote_vision_analytics::{export, stats};
use quote_vision_database::db::open_db;
use quote_vision_database::queries::list_projects;
use quote_vision_database::seed::{
    DEFAULT_PROJECT_COUNT, DEFAULT_QUOTE_COUNT, SeedConfig, seed_if_empty,
};
use quote_vision_server::ServerConfig;
use quote_vision_server_models::ProjectQueryParams;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(
    name = "quote_vision",
    about = "Roof coating quote intake and project performance dashboard"
)]
struct Cli {
    /// `SQLite` database file (overrides `DATABASE_PATH`)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server using environment configuration
    Serve,
    /// Fill empty tables with generated demo data
    Seed {
        /// Quotes to generate
        #[arg(long, default_value_t = DEFAULT_QUOTE_COUNT)]
        quotes: usize,
        /// Projects to generate
        #[arg(long, default_value_t = DEFAULT_PROJECT_COUNT)]
        projects: usize,
        /// Fixed RNG seed for reproducible data
        #[arg(long)]
        rng_seed: Option<u64>,
    },
    /// Print dashboard statistics as JSON
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export projects as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Project filter flags shared by `stats` and `export`.
#[derive(Args)]
struct FilterArgs {
    /// Two-letter state abbreviation
    #[arg(long)]
    state: Option<String>,
    /// Roof type label, e.g. "Modified Bitumen"
    #[arg(long)]
    roof_type: Option<String>,
    /// Earliest project date (inclusive)
    #[arg(long)]
    date_from: Option<String>,
    /// Latest project date (inclusive)
    #[arg(long)]
    date_to: Option<String>,
}

impl From<FilterArgs> for ProjectQueryParams {
    fn from(args: FilterArgs) -> Self {
        Self {
            state: args.state,
            roof_type: args.roof_type,
            date_from: args.date_from,
            date_to: args.date_to,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(path) = cli.database {
        config.database_path = path;
    }

    let Some(command) = cli.command else {
        // The server uses actix-web's runtime, so run it in a blocking task
        // to avoid nesting tokio runtimes.
        tokio::task::spawn_blocking(move || {
            actix_web::rt::System::new().block_on(quote_vision_server::interactive::run(config))
        })
        .await??;
        return Ok(());
    };

    match command {
        Commands::Serve => {
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(quote_vision_server::run_server(config))
            })
            .await??;
        }
        Commands::Seed {
            quotes,
            projects,
            rng_seed,
        } => {
            let db = open_db(&config.database_path).await?;
            let mut rng = rng_seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            let summary = seed_if_empty(
                db.as_ref(),
                SeedConfig {
                    quote_count: quotes,
                    project_count: projects,
                },
                &mut rng,
            )
            .await?;

            println!(
                "Inserted {} quotes and {} projects into {}",
                summary.quotes_inserted,
                summary.projects_inserted,
                config.database_path.display()
            );
        }
        Commands::Stats { filter } => {
            let filter = ProjectQueryParams::from(filter).into_filter()?;
            let db = open_db(&config.database_path).await?;
            let projects = list_projects(db.as_ref(), &filter).await?;

            let stats = stats::compute_stats(&projects, &filter);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Export { filter, output } => {
            let filter = ProjectQueryParams::from(filter).into_filter()?;
            let db = open_db(&config.database_path).await?;
            let projects = list_projects(db.as_ref(), &filter).await?;

            if let Some(path) = output {
                export::write_projects_csv(&projects, BufWriter::new(File::create(&path)?))?;
                log::info!("Wrote {} projects to {}", projects.len(), path.display());
            } else {
                export::write_projects_csv(&projects, io::stdout().lock())?;
            }
        }
    }

    Ok(())
}
