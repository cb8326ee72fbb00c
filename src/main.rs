//! # DTC Explorer CLI (`dtcx`)
//!
//! The `dtcx` binary searches a trouble-code catalog, prints single records
//! and their share links, resolves deep-link fragments, and serves the same
//! operations over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! dtcx --config ./config/dtcx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dtcx search [QUERY]` | Filter the catalog by query, model, and severity |
//! | `dtcx get <CODE>` | Print one record with its detail fields |
//! | `dtcx facets` | List model and severity facets |
//! | `dtcx link <CODE>` | Print the shareable URL for a record |
//! | `dtcx resolve <FRAGMENT>` | Resolve a `#dtc=...` fragment to a record |
//! | `dtcx stats` | Summarize the loaded catalog |
//! | `dtcx serve` | Start the HTTP API |
//!
//! When the config file does not exist, defaults are used and the catalog
//! falls back to the built-in sample records.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dtc_explorer::filter::SeverityFilter;
use dtc_explorer::{config, get, search, server, stats};

/// DTC Explorer CLI — search, filter, and deep-link into a catalog of
/// automotive diagnostic trouble codes.
#[derive(Parser)]
#[command(
    name = "dtcx",
    about = "DTC Explorer — search, filter, and deep-link into a catalog of diagnostic trouble codes",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dtcx.toml`. If the file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/dtcx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Filter the catalog.
    ///
    /// Matches the query against code, title, and system (case- and
    /// accent-insensitive), then applies the model and severity filters.
    /// Results are sorted by code.
    Search {
        /// Free-text query. Empty matches everything.
        query: Option<String>,

        /// Only records listing this exact model code (`any` for no filter).
        #[arg(long)]
        model: Option<String>,

        /// Only records of this severity: 1 (high), 2 (medium), 3 (low); 0 for any.
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
        severity: u8,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print one record by its code.
    Get {
        /// Record code, e.g. `P0300`. Case-sensitive.
        code: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List model and severity facets of the full catalog.
    Facets {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the shareable URL for a record.
    ///
    /// The URL is `[server].base_url` with a `#dtc=<code>` fragment.
    Link {
        /// Record code.
        code: String,
    },

    /// Resolve a deep-link fragment such as `#dtc=C0490-01`.
    ///
    /// Unknown codes print "No selection." and exit successfully.
    Resolve {
        /// The URL fragment, with or without the leading `#`.
        fragment: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Summarize the loaded catalog.
    Stats,

    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` and serves the catalog endpoints.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        debug!(path = %cli.config.display(), "config file not found, using defaults");
        config::Config::minimal()
    };

    match cli.command {
        Commands::Search {
            query,
            model,
            severity,
            json,
        } => {
            let severity = SeverityFilter::from_number(i64::from(severity)).unwrap_or_default();
            let criteria = search::build_criteria(query.as_deref(), model.as_deref(), severity);
            search::run_search(&cfg, criteria, json).await?;
        }
        Commands::Get { code, json } => {
            get::run_get(&cfg, &code, json).await?;
        }
        Commands::Facets { json } => {
            search::run_facets(&cfg, json).await?;
        }
        Commands::Link { code } => {
            get::run_link(&cfg, &code).await?;
        }
        Commands::Resolve { fragment, json } => {
            get::run_resolve(&cfg, &fragment, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
