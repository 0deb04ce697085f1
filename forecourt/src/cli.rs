/// Command line interface for the forecourt content pipeline.
///
/// This module is CLI glue only: argument parsing, loading configuration,
/// building the content client and printing results. Everything that talks to
/// the CMS lives in `forecourt-core`.
///
/// Results go to stdout as JSON (or XML for the sitemap); logs go to stderr.
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forecourt_core::client::ContentClient;
use forecourt_core::navigation::{fetch_site_navigation, Menu};
use forecourt_core::page::{serve_page, PageOutcome};
use forecourt_core::sitemap::generate_sitemap;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Resolve pages, navigation and the sitemap from the CMS.
#[derive(Parser)]
#[clap(
    name = "forecourt",
    version,
    about = "Resolve site pages, navigation and sitemap from Contentful"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one URL path and print its page props
    Page {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Requested URL path, e.g. /services/mot
        path: String,
    },
    /// Generate the XML sitemap
    Sitemap {
        #[clap(long)]
        config: PathBuf,
        /// Write to this file instead of stdout
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Print the header navigation, or the footer with --footer
    Navigation {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        footer: bool,
    },
}

/// The JSON body printed for a page lookup.
pub fn page_response(outcome: &PageOutcome, requested: &str) -> Result<Value> {
    Ok(match outcome {
        PageOutcome::Found(view) => json!({
            "status": 200,
            "page": serde_json::to_value(view)?,
        }),
        PageOutcome::NotFound => json!({
            "status": 404,
            "path": requested,
        }),
    })
}

/// Async entrypoint shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Page { config, path } => {
            let settings = load_config(config)?;
            let client = ContentClient::from_env(&settings)?;
            tracing::info!(command = "page", requested = %path, "Resolving page");

            let outcome = serve_page(&client, &settings, &path).await;
            let body = page_response(&outcome, &path)?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Commands::Sitemap { config, output } => {
            let settings = load_config(config)?;
            let client = ContentClient::from_env(&settings)?;
            tracing::info!(command = "sitemap", "Generating sitemap");

            let xml = generate_sitemap(&client, &settings)
                .await
                .context("Failed to collect site paths")?;
            match output {
                Some(file) => {
                    std::fs::write(&file, &xml)
                        .with_context(|| format!("Failed to write sitemap to {file:?}"))?;
                    tracing::info!(command = "sitemap", output = ?file, "Sitemap written");
                }
                None => print!("{xml}"),
            }
            Ok(())
        }
        Commands::Navigation { config, footer } => {
            let settings = load_config(config)?;
            let client = ContentClient::from_env(&settings)?;
            let menu = if footer { Menu::Footer } else { Menu::Header };
            tracing::info!(command = "navigation", ?menu, "Loading navigation");

            let navigation = fetch_site_navigation(&client, &settings, menu)
                .await
                .context("Failed to load navigation")?;
            match navigation {
                Some(props) => println!("{}", serde_json::to_string_pretty(&props)?),
                None => {
                    tracing::error!(command = "navigation", ?menu, "Navigation not found");
                    anyhow::bail!("navigation entry not found");
                }
            }
            Ok(())
        }
    }
}
