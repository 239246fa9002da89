mod app;
mod config;
mod error;
mod explorer;
mod focus;
mod graph;
mod search;
mod taxonomy;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_DATA_BASE, initial_language};
use crate::explorer::Explorer;
use crate::taxonomy::{DataSource, open_source};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory or http(s) URL that contains `data/<lang>/`.
    #[arg(long, env = "TAXONOMY_DATA", default_value = DEFAULT_DATA_BASE)]
    data: String,

    /// Language code to start with; defaults to the saved preference.
    #[arg(long)]
    lang: Option<String>,

    /// Tracing filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive viewer.
    View,
    /// Build the graph without a window and print it as JSON.
    Dump {
        /// Detailed field to expand before printing; repeatable.
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,

        /// Search term whose matches are highlighted in the output.
        #[arg(long)]
        search: Option<String>,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dump(
    source: Arc<dyn DataSource>,
    language: &str,
    expand: &[String],
    search: Option<&str>,
) -> Result<()> {
    let mut explorer = Explorer::load(source, language)
        .with_context(|| format!("failed to load the {language} index"))?;

    for node_id in expand {
        if let Err(error) = explorer.expand(node_id) {
            warn!(node_id = %node_id, %error, "skipping expansion");
        }
    }

    if let Some(term) = search {
        let found = explorer.search(term);
        info!(term, matches = found.len(), "search applied to dump");
    }

    let snapshot = serde_json::to_string_pretty(&explorer.graph_state())
        .context("failed to serialize graph snapshot")?;
    println!("{snapshot}");
    Ok(())
}

fn view(source: Arc<dyn DataSource>, language: Option<String>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Taxonomy Atlas",
        options,
        Box::new(move |cc| Ok(Box::new(app::TaxonomyApp::new(cc, source, language)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let source = open_source(&args.data)?;

    match args.command.unwrap_or(Command::View) {
        Command::View => view(source, args.lang),
        Command::Dump { expand, search } => {
            let language = initial_language(args.lang.as_deref(), None);
            dump(source, &language, &expand, search.as_deref())
        }
    }
}
