//! CLI entry point for the rare bird sightings map.
//!
//! `render` builds the standalone Leaflet page from the collected dataset;
//! `check` runs the same pipeline headless and prints run statistics.

use anyhow::Result;
use bird_map::config::{Layout, MapConfig, PopupStyle, RenderMode};
use bird_map::fetch::{BasicClient, FileRetriever, HttpRetriever, Retriever};
use bird_map::leaflet::LeafletMap;
use bird_map::output::{append_record, print_json, print_pretty, render_document, write_document};
use bird_map::page::HtmlPage;
use bird_map::pipeline::SightingPipeline;
use bird_map::state::PipelineState;
use bird_map::surface::RecordingSurface;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bird_map")]
#[command(about = "Render rare bird sightings as an interactive map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Dataset name, relative to the base URL or the local root
    #[arg(short, long)]
    data: Option<String>,

    /// Fetch the dataset over HTTP from this base URL instead of the local filesystem
    #[arg(long)]
    base_url: Option<String>,

    /// Local directory the dataset name is resolved against
    #[arg(long, default_value = ".")]
    root: String,

    /// Marker placement
    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Popup card and interaction style
    #[arg(long, value_enum)]
    popup: Option<PopupStyle>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the map page from the sightings dataset
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// HTML file to write
        #[arg(short, long, default_value = "index.html")]
        output: String,

        /// CSV file to append run statistics to
        #[arg(long)]
        stats: Option<String>,
    },
    /// Run the pipeline without producing a page and print run statistics
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bird_map.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bird_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            output,
            stats,
        } => {
            let config = build_config(&source);
            let retriever = retriever(&source)?;

            let mut pipeline =
                SightingPipeline::new(config, retriever, LeafletMap::new(), HtmlPage::new());
            let state = pipeline.run().await.clone();

            let html = render_document(pipeline.config(), pipeline.surface(), pipeline.page())?;
            write_document(&output, &html)?;

            let (_, _, run_stats) = pipeline.into_parts();
            print_pretty(&run_stats);
            if let Some(path) = stats {
                append_record(&path, &run_stats)?;
            }

            info!(
                state = state.label(),
                placed = run_stats.placed,
                rejected = run_stats.rejected,
                placed_pct = run_stats.placed_pct(),
                image_pct = run_stats.image_pct(),
                output = %output,
                "Render finished"
            );
        }
        Commands::Check { source } => {
            let config = build_config(&source);
            let retriever = retriever(&source)?;

            let mut pipeline =
                SightingPipeline::new(config, retriever, RecordingSurface::new(), HtmlPage::new());
            let state = pipeline.run().await.clone();

            print_json(pipeline.stats())?;

            if let PipelineState::Error(message) = state {
                anyhow::bail!(message);
            }
        }
    }

    Ok(())
}

/// Environment-derived config with CLI overrides applied.
fn build_config(source: &SourceArgs) -> MapConfig {
    let mut config = MapConfig::from_env();

    if let Some(data) = &source.data {
        config.dataset = data.clone();
    }

    let preset = match source.layout {
        Some(Layout::Direct) => RenderMode::direct(),
        Some(Layout::Cluster) => RenderMode::cluster(),
        None => config.mode,
    };
    let mode = RenderMode {
        layout: preset.layout,
        popup_style: source.popup.unwrap_or(preset.popup_style),
    };

    if mode.layout == Layout::Direct && mode.popup_style == PopupStyle::Detailed {
        warn!("Direct layout with detailed popups: markers open on click only");
    }

    config.with_mode(mode)
}

/// Loads the dataset over HTTP when a base URL is given, otherwise from disk.
fn retriever(source: &SourceArgs) -> Result<Box<dyn Retriever>> {
    let retriever: Box<dyn Retriever> = match &source.base_url {
        Some(base) => Box::new(HttpRetriever::new(BasicClient::new()?, base.clone())),
        None => Box::new(FileRetriever::new(&source.root)),
    };
    Ok(retriever)
}
