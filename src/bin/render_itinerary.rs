//! Render an itinerary document to HTML, Markdown or JSON.
//!
//! Output goes to stdout; logs go to stderr (RUST_LOG to adjust).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use itinerary_view::{
    Document, HtmlFormatter, HtmlOptions, JsonFormatter, MarkdownFormatter, StateStore,
    TreeBuilder,
};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
enum Format {
    Html,
    #[value(alias = "md")]
    Markdown,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "render_itinerary")]
#[command(version, about = "Render an itinerary as collapsible days, stops and sections")]
struct Args {
    /// Itinerary JSON: `{"days": [...]}` or a bare array of days
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Saved open/done state to apply before rendering
    #[arg(long)]
    state: Option<PathBuf>,

    /// HTML page title
    #[arg(long)]
    title: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("itinerary_view=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let document = Document::from_json_str(&json)
        .with_context(|| format!("Failed to load itinerary {}", args.input.display()))?;

    let store = match &args.state {
        Some(path) => StateStore::load(path)?,
        None => StateStore::new(),
    };

    let tree = TreeBuilder::new().with_state(&store).build(&document);
    tracing::info!(
        "Rendering {} days, {} stops as {:?}",
        tree.days.len(),
        document.stop_count(),
        args.format
    );

    let output = match args.format {
        Format::Html => {
            let mut options = HtmlOptions::default();
            if let Some(title) = args.title {
                options.title = title;
            }
            HtmlFormatter::format(&tree, &options)
        }
        Format::Markdown => MarkdownFormatter::format(&tree),
        Format::Json => JsonFormatter::format(&tree)?,
    };

    print!("{}", output);
    Ok(())
}
