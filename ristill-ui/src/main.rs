//! Ristill - headless driver for the materials gallery.
//!
//! Loads a dataset, drives the app with page events and prints what the
//! gallery would show as JSON.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ristill_api::{RecordId, Route};
use ristill_kernel::{
    DetailView, HistoryHandle, KeyValueStore, MaterialStore, MemoryStore, NavKey, SqliteStore,
    SystemClock,
};
use ristill_ui::constants::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use ristill_ui::{GalleryApp, GalleryConfig, GalleryMessage, View};
use serde::Serialize;
use tessella::{ScrollAction, ScrollBehavior, Size, assign};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ristill", version)]
struct Cli {
    /// Gallery config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the column assignment for a viewport width.
    Layout(LayoutArgs),
    /// Scroll the listing and print the rendered frame.
    Render(RenderArgs),
    /// Print one material with its neighbours and related materials,
    /// optionally after pressing navigation keys.
    Detail(DetailArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Dataset JSON.
    dataset: PathBuf,

    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    width: f32,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Dataset JSON.
    dataset: PathBuf,

    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    width: f32,

    #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
    height: f32,

    /// Page offset to scroll to. Without it a saved position is restored.
    #[arg(long)]
    scroll: Option<f32>,

    /// Session database. Scroll state is saved here and restored from the
    /// previous session on the next run.
    #[arg(long, conflicts_with = "persist")]
    session_db: Option<PathBuf>,

    /// Use the session database at the default location.
    #[arg(long, default_value_t = false)]
    persist: bool,
}

#[derive(Parser, Debug)]
struct DetailArgs {
    /// Dataset JSON.
    dataset: PathBuf,

    /// Material id or `/materials/{id}` path.
    target: String,

    /// Key to press on the detail page (`ArrowLeft`, `ArrowRight`, `Escape`).
    /// Repeatable; applied in order.
    #[arg(long = "key")]
    keys: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };

    match cli.cmd {
        Command::Layout(args) => cmd_layout(&config, args),
        Command::Render(args) => cmd_render(&config, args),
        Command::Detail(args) => cmd_detail(&config, args),
    }
}

fn load_store(path: &Path) -> anyhow::Result<MaterialStore> {
    let store = MaterialStore::load_from_path(path)
        .with_context(|| format!("load dataset '{}'", path.display()))?;
    tracing::info!(records = store.len(), path = %path.display(), "dataset loaded");
    Ok(store)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

// =========================================================================
// layout
// =========================================================================

#[derive(Serialize)]
struct LayoutReport<'a> {
    breakpoint: tessella::BreakpointName,
    column_width: f32,
    estimated_item_height: f32,
    columns: Vec<ColumnReport<'a>>,
}

#[derive(Serialize)]
struct ColumnReport<'a> {
    id: String,
    estimated_height: f32,
    items: Vec<&'a RecordId>,
}

fn cmd_layout(config: &GalleryConfig, args: LayoutArgs) -> anyhow::Result<()> {
    let store = load_store(&args.dataset)?;
    let layout = config.layout_policy()?.resolve(args.width);
    let records = store.records();

    let columns = assign(records, layout.column_count, layout.column_width, layout.row_gap)
        .into_iter()
        .map(|column| ColumnReport {
            id: column.column_id.to_string(),
            estimated_height: column.cumulative_height,
            items: column
                .items
                .iter()
                .filter_map(|&index| records.get(index).map(|r| &r.id))
                .collect(),
        })
        .collect();

    print_json(&LayoutReport {
        breakpoint: layout.breakpoint,
        column_width: layout.column_width,
        estimated_item_height: layout.estimated_item_height,
        columns,
    })
}

// =========================================================================
// render
// =========================================================================

fn open_session(args: &RenderArgs) -> anyhow::Result<Box<dyn KeyValueStore>> {
    let mut store = match (&args.session_db, args.persist) {
        (Some(path), _) => SqliteStore::open(path)?,
        (None, true) => SqliteStore::open_default()?,
        (None, false) => return Ok(Box::new(MemoryStore::new())),
    };
    if let Some(previous) = store.previous_session()? {
        tracing::debug!(session = previous.id, started_at = %previous.started_at, "resuming session");
        store.resume_session(previous.id)?;
    }
    Ok(Box::new(store))
}

fn cmd_render(config: &GalleryConfig, args: RenderArgs) -> anyhow::Result<()> {
    let store = load_store(&args.dataset)?;
    let session = open_session(&args)?;
    let viewport = Size::new(args.width, args.height);

    let mut app = GalleryApp::new(
        store,
        config,
        HistoryHandle::new(Route::Listing),
        session,
        Rc::new(SystemClock),
        viewport,
    )?;

    // Let a restore finish before scrolling.
    app.update(GalleryMessage::AnimationFrame);
    app.update(GalleryMessage::AnimationFrame);
    if let Some(offset) = args.scroll {
        app.update(GalleryMessage::Scroll(ScrollAction::ScrollTo {
            offset,
            behavior: ScrollBehavior::Auto,
        }));
    }

    let View::Listing(frame) = app.view() else {
        anyhow::bail!("listing did not mount");
    };
    print_json(&frame)?;

    // The process is about to go away, like a hidden tab.
    app.update(GalleryMessage::VisibilityHidden);
    Ok(())
}

// =========================================================================
// detail
// =========================================================================

#[derive(Serialize)]
struct DetailReport<'a> {
    #[serde(flatten)]
    detail: DetailView<'a>,
    position_label: String,
    related: Vec<&'a RecordId>,
}

/// Where the keys led when it is not a detail page.
#[derive(Serialize)]
struct RouteReport {
    route: String,
}

fn parse_target(target: &str) -> anyhow::Result<Route> {
    if target.starts_with('/') {
        Route::parse(target).with_context(|| format!("parse path '{target}'"))
    } else {
        Ok(Route::detail(target))
    }
}

fn cmd_detail(config: &GalleryConfig, args: DetailArgs) -> anyhow::Result<()> {
    let store = load_store(&args.dataset)?;
    let route = parse_target(&args.target)?;
    let keys = args
        .keys
        .iter()
        .map(|name| NavKey::from_key_name(name).with_context(|| format!("unknown key '{name}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut app = GalleryApp::new(
        store,
        config,
        HistoryHandle::new(route),
        Box::new(MemoryStore::new()),
        Rc::new(SystemClock),
        Size::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
    )?;
    for key in keys {
        app.update(GalleryMessage::Key(key));
    }

    match app.view() {
        View::Detail { detail, related } => print_json(&DetailReport {
            position_label: detail.position_label(),
            related: related.into_iter().map(|record| &record.id).collect(),
            detail,
        }),
        View::NotFound(id) => anyhow::bail!("material not found: {id}"),
        View::Listing(_) | View::Loading => print_json(&RouteReport {
            route: app.route().path(),
        }),
    }
}
