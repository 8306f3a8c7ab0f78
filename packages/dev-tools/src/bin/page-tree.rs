//! Page Tree Inspector
//!
//! Loads a JSON dump of page rows into the in-memory store, prints the
//! derived forest, and optionally replays one drag-and-drop move against it.
//!
//! # Usage
//!
//! ```bash
//! # Print the forest
//! cargo run --bin page-tree -- pages.json
//!
//! # Drop page A before page B, then print the result
//! cargo run --bin page-tree -- pages.json A B before
//!
//! # Drop page A on the empty canvas
//! cargo run --bin page-tree -- pages.json A root
//! ```
//!
//! # Environment Variables
//!
//! - `PAGESPACE_PAGES`: Pages file when no path argument is given
//! - `PAGESPACE_USER`: User whose pages are shown (default: the first row's owner)
//! - `PAGESPACE_CONFIG`: Config file (default: `~/.pagespace/config.json`)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use pagespace_core::db::InMemoryPageStore;
use pagespace_core::{DropOutcome, DropZone, Page, PageTreeEngine, PageTreeNode, WorkspaceConfig};

/// Row height used to turn a zone into a pointer offset
const ROW_HEIGHT: f64 = 40.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);

    let pages_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => env::var("PAGESPACE_PAGES")
            .map(PathBuf::from)
            .context("Usage: page-tree <pages.json> [dragged target|root [before|after|inner]]")?,
    };

    let config = WorkspaceConfig::load_or_default(&config_path()?).await?;

    let contents = tokio::fs::read_to_string(&pages_path)
        .await
        .with_context(|| format!("Failed to read {}", pages_path.display()))?;
    let pages: Vec<Page> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", pages_path.display()))?;

    let user_id = match env::var("PAGESPACE_USER") {
        Ok(user_id) => user_id,
        Err(_) => pages
            .first()
            .map(|page| page.user_id.clone())
            .unwrap_or_default(),
    };

    tracing::info!("📦 Loaded {} rows from {}", pages.len(), pages_path.display());

    let store = Arc::new(InMemoryPageStore::with_pages(pages));
    let mut engine = PageTreeEngine::new(store, config);
    engine.refresh(&user_id).await?;

    // Show everything
    let ids: Vec<String> = engine.pages().iter().map(|page| page.id.clone()).collect();
    for id in &ids {
        engine.expand(id);
    }

    print_forest(&engine.forest());

    let Some(dragged) = args.next() else {
        return Ok(());
    };
    let target = args
        .next()
        .context("A move needs a target page id or 'root'")?;
    let zone = match args.next().as_deref() {
        None | Some("inner") => DropZone::Inner,
        Some("before") => DropZone::Before,
        Some("after") => DropZone::After,
        Some(other) => anyhow::bail!("Unknown drop zone '{}'", other),
    };

    engine.start_drag(&dragged);
    let outcome = if target == "root" {
        engine.hover_root();
        engine.commit_drop(None)
    } else {
        let offset = zone_offset(zone, engine.config().drop_edge_fraction);
        engine.hover_drop(&target, offset, ROW_HEIGHT);
        engine.commit_drop(Some(&target))
    };

    match outcome {
        DropOutcome::Moved(command) => {
            println!();
            println!(
                "moved {} -> parent {:?} at {} (sequence {})",
                command.page_id, command.parent_id, command.position, command.sequence
            );
            let report = engine.settle().await;
            if !report.failed.is_empty() {
                tracing::warn!("Writes failed for {:?}", report.failed);
            }
            println!();
            print_forest(&engine.forest());
        }
        DropOutcome::Rejected(reason) => {
            println!();
            println!("drop rejected: {}", reason);
        }
    }

    Ok(())
}

fn config_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = env::var("PAGESPACE_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
    Ok(home_dir.join(".pagespace").join("config.json"))
}

/// Pointer offset in the middle of `zone`'s band for the configured edge fraction
fn zone_offset(zone: DropZone, edge_fraction: f64) -> f64 {
    let edge = ROW_HEIGHT * edge_fraction;
    match zone {
        DropZone::Before => edge / 2.0,
        DropZone::Inner => ROW_HEIGHT / 2.0,
        DropZone::After => ROW_HEIGHT - edge / 2.0,
    }
}

fn print_forest(forest: &[PageTreeNode]) {
    for node in forest {
        print_node(node, 0);
    }
}

fn print_node(node: &PageTreeNode, depth: usize) {
    println!(
        "{}{} [{}] @ {}",
        "  ".repeat(depth),
        node.page.display_title(),
        node.page.id,
        node.page.position
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
