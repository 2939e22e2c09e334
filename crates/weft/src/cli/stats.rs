//! `weft stats` command implementation.

use std::path::Path;

use colored::Colorize;
use weft::{CacheKey, Config, DateRange, FsGraphStore, GraphKind, GraphStore};

use super::format_size;

/// Run the stats command.
pub fn run(
    root: &Path,
    kind: GraphKind,
    threshold: u32,
    range: DateRange,
) -> Result<(), weft::Error> {
    let config = Config::rooted_at(root);
    let store = FsGraphStore::open(&config.cache_dir)?;
    let key = CacheKey::new(kind, threshold, range);
    let path = store.artifact_path(&key);

    println!("{}", "Weft Cache Status".cyan().bold());
    println!();
    println!("  {}: {}", "Artifact".white().bold(), path.display());

    let size = match std::fs::metadata(&path) {
        Ok(meta) => Some(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(error = %e, "failed to stat artifact");
            None
        }
    };

    match size {
        None => {
            println!("  {}: {}", "Cached".white().bold(), "no".yellow());
            return Ok(());
        }
        Some(bytes) => {
            println!(
                "  {}: {} ({})",
                "Cached".white().bold(),
                "yes".green(),
                format_size(bytes)
            );
        }
    }

    match store.get(&key) {
        Ok(Some(graph)) => {
            println!(
                "  {}: {}",
                "Vertices".white().bold(),
                graph.vertex_count().to_string().green()
            );
            println!(
                "  {}: {}",
                "Edges".white().bold(),
                graph.edge_count().to_string().green()
            );
            if kind.is_weighted() {
                println!(
                    "  {}: {:.6}",
                    "Total edge weight".white().bold(),
                    graph.total_weight()
                );
            }
        }
        Ok(None) => {
            // Raced with a cache clear between stat and read.
            println!("  {}: {}", "Cached".white().bold(), "no".yellow());
        }
        Err(e) => {
            println!(
                "  {}: artifact unreadable, next build will replace it",
                "Warning".yellow().bold()
            );
            println!("    {}", e.to_string().dimmed());
        }
    }

    Ok(())
}
