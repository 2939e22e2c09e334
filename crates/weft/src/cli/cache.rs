//! `weft cache` subcommand implementations.

use std::path::Path;

use colored::Colorize;
use weft::{Config, FsGraphStore};

use super::format_size;

/// Run `weft cache list`.
pub fn run_list(root: &Path) -> Result<(), weft::Error> {
    let config = Config::rooted_at(root);
    let store = FsGraphStore::open(&config.cache_dir)?;
    let artifacts = store.list()?;

    println!(
        "{} ({})",
        "Cached graph artifacts".cyan().bold(),
        store.cache_dir().display()
    );
    println!();

    if artifacts.is_empty() {
        println!("  {}", "none".dimmed());
        return Ok(());
    }

    for path in artifacts {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        println!("  {} ({})", name, format_size(size).dimmed());
    }

    Ok(())
}

/// Run `weft cache clear`.
pub fn run_clear(root: &Path) -> Result<(), weft::Error> {
    let config = Config::rooted_at(root);
    let store = FsGraphStore::open(&config.cache_dir)?;
    let removed = store.clear()?;

    println!(
        "{} {} artifact{}",
        "Removed".green().bold(),
        removed,
        if removed == 1 { "" } else { "s" }
    );

    Ok(())
}
