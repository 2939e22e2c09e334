//! `weft check` command implementation.

use std::path::Path;

use colored::Colorize;
use weft::{Config, Error, Transfer};
use weft_jsonl::read_jsonl_file_resilient;

/// Run the check command: scan a table tolerantly and report what a strict
/// load would reject.
pub fn run(root: &Path, threshold: u32) -> Result<(), weft::Error> {
    let config = Config::rooted_at(root);
    let path = config.table_path(threshold);
    if !path.exists() {
        return Err(Error::TableNotFound { threshold, path });
    }

    println!("{} {}...", "Checking".cyan().bold(), path.display());

    let (rows, warnings): (Vec<Transfer>, _) =
        read_jsonl_file_resilient(&path).map_err(|e| match e {
            weft_jsonl::Error::Io(io) => Error::Io(io),
            other => Error::MalformedTable {
                path: path.clone(),
                line: 0,
                reason: other.to_string(),
            },
        })?;

    println!();
    println!(
        "{} {} parseable rows",
        "Found".green().bold(),
        rows.len()
    );

    if let (Some(first), Some(last)) = (
        rows.iter().map(|t| t.date).min(),
        rows.iter().map(|t| t.date).max(),
    ) {
        println!(
            "  {}: {} .. {}",
            "Date span".white().bold(),
            first.date_naive(),
            last.date_naive()
        );
    }

    let self_transfers = rows.iter().filter(|t| t.is_self_transfer()).count();
    if self_transfers > 0 {
        println!(
            "  {}: {} self-transfer{} (will become self-loops)",
            "Note".white().bold(),
            self_transfers,
            if self_transfers == 1 { "" } else { "s" }
        );
    }

    if warnings.is_empty() {
        println!("{}", "Table is clean; a strict load will succeed".green());
    } else {
        println!();
        println!(
            "{} ({}): a strict load will stop at the first of these",
            "Problem lines".red().bold(),
            warnings.len()
        );
        for warning in warnings.iter().take(5) {
            println!("  {} {warning}", "•".red());
        }
        if warnings.len() > 5 {
            println!("  ... and {} more", warnings.len() - 5);
        }
    }

    Ok(())
}
