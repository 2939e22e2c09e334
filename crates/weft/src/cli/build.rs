//! `weft build` command implementation.

use std::path::Path;
use std::time::Instant;

use colored::Colorize;
use weft::{DateRange, GraphKind, Weft};

/// Run the build command.
pub fn run(
    root: &Path,
    kind: GraphKind,
    threshold: u32,
    range: DateRange,
    use_cache: bool,
) -> Result<(), weft::Error> {
    println!(
        "{} {kind} graph (threshold {threshold}) in {}...",
        "Building".cyan().bold(),
        root.display()
    );

    let start = Instant::now();
    let weft = Weft::open(root)?;
    let log = weft.load_transfers(threshold, range)?;

    let graph = match kind {
        GraphKind::Unweighted => weft.build_unweighted(&log, threshold, range, use_cache)?,
        GraphKind::Weighted => weft.build_weighted(&log, threshold, range, use_cache)?,
    };

    println!();
    println!(
        "{} {} rows into {} vertices, {} edges",
        "Aggregated".green().bold(),
        log.len(),
        graph.vertex_count(),
        graph.edge_count()
    );
    if kind.is_weighted() {
        println!(
            "  {}: {:.6}",
            "Total edge weight".white().bold(),
            graph.total_weight()
        );
    }
    println!("{}: {:.2?}", "Duration".dimmed(), start.elapsed());

    if !use_cache {
        println!("{}", "Cache bypassed; nothing persisted".yellow());
    }

    Ok(())
}
