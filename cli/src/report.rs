use std::io::{self, Write};

use regimen::Catalog;
use tally::Totals;

/// One line per regime, in definition order: name, description, total.
pub fn write_table(out: &mut dyn Write, catalog: &Catalog, totals: &Totals) -> io::Result<()> {
    for regime in catalog.regimes.iter() {
        writeln!(
            out,
            "{:>6} : {:^20} : {:<7}",
            regime.name,
            regime.description.trim(),
            totals.get(&regime.name)
        )?;
    }
    Ok(())
}

/// Dump what was parsed, including the synthetic blocks made for groups.
pub fn write_listing(out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
    writeln!(out, "regimes:")?;
    for regime in catalog.regimes.iter() {
        if regime.description.trim().is_empty() {
            writeln!(out, "  {}", regime.name)?;
        } else {
            writeln!(out, "  {} \"{}\"", regime.name, regime.description.trim())?;
        }
    }

    writeln!(out, "blocks:")?;
    for block in catalog.blocks.iter() {
        let marker = if block.is_synthetic() { " (group)" } else { "" };
        writeln!(
            out,
            "  {}{} x{}: {}",
            block.name,
            marker,
            block.count,
            block.members.join(" ")
        )?;
    }

    match &catalog.history {
        Some(history) => {
            let names: Vec<&str> = history.names().collect();
            writeln!(out, "history: {}", names.join(" "))?;
        }
        None => writeln!(out, "history: (none)")?,
    }
    Ok(())
}
