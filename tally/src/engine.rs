//! Expands blocks into per-regime totals.

use std::collections::HashMap;

use regimen::Catalog;
use regimen::block::Block;
use regimen::history::History;
use regimen::registry::{BlockRegistry, RegimeRegistry};

use crate::error::{AggregateError, AggregateErrorKind};
use crate::totals::Totals;

/// Deepest chain of block references that will be followed.
pub const MAX_DEPTH: usize = 256;

/// Total regime occurrences for one expansion of `block`.
pub fn expand(
    block: &Block,
    blocks: &BlockRegistry,
    regimes: &RegimeRegistry,
) -> Result<Totals, AggregateError> {
    Expander::new(blocks, regimes, 0).expand(block)
}

/// Total regime occurrences over every entry of `history`, in order.
pub fn sum_history(
    history: &History,
    blocks: &BlockRegistry,
    regimes: &RegimeRegistry,
) -> Result<Totals, AggregateError> {
    sum_entries(history, blocks, regimes, 0)
}

/// Totals for the catalog's history.
pub fn summarize(catalog: &Catalog) -> Result<Totals, AggregateError> {
    let history = catalog.history.as_ref().ok_or_else(|| {
        AggregateError::new(AggregateErrorKind::MissingHistory)
            .with_note("add a `#HIST` section listing the blocks that were used")
    })?;
    sum_entries(history, &catalog.blocks, &catalog.regimes, catalog.source_id)
}

fn sum_entries(
    history: &History,
    blocks: &BlockRegistry,
    regimes: &RegimeRegistry,
    source_id: usize,
) -> Result<Totals, AggregateError> {
    let mut expander = Expander::new(blocks, regimes, source_id);
    let mut result = Totals::zeroed(regimes);
    for entry in &history.entries {
        let block = blocks.get(&entry.name).map_err(|_| {
            AggregateError::new(AggregateErrorKind::UndefinedReference(entry.name.clone()))
                .at(entry.span.clone(), source_id)
                .with_note("history entries must name a block from the `#blocks` section")
        })?;
        let totals = expander.expand(block)?;
        result.add_scaled(&totals, 1).ok_or_else(|| {
            AggregateError::new(AggregateErrorKind::CountOverflow(entry.name.clone()))
                .at(entry.span.clone(), source_id)
        })?;
    }
    Ok(result)
}

struct Expander<'a> {
    blocks: &'a BlockRegistry,
    regimes: &'a RegimeRegistry,
    source_id: usize,
    /// Blocks currently being expanded, outermost first.
    in_progress: Vec<&'a str>,
    /// Finished expansions; a block shared by many parents is walked once.
    done: HashMap<&'a str, Totals>,
}

impl<'a> Expander<'a> {
    fn new(blocks: &'a BlockRegistry, regimes: &'a RegimeRegistry, source_id: usize) -> Self {
        Expander {
            blocks,
            regimes,
            source_id,
            in_progress: Vec::new(),
            done: HashMap::new(),
        }
    }

    fn expand(&mut self, block: &'a Block) -> Result<Totals, AggregateError> {
        if let Some(totals) = self.done.get(block.name.as_str()) {
            return Ok(totals.clone());
        }
        if let Some(start) = self.in_progress.iter().position(|n| *n == block.name) {
            let mut path: Vec<String> =
                self.in_progress[start..].iter().map(|n| n.to_string()).collect();
            path.push(block.name.clone());
            return Err(AggregateError::new(AggregateErrorKind::CyclicDefinition {
                name: block.name.clone(),
                path,
            })
            .at(block.span.clone(), self.source_id));
        }
        if self.in_progress.len() >= MAX_DEPTH {
            return Err(
                AggregateError::new(AggregateErrorKind::NestingTooDeep(block.name.clone()))
                    .at(block.span.clone(), self.source_id),
            );
        }

        self.in_progress.push(&block.name);
        let result = self.expand_members(block);
        self.in_progress.pop();

        let totals = result?;
        self.done.insert(&block.name, totals.clone());
        Ok(totals)
    }

    fn expand_members(&mut self, block: &'a Block) -> Result<Totals, AggregateError> {
        let source_id = self.source_id;
        let overflow = || {
            AggregateError::new(AggregateErrorKind::CountOverflow(block.name.clone()))
                .at(block.span.clone(), source_id)
        };

        let mut result = Totals::zeroed(self.regimes);
        for member in &block.members {
            // Regimes shadow blocks of the same name.
            if self.blocks.resolve_leaf(member, self.regimes).is_some() {
                result.add(member, block.count).ok_or_else(overflow)?;
            } else if let Ok(child) = self.blocks.get(member) {
                let totals = self.expand(child)?;
                result.add_scaled(&totals, block.count).ok_or_else(overflow)?;
            } else {
                return Err(AggregateError::new(AggregateErrorKind::UndefinedReference(
                    member.clone(),
                ))
                .at(block.span.clone(), source_id)
                .with_note(format!("referenced from block '{}'", block.name)));
            }
        }
        Ok(result)
    }
}
