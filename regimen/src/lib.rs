pub mod block;
pub mod history;
pub mod parser;
pub mod regime;
pub mod registry;
pub mod source;

use crate::history::History;
use crate::registry::{BlockRegistry, RegimeRegistry};

/// Everything parsed from one input file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Atomic units, in definition order.
    pub regimes: RegimeRegistry,
    /// Named and synthetic blocks, in registration order.
    pub blocks: BlockRegistry,
    /// The authoritative history (the last `#HIST` section), if any.
    pub history: Option<History>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
