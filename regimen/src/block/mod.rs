pub mod synthetic;

use std::ops::Range;

/// A named, weighted sequence of regime and block references.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The block name. Anonymous groups get a synthetic `parent/N` name.
    pub name: String,
    /// Description shared by every block produced from one definition line.
    pub description: String,
    /// Multiplier applied to this block's members whenever it is expanded.
    pub count: u64,
    /// Regime or block names, in expansion order.
    pub members: Vec<String>,
    /// Byte span in source for error reporting.
    pub span: Range<usize>,
}

impl Block {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        count: u64,
        members: Vec<String>,
        span: Range<usize>,
    ) -> Self {
        Block {
            name: name.into(),
            description: description.into(),
            count,
            members,
            span,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        synthetic::is_synthetic(&self.name)
    }
}
