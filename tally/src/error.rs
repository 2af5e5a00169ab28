use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateErrorKind {
    /// Totals were requested but the input has no `#HIST` section.
    MissingHistory,
    /// A history entry or block member names nothing that is defined.
    UndefinedReference(String),
    /// Expanding a block led back to the block itself. `path` runs from the
    /// first block on the cycle back to it.
    CyclicDefinition { name: String, path: Vec<String> },
    /// Blocks nest deeper than [`crate::MAX_DEPTH`].
    NestingTooDeep(String),
    /// A total no longer fits in a `u64`.
    CountOverflow(String),
}

impl fmt::Display for AggregateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateErrorKind::MissingHistory => write!(f, "no history found"),
            AggregateErrorKind::UndefinedReference(name) => {
                write!(f, "undefined reference: {}", name)
            }
            AggregateErrorKind::CyclicDefinition { name, path } => {
                write!(f, "cyclic definition of '{}': {}", name, path.join(" -> "))
            }
            AggregateErrorKind::NestingTooDeep(name) => {
                write!(
                    f,
                    "blocks nest more than {} levels deep below '{}'",
                    crate::MAX_DEPTH,
                    name
                )
            }
            AggregateErrorKind::CountOverflow(name) => {
                write!(f, "count overflow while expanding '{}'", name)
            }
        }
    }
}

/// An aggregation failure with the source location that triggered it.
#[derive(Debug, Clone)]
pub struct AggregateError {
    pub kind: AggregateErrorKind,
    pub span: Option<Range<usize>>,
    pub source_id: usize,
    pub notes: Vec<String>,
}

impl AggregateError {
    pub fn new(kind: AggregateErrorKind) -> Self {
        AggregateError {
            kind,
            span: None,
            source_id: 0,
            notes: Vec::new(),
        }
    }

    pub fn at(mut self, span: Range<usize>, source_id: usize) -> Self {
        self.span = Some(span);
        self.source_id = source_id;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            AggregateErrorKind::MissingHistory => 5,
            AggregateErrorKind::UndefinedReference(_) => 6,
            AggregateErrorKind::CyclicDefinition { .. } | AggregateErrorKind::NestingTooDeep(_) => 7,
            AggregateErrorKind::CountOverflow(_) => 8,
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for AggregateError {}
