use std::ops::Range;

/// One block reference inside a `#HIST` section.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub name: String,
    pub span: Range<usize>,
}

/// An ordered list of block references describing one observed session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
    /// Span of the `#HIST` header that opened this history.
    pub span: Range<usize>,
}

impl History {
    pub fn new(span: Range<usize>) -> Self {
        History {
            entries: Vec::new(),
            span,
        }
    }

    pub fn push(&mut self, name: impl Into<String>, span: Range<usize>) {
        self.entries.push(HistoryEntry {
            name: name.into(),
            span,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}
