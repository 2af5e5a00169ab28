use std::ops::Range;

/// An atomic unit: the thing whose occurrences are counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Regime {
    pub name: String,
    /// Free text between the quotes of the definition line. May be empty.
    pub description: String,
    /// Byte span of the definition line in source.
    pub span: Range<usize>,
}

impl Regime {
    pub fn new(name: impl Into<String>, description: impl Into<String>, span: Range<usize>) -> Self {
        Regime {
            name: name.into(),
            description: description.into(),
            span,
        }
    }
}
