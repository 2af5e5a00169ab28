pub mod error;
pub mod line;
pub mod nested;
pub mod section;
pub mod tokenizer;

pub use error::{ParseError, ParseErrorKind};

use crate::Catalog;
use crate::parser::section::Dispatcher;
use crate::registry::DuplicatePolicy;

/// Knobs for how definitions are registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub duplicates: DuplicatePolicy,
}

/// The catalog built from a file, plus every problem found on the way.
/// Lines that failed are skipped; the rest of the file is still parsed.
#[derive(Debug)]
pub struct Parsed {
    pub catalog: Catalog,
    pub diagnostics: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.is_warning())
    }

    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.diagnostics.iter().filter(|d| !d.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ParseError> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// The catalog if no line failed, otherwise the errors.
    pub fn into_result(self) -> Result<Catalog, Vec<ParseError>> {
        if self.has_errors() {
            Err(self.diagnostics.into_iter().filter(|d| !d.is_warning()).collect())
        } else {
            Ok(self.catalog)
        }
    }
}

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    options: ParseOptions,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the whole source, line by line.
    pub fn parse(&self) -> Parsed {
        let mut dispatcher = Dispatcher::new(self.file_id, self.options);
        let mut offset = 0;
        for raw in self.source.split_inclusive('\n') {
            let line = raw
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(raw);
            dispatcher.feed(line, offset);
            offset += raw.len();
        }
        dispatcher.finish()
    }
}
