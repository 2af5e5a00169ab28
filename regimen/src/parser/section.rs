//! Line routing between the `#regims`, `#blocks` and `#HIST` sections.

use std::ops::Range;

use crate::Catalog;
use crate::history::History;
use crate::parser::error::ParseError;
use crate::parser::line::split_definition;
use crate::parser::nested::NestedBlockParser;
use crate::parser::tokenizer::tokenize;
use crate::parser::{ParseOptions, Parsed};
use crate::regime::Regime;
use crate::registry::{DuplicatePolicy, RegistryError};

/// The section the dispatcher is currently reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    /// Before the first section header.
    #[default]
    None,
    Regimes,
    Blocks,
    History,
}

impl Section {
    pub const REGIMES_HEADER: &'static str = "#regims";
    pub const BLOCKS_HEADER: &'static str = "#blocks";
    pub const HISTORY_HEADER: &'static str = "#HIST";

    /// Recognize a section header by the first word of a line.
    pub fn from_header(line: &str) -> Option<Section> {
        match line.split_whitespace().next()? {
            Self::REGIMES_HEADER => Some(Section::Regimes),
            Self::BLOCKS_HEADER => Some(Section::Blocks),
            Self::HISTORY_HEADER => Some(Section::History),
            _ => None,
        }
    }
}

/// Feeds lines one by one into the parser for the active section,
/// registering what they define.
pub struct Dispatcher {
    section: Section,
    catalog: Catalog,
    options: ParseOptions,
    /// The `#HIST` section being read, committed when the section ends.
    open_history: Option<History>,
    diagnostics: Vec<ParseError>,
}

impl Dispatcher {
    pub fn new(file_id: usize, options: ParseOptions) -> Self {
        Dispatcher {
            section: Section::None,
            catalog: Catalog {
                source_id: file_id,
                ..Catalog::default()
            },
            options,
            open_history: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Process one line (without its line terminator) starting at byte `offset`.
    pub fn feed(&mut self, line: &str, offset: usize) {
        if line.trim().is_empty() {
            return;
        }
        let span = offset..offset + line.len();

        if let Some(next) = Section::from_header(line) {
            self.enter(next, span);
            return;
        }

        let result = match self.section {
            Section::None => {
                self.diagnostics.push(
                    ParseError::warning("line outside any section", span, self.file_id())
                        .with_note("start a section with `#regims`, `#blocks` or `#HIST`"),
                );
                Ok(())
            }
            Section::Regimes => self.regime_line(line, offset),
            Section::Blocks => self.block_line(line, offset),
            Section::History => self.history_line(line, offset),
        };

        if let Err(error) = result {
            self.diagnostics.push(error);
        }
    }

    /// End of input: commit any open history and hand back everything parsed.
    pub fn finish(mut self) -> Parsed {
        self.commit_history();
        Parsed {
            catalog: self.catalog,
            diagnostics: self.diagnostics,
        }
    }

    fn file_id(&self) -> usize {
        self.catalog.source_id
    }

    fn enter(&mut self, next: Section, span: Range<usize>) {
        self.commit_history();
        if next == Section::History {
            self.open_history = Some(History::new(span));
        }
        self.section = next;
    }

    fn commit_history(&mut self) {
        let Some(history) = self.open_history.take() else {
            return;
        };
        if history.is_empty() {
            self.diagnostics.push(ParseError::warning(
                "empty history section",
                history.span,
                self.file_id(),
            ));
            return;
        }
        if let Some(previous) = &self.catalog.history {
            self.diagnostics.push(
                ParseError::warning(
                    "this history replaces an earlier one",
                    history.span.clone(),
                    self.file_id(),
                )
                .with_note(format!(
                    "the earlier history had {} entries; only the last `#HIST` section is counted",
                    previous.len()
                )),
            );
        }
        self.catalog.history = Some(history);
    }

    fn regime_line(&mut self, line: &str, offset: usize) -> Result<(), ParseError> {
        let file_id = self.file_id();
        let def = split_definition(line, offset, file_id)?;
        let leftover = def.members.trim();
        if !leftover.is_empty() {
            let start = def.members_offset + (def.members.len() - def.members.trim_start().len());
            self.diagnostics.push(ParseError::warning(
                "text after a regime definition is ignored",
                start..start + leftover.len(),
                file_id,
            ));
        }
        if self.catalog.blocks.contains(def.name) {
            self.diagnostics.push(self.shadow_warning(def.name, def.name_span.clone()));
        }

        let regime = Regime::new(def.name, def.description, offset..offset + line.len());
        match self.catalog.regimes.insert(regime, self.options.duplicates) {
            Ok(None) => Ok(()),
            Ok(Some(_)) => {
                self.diagnostics
                    .push(replaced_warning(def.name, def.name_span, file_id));
                Ok(())
            }
            Err(error) => Err(registry_error(error, def.name_span, file_id)),
        }
    }

    fn block_line(&mut self, line: &str, offset: usize) -> Result<(), ParseError> {
        let file_id = self.file_id();
        let policy = self.options.duplicates;
        let def = split_definition(line, offset, file_id)?;

        // Reject up front so no synthetic blocks are left behind.
        if policy == DuplicatePolicy::Reject && self.catalog.blocks.contains(def.name) {
            return Err(ParseError::duplicate(def.name, def.name_span, file_id));
        }
        if self.catalog.regimes.contains(def.name) {
            self.diagnostics.push(self.shadow_warning(def.name, def.name_span.clone()));
        }

        let parsed = NestedBlockParser::new(
            def.name,
            def.description,
            offset..offset + line.len(),
            file_id,
            &self.catalog.blocks,
        )
        .parse(tokenize(def.members, def.members_offset))?;

        let mut replaced = false;
        for block in parsed.into_blocks() {
            let span = block.span.clone();
            replaced |= self
                .catalog
                .blocks
                .insert(block, policy)
                .map_err(|e| registry_error(e, span, file_id))?
                .is_some();
        }
        if replaced {
            self.diagnostics
                .push(replaced_warning(def.name, def.name_span, file_id));
        }
        Ok(())
    }

    /// Either bare block names, or `label "description" names...` where
    /// only the names after the description are entries.
    fn history_line(&mut self, line: &str, offset: usize) -> Result<(), ParseError> {
        let (entries, entries_offset) = if line.contains('"') {
            let def = split_definition(line, offset, self.file_id())?;
            (def.members, def.members_offset)
        } else {
            (line, offset)
        };
        let history = self
            .open_history
            .get_or_insert_with(|| History::new(offset..offset));
        for word in entries.split_whitespace() {
            // `word` is a subslice of `entries`.
            let start = entries_offset + (word.as_ptr() as usize - entries.as_ptr() as usize);
            history.push(word, start..start + word.len());
        }
        Ok(())
    }

    fn shadow_warning(&self, name: &str, span: Range<usize>) -> ParseError {
        ParseError::warning(
            format!("'{}' is defined both as a regime and as a block", name),
            span,
            self.file_id(),
        )
        .with_note("references to this name count the regime")
    }
}

fn replaced_warning(name: &str, span: Range<usize>, file_id: usize) -> ParseError {
    ParseError::warning(format!("'{}' redefined; the later definition wins", name), span, file_id)
}

fn registry_error(error: RegistryError, span: Range<usize>, file_id: usize) -> ParseError {
    match error {
        RegistryError::DuplicateName(name) => ParseError::duplicate(&name, span, file_id),
        RegistryError::UndefinedReference(name) => {
            ParseError::syntax(format!("undefined reference: {}", name), span, file_id)
        }
    }
}
