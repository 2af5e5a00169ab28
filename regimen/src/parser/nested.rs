//! Turns a member-list token stream into block definitions.
//!
//! Every `( ... )` group becomes its own block with a synthetic name, and
//! the group's name takes its place in the enclosing member list. A count
//! directly after `)` is that group's multiplier.

use std::ops::Range;

use crate::block::{Block, synthetic};
use crate::parser::error::ParseError;
use crate::parser::tokenizer::{Token, TokenKind};
use crate::registry::BlockRegistry;

/// The blocks produced by one definition line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    /// The block registered under the line's own name.
    pub top: Block,
    /// Synthetic group blocks, innermost groups first.
    pub nested: Vec<Block>,
}

impl ParsedBlock {
    /// All blocks in the order they should be registered.
    pub fn into_blocks(self) -> impl Iterator<Item = Block> {
        self.nested.into_iter().chain(std::iter::once(self.top))
    }
}

/// A member list under construction. Finished frames are moved out whole.
#[derive(Debug)]
struct Frame {
    name: String,
    members: Vec<String>,
    /// Span of the `(` that opened this frame, or of the definition for the root.
    open_span: Range<usize>,
}

pub struct NestedBlockParser<'r> {
    name: String,
    description: String,
    span: Range<usize>,
    file_id: usize,
    /// Consulted read-only, so that synthetic names never collide.
    registry: &'r BlockRegistry,
    frames: Vec<Frame>,
    /// A closed group waiting to see whether a count follows.
    pending: Option<Frame>,
    groups_closed: usize,
    staged: Vec<Block>,
}

impl<'r> NestedBlockParser<'r> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        span: Range<usize>,
        file_id: usize,
        registry: &'r BlockRegistry,
    ) -> Self {
        let name = name.into();
        NestedBlockParser {
            frames: vec![Frame {
                name: name.clone(),
                members: Vec::new(),
                open_span: span.clone(),
            }],
            name,
            description: description.into(),
            span,
            file_id,
            registry,
            pending: None,
            groups_closed: 0,
            staged: Vec::new(),
        }
    }

    /// Consume `tokens` and build the definition. Nothing is registered;
    /// the caller inserts the returned blocks.
    pub fn parse<'t>(
        mut self,
        tokens: impl IntoIterator<Item = Token<'t>>,
    ) -> Result<ParsedBlock, ParseError> {
        for token in tokens {
            if let Some(group) = self.pending.take() {
                if token.kind == TokenKind::CountUnit {
                    let count = self.parse_count(&token)?;
                    self.stage(group, count, token.span.end);
                    continue;
                }
                let end = group.open_span.end;
                self.stage(group, 1, end);
            }

            match token.kind {
                TokenKind::OpenBracket => self.open_group(token.span),
                TokenKind::CloseBracket => self.close_group(token.span)?,
                TokenKind::RegimeUnit => self.current().members.push(token.text.to_string()),
                TokenKind::CountUnit => {
                    return Err(ParseError::syntax(
                        format!("unexpected count '{}'", token.text),
                        token.span,
                        self.file_id,
                    )
                    .with_note("a count can only follow a closing bracket, as in `(run walk) 2`"));
                }
            }
        }

        if let Some(group) = self.pending.take() {
            let end = group.open_span.end;
            self.stage(group, 1, end);
        }

        if self.depth() != 0 {
            let open = self.current().open_span.clone();
            return Err(ParseError::syntax("unclosed `(`", open, self.file_id)
                .with_note("every `(` needs a matching `)` on the same line"));
        }

        let root = self.frames.pop().ok_or_else(|| {
            ParseError::syntax("bracket stack is empty", self.span.clone(), self.file_id)
        })?;

        // `name (a b) 3` is the group itself, not a block wrapping it.
        if self.groups_closed == 1 && root.members.len() == 1 && self.staged.len() == 1 {
            if let Some(mut only) = self.staged.pop() {
                only.name = self.name;
                only.span = self.span;
                return Ok(ParsedBlock {
                    top: only,
                    nested: Vec::new(),
                });
            }
        }

        Ok(ParsedBlock {
            top: Block::new(self.name, self.description, 1, root.members, self.span),
            nested: self.staged,
        })
    }

    fn depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    fn current(&mut self) -> &mut Frame {
        // The root frame is only popped once all tokens are consumed.
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn open_group(&mut self, span: Range<usize>) {
        let parent = self.frames.last().map_or(self.name.as_str(), |f| f.name.as_str());
        let name = synthetic::fresh(parent, |candidate| {
            self.registry.contains(candidate) || self.staged.iter().any(|b| b.name == candidate)
        });
        self.frames.push(Frame {
            name,
            members: Vec::new(),
            open_span: span,
        });
    }

    fn close_group(&mut self, span: Range<usize>) -> Result<(), ParseError> {
        if self.depth() == 0 {
            return Err(ParseError::syntax("unmatched `)`", span, self.file_id));
        }
        let mut group = self.frames.pop().ok_or_else(|| {
            ParseError::syntax("unmatched `)`", span.clone(), self.file_id)
        })?;
        self.current().members.push(group.name.clone());
        group.open_span = group.open_span.start..span.end;
        self.groups_closed += 1;
        self.pending = Some(group);
        Ok(())
    }

    fn parse_count(&self, token: &Token<'_>) -> Result<u64, ParseError> {
        token.text.parse().map_err(|_| {
            ParseError::syntax(
                format!("count '{}' is too large", token.text),
                token.span.clone(),
                self.file_id,
            )
        })
    }

    fn stage(&mut self, group: Frame, count: u64, end: usize) {
        self.staged.push(Block::new(
            group.name,
            self.description.clone(),
            count,
            group.members,
            group.open_span.start..end,
        ));
    }
}
