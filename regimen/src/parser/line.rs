use std::ops::Range;

use crate::parser::error::ParseError;

/// A definition line split into its three parts:
/// `name ["description"] members...`
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionLine<'a> {
    pub name: &'a str,
    pub name_span: Range<usize>,
    pub description: &'a str,
    /// Raw member list text. Empty for regime lines.
    pub members: &'a str,
    /// Absolute byte offset of `members` in the source.
    pub members_offset: usize,
}

/// Split `line` (starting at byte `offset` of file `file_id`) into name,
/// description and member list.
pub fn split_definition(
    line: &str,
    offset: usize,
    file_id: usize,
) -> Result<DefinitionLine<'_>, ParseError> {
    let line_span = offset..offset + line.len();

    let (head, description, members_start) = match line.find('"') {
        Some(open) => {
            let rest = &line[open + 1..];
            let close = rest.find('"').ok_or_else(|| {
                ParseError::syntax(
                    "unterminated description",
                    offset + open..offset + line.len(),
                    file_id,
                )
                .with_note("descriptions are written between two `\"` characters")
            })?;
            let description = &rest[..close];
            (&line[..open], description, open + 1 + close + 1)
        }
        None => {
            let trimmed = line.trim_start();
            let lead = line.len() - trimmed.len();
            let end = trimmed
                .find(char::is_whitespace)
                .map(|i| lead + i)
                .unwrap_or(line.len());
            (&line[..end], "", end)
        }
    };

    let name = head.trim();
    if name.is_empty() {
        return Err(ParseError::syntax("definition has no name", line_span, file_id));
    }
    let name_start = offset + (head.len() - head.trim_start().len());
    let name_span = name_start..name_start + name.len();
    if name.contains(char::is_whitespace) {
        return Err(ParseError::syntax(
            format!("'{}' is not a single word", name),
            name_span,
            file_id,
        )
        .with_note("put the description in quotes after the name"));
    }

    Ok(DefinitionLine {
        name,
        name_span,
        description,
        members: &line[members_start..],
        members_offset: offset + members_start,
    })
}
