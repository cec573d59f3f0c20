//! Grammar rules for MBUI XML documents.
//!
//! The combinators in [`crate::lexer`] recognise single tokens; this module
//! drives them over a stack of open elements and builds the descriptor tree
//! while it goes, so parents are always allocated before their children.

use indexmap::IndexMap;
use mbui_core::{
    ast::{DescriptorTree, NodeId, Span},
    ParseError,
};

use crate::lexer::*;

/// Deepest element nesting a document may use. The root element is at depth 1.
pub const MAX_DEPTH: usize = 256;

/// Parse a complete MBUI document.
pub fn parse(input: &str) -> Result<DescriptorTree, ParseError> {
    Parser::new(input).parse_document()
}

/// Stateful parser that tracks the source for position reporting.
struct Parser<'a> {
    source: &'a str,
    /// Byte offset of the first character of every line.
    line_starts: Vec<usize>,
    tree: DescriptorTree,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(newline, _)| newline + 1))
            .collect();
        Self {
            source,
            line_starts,
            tree: DescriptorTree::new(),
        }
    }

    /// Byte offset of a slice borrowed from the source.
    fn offset(&self, slice: &str) -> usize {
        slice.as_ptr() as usize - self.source.as_ptr() as usize
    }

    /// 1-based line and column of a byte offset.
    fn line_column(&self, offset: usize) -> (u32, u32) {
        // line_starts[0] is 0, so the partition point is at least 1.
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        (line as u32, column as u32)
    }

    fn span(&self, start: &str, end: &str) -> Span {
        let start = self.offset(start);
        let (line, column) = self.line_column(start);
        Span {
            start,
            end: self.offset(end),
            line,
            column,
        }
    }

    fn unexpected(&self, at: &str, expected: &str) -> ParseError {
        if at.is_empty() {
            return ParseError::UnexpectedEof;
        }
        let (line, column) = self.line_column(self.offset(at));
        ParseError::UnexpectedToken {
            found: at.chars().take(20).collect(),
            expected: expected.to_string(),
            line,
            column,
        }
    }

    fn unescape<'s>(&self, raw: &'s str) -> Result<std::borrow::Cow<'s, str>, ParseError> {
        unescape(raw).map_err(|(at, name)| {
            let (line, column) = self.line_column(self.offset(raw) + at);
            ParseError::UnknownEntity { name, line, column }
        })
    }

    /// Parse the full document.
    fn parse_document(mut self) -> Result<DescriptorTree, ParseError> {
        let (rest, ()) = misc(self.source).map_err(|_| self.unexpected(self.source, "prolog"))?;
        if rest.is_empty() {
            return Err(ParseError::NoRootElement);
        }
        if !rest.starts_with('<') {
            return Err(self.unexpected(rest, "root element"));
        }

        let rest = self.parse_root(rest)?;
        let (rest, ()) = misc(rest).map_err(|_| self.unexpected(rest, "end of document"))?;
        if !rest.is_empty() {
            let (line, column) = self.line_column(self.offset(rest));
            return Err(ParseError::TrailingContent { line, column });
        }

        Ok(self.tree)
    }

    /// Parse the root element and everything inside it, returning the
    /// remaining input.
    fn parse_root(&mut self, input: &'a str) -> Result<&'a str, ParseError> {
        // Elements whose closing tag is still pending, innermost last.
        let mut open: Vec<(NodeId, &'a str)> = Vec::new();
        let mut rest = self.open_element(input, &mut open)?;

        while let Some(&(id, name)) = open.last() {
            if rest.is_empty() {
                return Err(ParseError::UnexpectedEof);
            }

            if rest.starts_with("</") {
                let (after, closing) =
                    end_tag(rest).map_err(|_| self.unexpected(rest, "closing tag"))?;
                if closing != name {
                    let (line, column) = self.line_column(self.offset(rest));
                    return Err(ParseError::MismatchedTag {
                        expected: name.to_string(),
                        found: closing.to_string(),
                        line,
                        column,
                    });
                }
                let end = self.offset(after);
                if let Some(node) = self.tree.node_mut(id) {
                    node.span.end = end;
                }
                open.pop();
                rest = after;
                continue;
            }

            if let Ok((after, ())) = comment(rest) {
                rest = after;
                continue;
            }

            if let Ok((after, ())) = processing_instruction(rest) {
                rest = after;
                continue;
            }

            if let Ok((after, data)) = cdata(rest) {
                if !data.is_empty() {
                    let span = self.span(rest, after);
                    self.tree.add_text(id, data, span);
                }
                rest = after;
                continue;
            }

            if rest.starts_with('<') {
                rest = self.open_element(rest, &mut open)?;
                continue;
            }

            let (after, raw) =
                char_data(rest).map_err(|_| self.unexpected(rest, "character data"))?;
            // Whitespace between elements carries no content.
            if !raw.trim().is_empty() {
                let text = self.unescape(raw)?.into_owned();
                let span = self.span(rest, after);
                self.tree.add_text(id, text, span);
            }
            rest = after;
        }

        Ok(rest)
    }

    /// Parse a start tag as a child of the innermost open element. Elements
    /// that are not self-closing are pushed onto `open`.
    fn open_element(
        &mut self,
        input: &'a str,
        open: &mut Vec<(NodeId, &'a str)>,
    ) -> Result<&'a str, ParseError> {
        let (rest, start) = start_tag(input).map_err(|_| self.unexpected(input, "start tag"))?;

        if open.len() >= MAX_DEPTH {
            let (line, column) = self.line_column(self.offset(input));
            return Err(ParseError::NestingTooDeep {
                limit: MAX_DEPTH,
                line,
                column,
            });
        }

        let mut attributes = IndexMap::new();
        for (name, raw) in &start.attributes {
            let value = self.unescape(raw)?.into_owned();
            if attributes.insert(name.to_string(), value).is_some() {
                let (line, column) = self.line_column(self.offset(name));
                return Err(ParseError::DuplicateAttribute {
                    name: name.to_string(),
                    line,
                    column,
                });
            }
        }

        let span = self.span(input, rest);
        let parent = open.last().map(|&(parent, _)| parent);
        let id = self.tree.add_element(parent, start.name, attributes, span);
        if !start.self_closing {
            open.push((id, start.name));
        }
        Ok(rest)
    }
}
