//! Configuration tree builder
//!
//! Recursive descent over classified lines: one `parse_children` call per
//! open block, so the call stack mirrors the `{`/`}` nesting of the input.
//! Lines are pulled from a [`LineSource`] one at a time; the parser never
//! reads past the line it is working on.

use crate::options::ParseOptions;
use crate::parser::ast::*;
use crate::parser::lexer::{LineComponents, LineKind};
use std::convert::Infallible;
use std::io::BufRead;
use std::ops::Range;
use thiserror::Error;

/// Parser error with the position it was raised at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("On line {line}{} (char {character}): {message}", column_suffix(.column))]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    /// 0-based byte column on the line, or [`ParseError::NO_COLUMN`]
    pub column: usize,
    /// Byte offset into the whole input
    pub character: usize,
    /// User-readable description of the problem
    pub message: String,
}

fn column_suffix(column: &usize) -> String {
    if *column == ParseError::NO_COLUMN {
        String::new()
    } else {
        format!(" column {}", column)
    }
}

impl ParseError {
    /// Column used when a problem has no specific column, such as EOF.
    pub const NO_COLUMN: usize = usize::MAX;

    pub fn has_column(&self) -> bool {
        self.column != Self::NO_COLUMN
    }

    /// Byte range in the input to point a diagnostic at
    pub fn span(&self) -> Range<usize> {
        if self.has_column() {
            self.character..self.character + 1
        } else {
            self.character..self.character
        }
    }
}

/// Failure of [`Parser::parse`]
#[derive(Debug, Error)]
pub enum BuildError<E> {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to read input: {0}")]
    Source(E),
}

impl BuildError<Infallible> {
    pub fn into_parse_error(self) -> ParseError {
        match self {
            BuildError::Parse(e) => e,
            BuildError::Source(never) => match never {},
        }
    }
}

type BuildResult<T, E> = Result<T, BuildError<E>>;

/// Supplies input lines on demand
pub trait LineSource {
    type Error;

    /// Replace `line` with the next line of input, terminator included.
    ///
    /// Returns the number of raw input bytes the line took up, or `None` at
    /// the end of input.
    fn next_line(&mut self, line: &mut String) -> Result<Option<usize>, Self::Error>;
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    type Error = S::Error;

    fn next_line(&mut self, line: &mut String) -> Result<Option<usize>, Self::Error> {
        (**self).next_line(line)
    }
}

/// Lines of an in-memory string
pub struct StrLines<'a> {
    rest: &'a str,
}

impl<'a> StrLines<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { rest: source }
    }
}

impl LineSource for StrLines<'_> {
    type Error = Infallible;

    fn next_line(&mut self, line: &mut String) -> Result<Option<usize>, Infallible> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        let end = self.rest.find('\n').map_or(self.rest.len(), |i| i + 1);
        let (head, tail) = self.rest.split_at(end);
        line.clear();
        line.push_str(head);
        self.rest = tail;
        Ok(Some(head.len()))
    }
}

/// Lines of a byte stream
///
/// Only the ASCII delimiters matter to the format, so bytes that aren't
/// valid UTF-8 are replaced with U+FFFD, one line at a time.
pub struct ReaderLines<R> {
    reader: R,
    bytes: Vec<u8>,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bytes: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    type Error = std::io::Error;

    fn next_line(&mut self, line: &mut String) -> std::io::Result<Option<usize>> {
        self.bytes.clear();
        let read = self.reader.read_until(b'\n', &mut self.bytes)?;
        if read == 0 {
            return Ok(None);
        }
        line.clear();
        line.push_str(&String::from_utf8_lossy(&self.bytes));
        Ok(Some(read))
    }
}

/// Parser state
pub struct Parser<S> {
    source: S,
    options: ParseOptions,
    current: String,
    line_no: usize,
    line_start: usize,
    next_line_start: usize,
    depth: usize,
}

impl<S: LineSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: ParseOptions::default(),
            current: String::new(),
            line_no: 0,
            line_start: 0,
            next_line_start: 0,
            depth: 0,
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the whole input. The root is always a `document`.
    pub fn parse(mut self) -> BuildResult<Entry, S::Error> {
        let mut children = ChildList::new();
        self.parse_children(EntryKind::Document, &mut children)?;

        tracing::debug!(lines = self.line_no, entries = children.len(), "parsed configuration");
        Ok(Entry::new_document(children))
    }

    /// Pull the next line, stripping its terminator
    fn next_line(&mut self) -> BuildResult<bool, S::Error> {
        self.line_start = self.next_line_start;
        let Some(consumed) = self.source.next_line(&mut self.current).map_err(BuildError::Source)? else {
            return Ok(false);
        };
        self.next_line_start = self.line_start + consumed;
        self.line_no += 1;
        if self.current.ends_with('\n') {
            self.current.pop();
        }
        if self.current.ends_with('\r') {
            self.current.pop();
        }
        tracing::trace!(line = self.line_no, "{}", self.current);
        Ok(true)
    }

    /// Read lines into `children` until the owner's closing brace (or EOF for
    /// the document).
    fn parse_children(&mut self, owner: EntryKind, children: &mut ChildList) -> BuildResult<(), S::Error> {
        while self.next_line()? {
            let line = LineComponents::from_line(&self.current);
            match line.kind {
                LineKind::Comment => children.push(Entry::new_comment(line.comment)),
                LineKind::Simple => children.push(
                    SimpleEntry {
                        name: line.name,
                        attributes: line.attributes,
                        comment: line.comment,
                    }
                    .into(),
                ),
                LineKind::ComplexStart => {
                    self.enter_block(line.column)?;
                    let mut block = ComplexEntry {
                        name: line.name,
                        attributes: line.attributes,
                        children: ChildList::new(),
                        comment: line.comment,
                    };
                    self.parse_children(EntryKind::Complex, &mut block.children)?;
                    self.depth -= 1;
                    children.push(block.into());
                }
                LineKind::ComplexEnd => {
                    if owner == EntryKind::Document {
                        return Err(self.error(line.column, "Unmatched end of nested entry").into());
                    }
                    return Ok(());
                }
                LineKind::Unknown => {
                    let message = format!("Indecipherable line: \"{}\"", self.current);
                    return Err(self.error(line.column, message).into());
                }
            }
        }

        if owner == EntryKind::Complex {
            Err(self.error(None, "EOF reached while inside nested entry").into())
        } else {
            Ok(())
        }
    }

    fn enter_block(&mut self, column: Option<usize>) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            let message = format!("Maximum nesting depth of {} exceeded", self.options.max_depth);
            return Err(self.error(column, message));
        }
        self.depth += 1;
        Ok(())
    }

    fn error(&self, column: Option<usize>, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line_no,
            column: column.unwrap_or(ParseError::NO_COLUMN),
            character: self.line_start + column.unwrap_or(0),
            message: message.into(),
        }
    }
}

/// Parse a configuration with default options
pub fn parse(source: &str) -> Result<Entry, ParseError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse a configuration with the given options
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Entry, ParseError> {
    Parser::new(StrLines::new(source))
        .with_options(options.clone())
        .parse()
        .map_err(BuildError::into_parse_error)
}
