//! Line classifier for nginx-style configuration files
//!
//! The format is line oriented: every line is at most one directive, one
//! block opener, one block closer or one comment. A line is tokenized with
//! logos and then decomposed into [`LineComponents`].
//!
//! - Whitespace separates attributes and is otherwise discarded
//! - `{`, `}` and `;` terminate the line (at most one of them)
//! - `#` starts a comment that runs to the end of the line
//! - No quoting or escaping is interpreted

use logos::{Logos, Span};

/// Token types for one configuration line
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Whitespace,

    /// Everything after the `#`, verbatim
    #[regex(r"#[^\n]*", |lex| lex.slice()[1..].to_string())]
    Comment(String),

    #[token("{")]
    BlockOpen,

    #[token("}")]
    BlockClose,

    #[token(";")]
    Semicolon,

    /// Anything that isn't whitespace, a terminator or a comment start
    #[regex(r"[^ \t\r\n\f{};#]+", |lex| lex.slice().to_string())]
    Word(String),
}

/// What a single line turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Terminated by `;`
    Simple,
    /// Terminated by `{`
    ComplexStart,
    /// Terminated by `}`
    ComplexEnd,
    /// Blank, whitespace only, or nothing but a comment
    Comment,
    /// Matches none of the shapes above
    Unknown,
}

/// The pieces of a classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComponents {
    pub kind: LineKind,
    pub name: String,
    pub attributes: Vec<String>,
    /// Comment text without the `#`; empty when the line has none
    pub comment: String,
    /// Byte column of the terminator, or of the first offending token for
    /// [`LineKind::Unknown`]
    pub column: Option<usize>,
}

impl LineComponents {
    fn new(kind: LineKind) -> Self {
        Self {
            kind,
            name: String::new(),
            attributes: Vec::new(),
            comment: String::new(),
            column: None,
        }
    }

    fn unknown(column: usize) -> Self {
        Self {
            column: Some(column),
            ..Self::new(LineKind::Unknown)
        }
    }

    /// Classify one line of input. The line must not contain its newline.
    pub fn from_line(line: &str) -> Self {
        let mut words: Vec<(String, Span)> = Vec::new();
        let mut terminator: Option<(LineKind, usize)> = None;
        let mut comment = String::new();

        for (result, span) in Token::lexer(line).spanned() {
            match result {
                Ok(Token::Comment(text)) => {
                    comment = text;
                    break;
                }
                Ok(Token::Word(word)) => {
                    if terminator.is_some() {
                        return Self::unknown(span.start);
                    }
                    words.push((word, span));
                }
                Ok(token) => {
                    if terminator.is_some() {
                        return Self::unknown(span.start);
                    }
                    let kind = match token {
                        Token::BlockOpen => LineKind::ComplexStart,
                        Token::BlockClose => LineKind::ComplexEnd,
                        _ => LineKind::Simple,
                    };
                    terminator = Some((kind, span.start));
                }
                Err(()) => return Self::unknown(span.start),
            }
        }

        let first_word = words.first().map(|(_, span)| span.start);
        let (kind, column) = match (terminator, first_word) {
            (None, None) => {
                return Self {
                    comment,
                    ..Self::new(LineKind::Comment)
                };
            }
            // A directive with no terminator, or text before a closing brace
            (None, Some(start)) | (Some((LineKind::ComplexEnd, _)), Some(start)) => {
                return Self::unknown(start);
            }
            (Some((kind, column)), _) => (kind, column),
        };

        let mut words = words.into_iter().map(|(word, _)| word);
        let mut name = String::new();
        let mut attributes = Vec::new();
        if let Some(first) = words.next() {
            let (head, rest) = split_identifier(&first);
            name.push_str(head);
            if !rest.is_empty() {
                attributes.push(rest.to_string());
            }
        }
        attributes.extend(words);

        Self {
            kind,
            name,
            attributes,
            comment,
            column: Some(column),
        }
    }
}

/// Split a word into its longest `[A-Za-z_][A-Za-z0-9_]*` prefix and the rest.
fn split_identifier(word: &str) -> (&str, &str) {
    let end = word
        .char_indices()
        .take_while(|&(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    word.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let x = LineComponents::from_line("");
        assert_eq!(x.kind, LineKind::Comment);
        assert_eq!(x.comment, "");

        let x = LineComponents::from_line("   \t");
        assert_eq!(x.kind, LineKind::Comment);
        assert_eq!(x.comment, "");
    }

    #[test]
    fn test_comment_only() {
        let x = LineComponents::from_line("#user html");
        assert_eq!(x.kind, LineKind::Comment);
        assert_eq!(x.comment, "user html");

        let x = LineComponents::from_line("  \t#user html");
        assert_eq!(x.kind, LineKind::Comment);
        assert_eq!(x.comment, "user html");
    }

    #[test]
    fn test_simple_no_comment() {
        let x = LineComponents::from_line("worker_processes 1 blah;");
        assert_eq!(x.kind, LineKind::Simple);
        assert_eq!(x.name, "worker_processes");
        assert_eq!(x.attributes, vec!["1", "blah"]);
        assert_eq!(x.comment, "");

        let x = LineComponents::from_line("worker_processes  1;");
        assert_eq!(x.kind, LineKind::Simple);
        assert_eq!(x.name, "worker_processes");
        assert_eq!(x.attributes, vec!["1"]);
    }

    #[test]
    fn test_simple_with_comment() {
        let x = LineComponents::from_line("worker_processes 1 bl/ah;# comment");
        assert_eq!(x.kind, LineKind::Simple);
        assert_eq!(x.name, "worker_processes");
        assert_eq!(x.attributes, vec!["1", "bl/ah"]);
        assert_eq!(x.comment, " comment");
    }

    #[test]
    fn test_complex_start_and_end() {
        let x = LineComponents::from_line("  location /static/ { # assets");
        assert_eq!(x.kind, LineKind::ComplexStart);
        assert_eq!(x.name, "location");
        assert_eq!(x.attributes, vec!["/static/"]);
        assert_eq!(x.comment, " assets");
        assert_eq!(x.column, Some(20));

        let x = LineComponents::from_line("    }");
        assert_eq!(x.kind, LineKind::ComplexEnd);
        assert!(x.name.is_empty());
        assert_eq!(x.column, Some(4));
    }

    #[test]
    fn test_terminator_without_space() {
        let x = LineComponents::from_line("http{");
        assert_eq!(x.kind, LineKind::ComplexStart);
        assert_eq!(x.name, "http");
        assert!(x.attributes.is_empty());
    }

    #[test]
    fn test_name_is_identifier_prefix() {
        let x = LineComponents::from_line("a.b c;");
        assert_eq!(x.name, "a");
        assert_eq!(x.attributes, vec![".b", "c"]);

        let x = LineComponents::from_line("1 foo;");
        assert_eq!(x.kind, LineKind::Simple);
        assert_eq!(x.name, "");
        assert_eq!(x.attributes, vec!["1", "foo"]);
    }

    #[test]
    fn test_unknown_lines() {
        let x = LineComponents::from_line("a ; b");
        assert_eq!(x.kind, LineKind::Unknown);
        assert_eq!(x.column, Some(4));

        assert_eq!(LineComponents::from_line("a;;").kind, LineKind::Unknown);
        assert_eq!(LineComponents::from_line("listen 80").kind, LineKind::Unknown);
        assert_eq!(LineComponents::from_line("foo }").kind, LineKind::Unknown);
        assert_eq!(LineComponents::from_line("{ }").kind, LineKind::Unknown);
    }

    #[test]
    fn test_hash_inside_comment_is_kept() {
        let x = LineComponents::from_line("root /srv; # a # b");
        assert_eq!(x.kind, LineKind::Simple);
        assert_eq!(x.comment, " a # b");
    }
}
