//! nginx-style configuration parser and encoder
//!
//! This crate parses nginx configuration files into an [`Entry`] tree,
//! lets callers inspect and edit the tree, and writes it back out.
//!
//! # Example
//!
//! ```rust,ignore
//! use ngxconf_config::{encode, parse};
//!
//! let mut doc = parse("http {\n    sendfile on;\n}\n").unwrap();
//! doc.children_mut().unwrap()[0]
//!     .children_mut()
//!     .unwrap()
//!     .push(ngxconf_config::Entry::new_simple("gzip", ["on"], ""));
//!
//! assert_eq!(encode(&doc), "http {\n  sendfile on ;\n  gzip on ;\n}\n");
//! ```

pub mod adapter;
pub mod encoder;
pub mod options;
pub mod parser;

pub use adapter::JsonAdapter;
pub use encoder::{encode, encode_to_writer, encode_with_options, EncodeContext, Encoder, TextEncoder};
pub use options::{Config, FormatOptions, ParseOptions};
pub use parser::{
    parse, parse_with_options, BuildError, Comment, ComplexEntry, Document, Entry, EntryKind, KindError,
    LineComponents, LineKind, LineSource, ParseError, Parser, ReaderLines, SimpleEntry, StrLines,
};

use std::io::BufRead;
use std::path::Path;

/// Result type for file and adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the file, reader and adapter wrappers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Kind error: {0}")]
    Kind(#[from] KindError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<BuildError<std::io::Error>> for Error {
    fn from(e: BuildError<std::io::Error>) -> Self {
        match e {
            BuildError::Parse(e) => Error::Parse(e),
            BuildError::Source(e) => Error::Io(e),
        }
    }
}

/// Parse `reader` line by line
pub fn parse_reader<R: BufRead>(reader: R, options: &ParseOptions) -> Result<Entry> {
    let parser = Parser::new(ReaderLines::new(reader)).with_options(options.clone());
    Ok(parser.parse()?)
}

/// Load and parse a configuration file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Entry> {
    parse_file_with_options(path, &ParseOptions::default())
}

/// Load and parse a configuration file with the given options
pub fn parse_file_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Entry> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading configuration");
    let file = std::fs::File::open(path)?;
    parse_reader(std::io::BufReader::new(file), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"worker_processes 1;\nevents {\n    worker_connections 1024;\n}\n")
            .unwrap();

        let doc = parse_file(file.path()).unwrap();
        let children = doc.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].name().unwrap(), "events");
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(dir.path().join("nginx.conf")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_parse_reader_error() {
        let err = parse_reader("a {\n".as_bytes(), &ParseOptions::default()).unwrap_err();
        match err {
            Error::Parse(e) => assert_eq!(e.line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_reader_accepts_non_utf8() {
        let doc = parse_reader(&b"# caf\xe9\nuser nginx;\n"[..], &ParseOptions::default()).unwrap();
        let children = doc.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].comment().unwrap(), " caf\u{FFFD}");
        assert_eq!(children[1], Entry::new_simple("user", ["nginx"], ""));
    }

    #[test]
    fn test_parse_file_latin1_comment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"events {\n    # r\xe9seau\n    use epoll;\n}\n").unwrap();

        let doc = parse_file(file.path()).unwrap();
        let events = &doc.children().unwrap()[0];
        assert_eq!(events.children().unwrap()[1], Entry::new_simple("use", ["epoll"], ""));
    }

    #[test]
    fn test_edit_and_encode() {
        let mut doc = parse("http {\n    sendfile on;\n}\n").unwrap();
        doc.children_mut().unwrap()[0]
            .children_mut()
            .unwrap()
            .push(Entry::new_simple("gzip", ["on"], ""));
        assert_eq!(encode(&doc), "http {\n  sendfile on ;\n  gzip on ;\n}\n");
    }

    #[test]
    fn test_kind_error_converts() {
        fn first_name(doc: &Entry) -> Result<String> {
            Ok(doc.name()?.to_string())
        }
        let err = first_name(&Entry::new_document(vec![])).unwrap_err();
        assert!(matches!(err, Error::Kind(_)));
    }
}
