//! Entry tree for nginx-style configuration files
//!
//! Every node of a parsed file is an [`Entry`]:
//! - `simple`   — `name attr... ;`
//! - `complex`  — `name attr... { children }`
//! - `document` — the synthetic root
//! - `comment`  — a standalone `#...` line (or a blank line)

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A name and a list of attributes.
    Simple,
    /// A name, a list of attributes and a list of child entries.
    Complex,
    /// Child entries only; the root of a configuration file.
    Document,
    /// Comment text only.
    Comment,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Simple => write!(f, "simple"),
            EntryKind::Complex => write!(f, "complex"),
            EntryKind::Document => write!(f, "document"),
            EntryKind::Comment => write!(f, "comment"),
        }
    }
}

/// Raised when an accessor is used on an entry of the wrong kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unexpected kind: expected {}, found {found}", join_kinds(.expected))]
pub struct KindError {
    /// Kinds for which the accessor would have succeeded
    pub expected: &'static [EntryKind],
    /// Kind of the entry the accessor was called on
    pub found: EntryKind,
}

/// `a`, `a or b`, `a, b or c`
fn join_kinds(kinds: &[EntryKind]) -> String {
    let mut out = String::new();
    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            out.push_str(if i + 1 == kinds.len() { " or " } else { ", " });
        }
        out.push_str(&kind.to_string());
    }
    out
}

const NAMED: &[EntryKind] = &[EntryKind::Complex, EntryKind::Simple];
const PARENTS: &[EntryKind] = &[EntryKind::Complex, EntryKind::Document];
const COMMENTED: &[EntryKind] = &[EntryKind::Comment, EntryKind::Simple, EntryKind::Complex];

/// Ordered argument tokens following a directive name
pub type AttributeList = Vec<String>;

/// Ordered child entries of a block or document
pub type ChildList = Vec<Entry>;

/// `name attr... ;#comment`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEntry {
    pub name: String,
    #[serde(default)]
    pub attributes: AttributeList,
    /// Trailing comment without the `#`; empty when absent
    #[serde(default)]
    pub comment: String,
}

/// `name attr... {#comment` ... `}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexEntry {
    pub name: String,
    #[serde(default)]
    pub attributes: AttributeList,
    #[serde(default)]
    pub children: ChildList,
    /// Comment following the opening brace; empty when absent
    #[serde(default)]
    pub comment: String,
}

/// Root of a parsed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub children: ChildList,
}

/// Standalone comment line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
}

/// A node of the configuration tree
///
/// Entries own their whole subtree, so `clone()` is a deep copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Simple(SimpleEntry),
    Complex(ComplexEntry),
    Document(Document),
    Comment(Comment),
}

impl Entry {
    /// Create a `simple` entry.
    pub fn new_simple<I, S>(name: impl Into<String>, attributes: I, comment: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Entry::Simple(SimpleEntry {
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            comment: comment.into(),
        })
    }

    /// Create a `complex` entry with no trailing comment.
    pub fn new_complex<I, S>(name: impl Into<String>, attributes: I, children: ChildList) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Entry::Complex(ComplexEntry {
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            children,
            comment: String::new(),
        })
    }

    /// Create a `document`.
    pub fn new_document(children: ChildList) -> Self {
        Entry::Document(Document { children })
    }

    /// Create a `comment` entry.
    pub fn new_comment(text: impl Into<String>) -> Self {
        Entry::Comment(Comment { text: text.into() })
    }

    /// A freshly created entry of `kind` with every field empty.
    pub fn empty(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Simple => Entry::Simple(SimpleEntry::default()),
            EntryKind::Complex => Entry::Complex(ComplexEntry::default()),
            EntryKind::Document => Entry::Document(Document::default()),
            EntryKind::Comment => Entry::Comment(Comment::default()),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Simple(_) => EntryKind::Simple,
            Entry::Complex(_) => EntryKind::Complex,
            Entry::Document(_) => EntryKind::Document,
            Entry::Comment(_) => EntryKind::Comment,
        }
    }

    /// Exchange the contents of two entries, kinds included.
    pub fn swap(a: &mut Entry, b: &mut Entry) {
        std::mem::swap(a, b);
    }

    /// Move the contents out, leaving an empty entry of the same kind behind.
    pub fn take(&mut self) -> Entry {
        let empty = Entry::empty(self.kind());
        std::mem::replace(self, empty)
    }

    fn mismatch(&self, expected: &'static [EntryKind]) -> KindError {
        KindError { expected, found: self.kind() }
    }

    /// Directive name such as `http`, `location` or `root`.
    ///
    /// Only `simple` and `complex` entries have one. The name is not
    /// validated: nginx only allows alphanumerics and underscores, but
    /// anything may be stored here.
    pub fn name(&self) -> Result<&str, KindError> {
        match self {
            Entry::Simple(e) => Ok(&e.name),
            Entry::Complex(e) => Ok(&e.name),
            _ => Err(self.mismatch(NAMED)),
        }
    }

    pub fn name_mut(&mut self) -> Result<&mut String, KindError> {
        match self {
            Entry::Simple(e) => Ok(&mut e.name),
            Entry::Complex(e) => Ok(&mut e.name),
            _ => Err(self.mismatch(NAMED)),
        }
    }

    /// Attributes following the name of a `simple` or `complex` entry.
    pub fn attributes(&self) -> Result<&AttributeList, KindError> {
        match self {
            Entry::Simple(e) => Ok(&e.attributes),
            Entry::Complex(e) => Ok(&e.attributes),
            _ => Err(self.mismatch(NAMED)),
        }
    }

    pub fn attributes_mut(&mut self) -> Result<&mut AttributeList, KindError> {
        match self {
            Entry::Simple(e) => Ok(&mut e.attributes),
            Entry::Complex(e) => Ok(&mut e.attributes),
            _ => Err(self.mismatch(NAMED)),
        }
    }

    /// Children of a `complex` entry or a `document`.
    pub fn children(&self) -> Result<&ChildList, KindError> {
        match self {
            Entry::Complex(e) => Ok(&e.children),
            Entry::Document(e) => Ok(&e.children),
            _ => Err(self.mismatch(PARENTS)),
        }
    }

    pub fn children_mut(&mut self) -> Result<&mut ChildList, KindError> {
        match self {
            Entry::Complex(e) => Ok(&mut e.children),
            Entry::Document(e) => Ok(&mut e.children),
            _ => Err(self.mismatch(PARENTS)),
        }
    }

    /// Comment text of a `comment`, or the trailing comment of a `simple`
    /// or `complex` entry (written after the `;` or `{`).
    ///
    /// Documents have no comment of their own; add a `comment` child instead.
    pub fn comment(&self) -> Result<&str, KindError> {
        match self {
            Entry::Comment(e) => Ok(&e.text),
            Entry::Simple(e) => Ok(&e.comment),
            Entry::Complex(e) => Ok(&e.comment),
            Entry::Document(_) => Err(self.mismatch(COMMENTED)),
        }
    }

    pub fn comment_mut(&mut self) -> Result<&mut String, KindError> {
        match self {
            Entry::Comment(e) => Ok(&mut e.text),
            Entry::Simple(e) => Ok(&mut e.comment),
            Entry::Complex(e) => Ok(&mut e.comment),
            Entry::Document(_) => Err(self.mismatch(COMMENTED)),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleEntry> {
        match self {
            Entry::Simple(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexEntry> {
        match self {
            Entry::Complex(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Entry::Document(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Entry::Comment(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SimpleEntry> for Entry {
    fn from(e: SimpleEntry) -> Self {
        Entry::Simple(e)
    }
}

impl From<ComplexEntry> for Entry {
    fn from(e: ComplexEntry) -> Self {
        Entry::Complex(e)
    }
}

impl From<Document> for Entry {
    fn from(e: Document) -> Self {
        Entry::Document(e)
    }
}

impl From<Comment> for Entry {
    fn from(e: Comment) -> Self {
        Entry::Comment(e)
    }
}

/// Renders the entry with the default text encoding.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::encoder::{Encoder, TextEncoder};

        TextEncoder::new(f).encode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entry {
        Entry::new_document(vec![
            Entry::new_comment("top"),
            Entry::new_complex(
                "http",
                ["a"],
                vec![Entry::new_simple("sendfile", ["on"], "")],
            ),
        ])
    }

    #[test]
    fn test_equality() {
        let x = Entry::new_simple("name", ["x", "y", "z"], "blah");
        let mut y = Entry::new_simple("name", ["x", "y", "z"], "blah");
        assert_eq!(x, y);

        y.attributes_mut().unwrap().push("w".to_string());
        assert_ne!(x, y);

        let x = Entry::new_complex("container", ["some_thing"], vec![y.clone()]);
        assert_ne!(x, y);
        assert_eq!(x.children().unwrap()[0], y);
    }

    #[test]
    fn test_comment_participates_in_equality() {
        let x = Entry::new_simple("a", ["1"], "one");
        let y = Entry::new_simple("a", ["1"], "two");
        assert_ne!(x, y);
        assert_ne!(Entry::new_comment("a"), Entry::new_comment("b"));
    }

    #[test]
    fn test_swap() {
        let mut x = Entry::new_complex("container", ["some_thing"], vec![Entry::new_simple("n", ["w"], "")]);
        let mut y = Entry::new_simple("n", ["w"], "");
        let (orig_x, orig_y) = (x.clone(), y.clone());

        Entry::swap(&mut x, &mut y);
        assert_ne!(x, y);
        assert_eq!(y.children().unwrap()[0], x);

        Entry::swap(&mut x, &mut y);
        assert_eq!(x, orig_x);
        assert_eq!(y, orig_y);
    }

    #[test]
    fn test_deep_copy_isolation() {
        let original = sample();
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.children_mut().unwrap()[1]
            .children_mut()
            .unwrap()
            .push(Entry::new_simple("gzip", ["on"], ""));
        *copy.children_mut().unwrap()[0].comment_mut().unwrap() = "changed".to_string();

        assert_ne!(copy, original);
        assert_eq!(original, sample());
    }

    #[test]
    fn test_take_leaves_empty_entry_of_same_kind() {
        let mut doc = sample();
        let taken = doc.children_mut().unwrap()[1].take();
        assert_eq!(taken.name().unwrap(), "http");

        let left = &doc.children().unwrap()[1];
        assert_eq!(left.kind(), EntryKind::Complex);
        assert_eq!(left, &Entry::empty(EntryKind::Complex));
    }

    #[test]
    fn test_kind_errors() {
        let comment = Entry::new_comment("x");
        let err = comment.name().unwrap_err();
        assert_eq!(err.found, EntryKind::Comment);
        assert!(err.expected.contains(&EntryKind::Simple));
        assert_eq!(err.to_string(), "Unexpected kind: expected complex or simple, found comment");

        assert!(comment.attributes().is_err());
        assert!(comment.children().is_err());
        assert!(Entry::new_simple("a", ["b"], "").children().is_err());

        let mut doc = Entry::new_document(vec![]);
        let err = doc.comment_mut().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected kind: expected comment, simple or complex, found document"
        );
        assert!(doc.name_mut().is_err());
    }

    #[test]
    fn test_permitted_accessors() {
        let complex = Entry::new_complex("server", ["x"], vec![]);
        assert_eq!(complex.name().unwrap(), "server");
        assert_eq!(complex.attributes().unwrap(), &vec!["x".to_string()]);
        assert!(complex.children().unwrap().is_empty());
        assert_eq!(complex.comment().unwrap(), "");
        assert_eq!(Entry::new_comment("hi").comment().unwrap(), "hi");
    }

    #[test]
    fn test_json_uses_kind_tag() {
        let json = serde_json::to_value(Entry::new_simple("listen", ["80"], "")).unwrap();
        assert_eq!(json["kind"], "simple");
        assert_eq!(json["name"], "listen");

        let back: Entry = serde_json::from_value(serde_json::to_value(sample()).unwrap()).unwrap();
        assert_eq!(back, sample());
    }
}
