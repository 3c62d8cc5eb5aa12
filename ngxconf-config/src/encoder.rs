//! Configuration tree encoder
//!
//! [`Encoder`] walks a tree depth-first and hands each entry to a hook;
//! [`TextEncoder`] is the hook set that writes the nginx text format.

use crate::options::FormatOptions;
use crate::parser::ast::{Comment, ComplexEntry, Document, Entry, SimpleEntry};
use std::fmt::{self, Write};

/// Traversal state handed to every hook
#[derive(Debug, Default)]
pub struct EncodeContext<'a> {
    path: Vec<&'a Entry>,
}

impl<'a> EncodeContext<'a> {
    /// Ancestors of the entry being written, root first
    pub fn path(&self) -> &[&'a Entry] {
        &self.path
    }

    /// Number of blocks enclosing the entry being written
    pub fn indent_level(&self) -> usize {
        self.path
            .iter()
            .filter(|e| matches!(e, Entry::Complex(_)))
            .count()
    }
}

/// Writes a configuration tree somewhere
///
/// Implementors only provide the hooks; [`Encoder::encode`] drives them in
/// source order.
pub trait Encoder {
    type Error;

    fn write_simple(&mut self, cx: &EncodeContext<'_>, entry: &SimpleEntry) -> Result<(), Self::Error>;

    fn write_complex_begin(&mut self, cx: &EncodeContext<'_>, entry: &ComplexEntry) -> Result<(), Self::Error>;

    fn write_complex_end(&mut self, cx: &EncodeContext<'_>, entry: &ComplexEntry) -> Result<(), Self::Error>;

    fn write_comment(&mut self, cx: &EncodeContext<'_>, entry: &Comment) -> Result<(), Self::Error>;

    fn write_document_begin(&mut self, _cx: &EncodeContext<'_>, _entry: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write_document_end(&mut self, _cx: &EncodeContext<'_>, _entry: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Write `root` and everything below it
    fn encode(&mut self, root: &Entry) -> Result<(), Self::Error> {
        let mut cx = EncodeContext::default();
        encode_entry(self, &mut cx, root)
    }
}

fn encode_entry<'a, E>(encoder: &mut E, cx: &mut EncodeContext<'a>, entry: &'a Entry) -> Result<(), E::Error>
where
    E: Encoder + ?Sized,
{
    match entry {
        Entry::Comment(comment) => encoder.write_comment(cx, comment),
        Entry::Simple(simple) => encoder.write_simple(cx, simple),
        Entry::Complex(complex) => {
            encoder.write_complex_begin(cx, complex)?;
            encode_children(&mut *encoder, cx, entry, &complex.children)?;
            encoder.write_complex_end(cx, complex)
        }
        Entry::Document(document) => {
            encoder.write_document_begin(cx, document)?;
            encode_children(&mut *encoder, cx, entry, &document.children)?;
            encoder.write_document_end(cx, document)
        }
    }
}

fn encode_children<'a, E>(
    encoder: &mut E,
    cx: &mut EncodeContext<'a>,
    parent: &'a Entry,
    children: &'a [Entry],
) -> Result<(), E::Error>
where
    E: Encoder + ?Sized,
{
    cx.path.push(parent);
    for child in children {
        if let Err(e) = encode_entry(&mut *encoder, &mut *cx, child) {
            cx.path.pop();
            return Err(e);
        }
    }
    cx.path.pop();
    Ok(())
}

/// Writes the nginx text format to any [`fmt::Write`] sink
pub struct TextEncoder<W> {
    output: W,
    indent: String,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(output: W) -> Self {
        Self::with_options(output, &FormatOptions::default())
    }

    pub fn with_options(output: W, options: &FormatOptions) -> Self {
        Self {
            output,
            indent: options.indent.clone(),
        }
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn write_indent(&mut self, cx: &EncodeContext<'_>) -> fmt::Result {
        for _ in 0..cx.indent_level() {
            self.output.write_str(&self.indent)?;
        }
        Ok(())
    }

    fn write_head(&mut self, name: &str, attributes: &[String]) -> fmt::Result {
        self.output.write_str(name)?;
        for attr in attributes {
            write!(self.output, " {}", attr)?;
        }
        Ok(())
    }

    fn write_trailer(&mut self, comment: &str) -> fmt::Result {
        if !comment.is_empty() {
            write!(self.output, "#{}", comment)?;
        }
        self.output.write_char('\n')
    }
}

impl<W: Write> Encoder for TextEncoder<W> {
    type Error = fmt::Error;

    fn write_simple(&mut self, cx: &EncodeContext<'_>, entry: &SimpleEntry) -> fmt::Result {
        self.write_indent(cx)?;
        self.write_head(&entry.name, &entry.attributes)?;
        self.output.write_str(" ;")?;
        self.write_trailer(&entry.comment)
    }

    fn write_complex_begin(&mut self, cx: &EncodeContext<'_>, entry: &ComplexEntry) -> fmt::Result {
        self.write_indent(cx)?;
        self.write_head(&entry.name, &entry.attributes)?;
        self.output.write_str(" {")?;
        self.write_trailer(&entry.comment)
    }

    // The block's own comment stays on its opening line.
    fn write_complex_end(&mut self, cx: &EncodeContext<'_>, _entry: &ComplexEntry) -> fmt::Result {
        self.write_indent(cx)?;
        self.output.write_str("}\n")
    }

    // An empty comment is a blank line, with no indent either.
    fn write_comment(&mut self, cx: &EncodeContext<'_>, entry: &Comment) -> fmt::Result {
        if !entry.text.is_empty() {
            self.write_indent(cx)?;
        }
        self.write_trailer(&entry.text)
    }
}

/// Render `entry` with the default options
pub fn encode(entry: &Entry) -> String {
    encode_with_options(entry, &FormatOptions::default())
}

/// Render `entry` with the given options
pub fn encode_with_options(entry: &Entry, options: &FormatOptions) -> String {
    let mut encoder = TextEncoder::with_options(String::new(), options);
    encoder
        .encode(entry)
        .expect("writing to a String cannot fail");
    encoder.into_inner()
}

/// Render `entry` into an [`std::io::Write`] sink
pub fn encode_to_writer<W: std::io::Write>(
    entry: &Entry,
    mut output: W,
    options: &FormatOptions,
) -> std::io::Result<()> {
    output.write_all(encode_with_options(entry, options).as_bytes())?;
    output.flush()
}
