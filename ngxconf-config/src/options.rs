//! Parser and formatter options
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [format]
//! indent = "    "
//!
//! [parse]
//! max_depth = 64
//! ```

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Indentation written per nesting level
pub const DEFAULT_INDENT: &str = "  ";

/// Deepest block nesting accepted by the parser
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for the text encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Written once per enclosing block; any string is accepted
    pub indent: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl FormatOptions {
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self { indent: indent.into() }
    }
}

/// Options for the tree builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum number of blocks open at once
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Options file as loaded by the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: FormatOptions,
    pub parse: ParseOptions,
}

impl Config {
    /// Parse TOML options
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load TOML options from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}
