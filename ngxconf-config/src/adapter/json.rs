//! JSON tree adapter

use crate::parser::Entry;
use crate::Result;

/// Converts configuration trees to and from JSON
pub struct JsonAdapter;

impl JsonAdapter {
    /// Read a tree previously written by [`JsonAdapter::serialize`]
    pub fn parse(input: &str) -> Result<Entry> {
        Ok(serde_json::from_str(input)?)
    }

    /// Serialize a tree to JSON
    pub fn serialize(entry: &Entry, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(entry)?
        } else {
            serde_json::to_string(entry)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_json_round_trip() {
        let doc = parse("http {\n  listen 80; # port\n}\n#end\n").unwrap();
        let json = JsonAdapter::serialize(&doc, false).unwrap();
        assert!(json.starts_with(r#"{"kind":"document","children":[{"kind":"complex","name":"http""#));
        assert_eq!(JsonAdapter::parse(&json).unwrap(), doc);
    }

    #[test]
    fn test_invalid_json() {
        let err = JsonAdapter::parse(r#"{"kind":"branch"}"#).unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }
}
