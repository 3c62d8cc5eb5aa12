//! Tree adapters for formats other than the nginx text format

mod json;

pub use json::JsonAdapter;
