use jsonlib_json_path::ParseError;
use serde_json::Value;
use thiserror::Error;

use crate::text::convert_json_to_string;

/// Failures reported by the keyword library.
///
/// Every variant is terminal for the calling step. Update and delete on an
/// empty match set, and a non-strict query, are not errors at all.
#[derive(Debug, Error)]
pub enum JsonLibraryError {
    #[error("Parser failed to understand syntax '{expr}'. error message: {source}")]
    PathSyntax {
        expr: String,
        #[source]
        source: ParseError,
    },
    #[error("No value found for path {path}")]
    EmptyResult { path: String },
    #[error("No match found for parent {path}")]
    NoMatch { path: String },
    #[error("Cannot merge a non-object value into the object at {path}")]
    InvalidMerge { path: String },
    #[error("Match found for parent {path}: {}", convert_json_to_string(&Value::Array(.values.clone()), None, false))]
    ValueFound { path: String, values: Vec<Value> },
    #[error("{message}, Schema path: {}", .schema_path.join(" > "))]
    SchemaValidation { message: String, schema_path: Vec<String> },
    #[error("Json schema error: {message}")]
    SchemaDefinition { message: String },
    #[error("JSON file: {path} not found")]
    FileNotFound { path: String },
    #[error("Unknown encoding: {label}")]
    UnknownEncoding { label: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JsonLibraryError>;
