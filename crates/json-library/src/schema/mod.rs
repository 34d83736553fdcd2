//! JSON Schema validation.
//!
//! [`SchemaValidator`] is the engine; the two `validate_json_by_schema*`
//! functions turn its outcome into [`JsonLibraryError`]s.

mod check;
pub mod validator;

pub use validator::{json_equal, Failure, SchemaError, SchemaValidator, ValidationError};

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{JsonLibraryError, Result};
use crate::io::load_json_from_file;

/// Fail unless `doc` satisfies `schema`.
pub fn validate_json_by_schema(doc: &Value, schema: &Value) -> Result<()> {
    let validator = SchemaValidator::new(schema).map_err(definition_error)?;
    match validator.validate(doc) {
        Ok(()) => Ok(()),
        Err(Failure::Invalid(e)) => {
            debug!(schema_path = ?e.schema_path, instance_path = ?e.instance_path, "schema validation failed");
            Err(JsonLibraryError::SchemaValidation { message: e.message, schema_path: e.schema_path })
        }
        Err(Failure::Schema(e)) => Err(definition_error(e)),
    }
}

/// Load a schema from `schema_file` and validate `doc` against it.
pub fn validate_json_by_schema_file(doc: &Value, schema_file: impl AsRef<Path>, encoding: Option<&str>) -> Result<()> {
    let schema = load_json_from_file(schema_file, encoding)?;
    validate_json_by_schema(doc, &schema)
}

fn definition_error(e: SchemaError) -> JsonLibraryError {
    let message = if e.schema_path.is_empty() {
        e.message
    } else {
        format!("{} (at {})", e.message, e.schema_path.join(" > "))
    };
    JsonLibraryError::SchemaDefinition { message }
}
