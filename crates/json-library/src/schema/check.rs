//! Schema well-formedness checks, run before any instance is validated.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Value};

use super::validator::SchemaError;

const TYPE_NAMES: [&str; 7] = ["null", "boolean", "object", "array", "number", "string", "integer"];

/// Compiled regular expressions keyed by their source text.
pub(crate) type RegexCache = HashMap<String, Regex>;

/// Walk `schema` and report the first malformed keyword.
pub(crate) fn check_schema(root: &Value, schema: &Value, path: &[String], regexes: &mut RegexCache) -> Result<(), SchemaError> {
    let map = match schema {
        Value::Bool(_) => return Ok(()),
        Value::Object(map) => map,
        other => {
            return Err(error(path, format!("{other} is not of type 'object', 'boolean'")));
        }
    };

    for (keyword, value) in map {
        let here = child(path, keyword);
        match keyword.as_str() {
            "type" => check_type(value, &here)?,
            "enum" => {
                if !value.is_array() {
                    return Err(error(&here, format!("{value} is not of type 'array'")));
                }
            }
            "required" => check_string_array(value, &here)?,
            "properties" | "patternProperties" | "definitions" | "$defs" => {
                let members = as_object(value, &here)?;
                for (name, sub) in members {
                    if keyword == "patternProperties" {
                        compile_regex(name, &here, regexes)?;
                    }
                    check_schema(root, sub, &child(&here, name), regexes)?;
                }
            }
            "additionalProperties" | "additionalItems" | "contains" | "not" | "if" | "then" | "else"
            | "propertyNames" => check_schema(root, value, &here, regexes)?,
            "items" => match value {
                Value::Array(items) => {
                    for (idx, sub) in items.iter().enumerate() {
                        check_schema(root, sub, &child(&here, &idx.to_string()), regexes)?;
                    }
                }
                other => check_schema(root, other, &here, regexes)?,
            },
            "allOf" | "anyOf" | "oneOf" => {
                let branches = match value {
                    Value::Array(items) if !items.is_empty() => items,
                    other => return Err(error(&here, format!("{other} is not a non-empty array"))),
                };
                for (idx, sub) in branches.iter().enumerate() {
                    check_schema(root, sub, &child(&here, &idx.to_string()), regexes)?;
                }
            }
            "minLength" | "maxLength" | "minItems" | "maxItems" | "minProperties" | "maxProperties" => {
                if value.as_u64().is_none() {
                    return Err(error(&here, format!("{value} is not a non-negative integer")));
                }
            }
            "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => {
                if !value.is_number() {
                    return Err(error(&here, format!("{value} is not of type 'number'")));
                }
            }
            "multipleOf" => {
                if !value.as_f64().is_some_and(|m| m > 0.0) {
                    return Err(error(&here, format!("{value} is not a positive number")));
                }
            }
            "uniqueItems" => {
                if !value.is_boolean() {
                    return Err(error(&here, format!("{value} is not of type 'boolean'")));
                }
            }
            "pattern" => match value {
                Value::String(pattern) => compile_regex(pattern, &here, regexes)?,
                other => return Err(error(&here, format!("{other} is not of type 'string'"))),
            },
            "$ref" => match value {
                Value::String(reference) => {
                    if resolve_ref(root, reference).is_none() {
                        return Err(error(&here, format!("Unresolvable JSON pointer: '{reference}'")));
                    }
                }
                other => return Err(error(&here, format!("{other} is not of type 'string'"))),
            },
            _ => {}
        }
    }
    Ok(())
}

/// Resolve a document-local reference (`#` or `#/json/pointer`).
pub(crate) fn resolve_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(root);
    }
    root.pointer(pointer)
}

fn check_type(value: &Value, path: &[String]) -> Result<(), SchemaError> {
    let names: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    for name in names {
        match name.as_str() {
            Some(n) if TYPE_NAMES.contains(&n) => {}
            _ => return Err(error(path, format!("{name} is not valid under any of the given schemas"))),
        }
    }
    Ok(())
}

fn check_string_array(value: &Value, path: &[String]) -> Result<(), SchemaError> {
    match value {
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(()),
        other => Err(error(path, format!("{other} is not an array of strings"))),
    }
}

fn as_object<'a>(value: &'a Value, path: &[String]) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| error(path, format!("{value} is not of type 'object'")))
}

fn compile_regex(pattern: &str, path: &[String], regexes: &mut RegexCache) -> Result<(), SchemaError> {
    if regexes.contains_key(pattern) {
        return Ok(());
    }
    let regex = Regex::new(pattern).map_err(|e| error(path, format!("'{pattern}' is not a 'regex': {e}")))?;
    regexes.insert(pattern.to_string(), regex);
    Ok(())
}

fn child(path: &[String], step: &str) -> Vec<String> {
    let mut out = path.to_vec();
    out.push(step.to_string());
    out
}

fn error(path: &[String], message: String) -> SchemaError {
    SchemaError { message, schema_path: path.to_vec() }
}
