//! Runtime JSON Schema validator.
//!
//! Keywords are dispatched one by one in the order they appear in the
//! schema object; the first violated keyword is reported.

use serde_json::{Map, Value};
use thiserror::Error;

use super::check::{check_schema, resolve_ref, RegexCache};

/// Limit on consecutive `$ref` hops that stay on the same instance value.
/// Moving into a member or item resets the count, so only cycles that
/// consume none of the instance reach it.
const MAX_REF_HOPS: usize = 256;

/// The schema itself is malformed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SchemaError {
    pub message: String,
    /// Keywords leading to the malformed part of the schema.
    pub schema_path: Vec<String>,
}

/// An instance does not satisfy the schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// Keywords leading to the violated sub-schema, ending in the keyword.
    pub schema_path: Vec<String>,
    /// Location of the offending value in the instance.
    pub instance_path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Failure {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A checked schema, ready to validate any number of instances.
#[derive(Debug)]
pub struct SchemaValidator {
    schema: Value,
    regexes: RegexCache,
}

/// Where the validator currently is, in the schema and in the instance.
#[derive(Default)]
struct Scope {
    schema_path: Vec<String>,
    instance_path: Vec<String>,
    ref_hops: usize,
}

impl Scope {
    fn keyword(&self, keyword: &str) -> Self {
        let mut schema_path = self.schema_path.clone();
        schema_path.push(keyword.to_string());
        Self { schema_path, instance_path: self.instance_path.clone(), ref_hops: self.ref_hops }
    }

    fn reference(&self) -> Self {
        let mut next = self.keyword("$ref");
        next.ref_hops += 1;
        next
    }

    fn item(&self, keyword: &str, step: &str) -> Self {
        let mut next = self.keyword(keyword);
        next.schema_path.push(step.to_string());
        next
    }

    fn at(mut self, instance_step: &str) -> Self {
        self.instance_path.push(instance_step.to_string());
        self.ref_hops = 0;
        self
    }
}

impl SchemaValidator {
    /// Check `schema` and prepare it for validation.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let mut regexes = RegexCache::new();
        check_schema(schema, schema, &[], &mut regexes)?;
        Ok(Self { schema: schema.clone(), regexes })
    }

    /// Validate `instance`, returning the first violation found.
    pub fn validate(&self, instance: &Value) -> Result<(), Failure> {
        self.validate_inner(instance, &self.schema, &Scope::default())
    }

    /// Whether `instance` satisfies the schema. Schema errors count as
    /// failures.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validate(instance).is_ok()
    }

    fn validate_inner(&self, value: &Value, schema: &Value, scope: &Scope) -> Result<(), Failure> {
        if scope.ref_hops > MAX_REF_HOPS {
            return Err(SchemaError {
                message: "Maximum schema nesting exceeded, is there a $ref cycle?".to_string(),
                schema_path: scope.schema_path.clone(),
            }
            .into());
        }

        let map = match schema {
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => {
                return Err(make_error(format!("False schema does not allow {}", describe(value)), scope));
            }
            Value::Object(map) => map,
            _ => return Ok(()),
        };

        for (keyword, arg) in map {
            match keyword.as_str() {
                "$ref" => {
                    if let Some(target) = arg.as_str().and_then(|r| resolve_ref(&self.schema, r)) {
                        self.validate_inner(value, target, &scope.reference())?;
                    }
                }
                "type" => validate_type(value, arg, &scope.keyword("type"))?,
                "enum" => {
                    let options = arg.as_array().map(Vec::as_slice).unwrap_or_default();
                    if !options.iter().any(|o| json_equal(o, value)) {
                        let message = format!("{} is not one of {}", describe(value), arg);
                        return Err(make_error(message, &scope.keyword("enum")));
                    }
                }
                "const" => {
                    if !json_equal(arg, value) {
                        return Err(make_error(format!("{} was expected", describe(arg)), &scope.keyword("const")));
                    }
                }
                "not" => {
                    if self.validate_inner(value, arg, &scope.keyword("not")).is_ok() {
                        let message = format!("{} should not be valid under {}", describe(value), arg);
                        return Err(make_error(message, &scope.keyword("not")));
                    }
                }
                "allOf" => {
                    for (idx, sub) in branches(arg).iter().enumerate() {
                        self.validate_inner(value, sub, &scope.item("allOf", &idx.to_string()))?;
                    }
                }
                "anyOf" => {
                    let mut any = false;
                    for (idx, sub) in branches(arg).iter().enumerate() {
                        match self.validate_inner(value, sub, &scope.item("anyOf", &idx.to_string())) {
                            Ok(()) => {
                                any = true;
                                break;
                            }
                            Err(Failure::Schema(e)) => return Err(e.into()),
                            Err(Failure::Invalid(_)) => {}
                        }
                    }
                    if !any {
                        let message = format!("{} is not valid under any of the given schemas", describe(value));
                        return Err(make_error(message, &scope.keyword("anyOf")));
                    }
                }
                "oneOf" => {
                    let mut passed = 0;
                    for (idx, sub) in branches(arg).iter().enumerate() {
                        match self.validate_inner(value, sub, &scope.item("oneOf", &idx.to_string())) {
                            Ok(()) => passed += 1,
                            Err(Failure::Schema(e)) => return Err(e.into()),
                            Err(Failure::Invalid(_)) => {}
                        }
                    }
                    if passed == 0 {
                        let message = format!("{} is not valid under any of the given schemas", describe(value));
                        return Err(make_error(message, &scope.keyword("oneOf")));
                    }
                    if passed > 1 {
                        let message = format!("{} is valid under each of {} of the given schemas", describe(value), passed);
                        return Err(make_error(message, &scope.keyword("oneOf")));
                    }
                }
                "if" => self.validate_conditional(value, map, arg, scope)?,
                _ => {}
            }
        }

        match value {
            Value::Number(_) => validate_num(value, map, scope),
            Value::String(s) => self.validate_str(s, map, scope),
            Value::Array(items) => self.validate_arr(items, map, scope),
            Value::Object(members) => self.validate_obj(members, map, scope),
            Value::Null | Value::Bool(_) => Ok(()),
        }
    }

    fn validate_conditional(&self, value: &Value, map: &Map<String, Value>, cond: &Value, scope: &Scope) -> Result<(), Failure> {
        let branch = match self.validate_inner(value, cond, &scope.keyword("if")) {
            Ok(()) => "then",
            Err(Failure::Invalid(_)) => "else",
            Err(Failure::Schema(e)) => return Err(e.into()),
        };
        match map.get(branch) {
            Some(sub) => self.validate_inner(value, sub, &scope.keyword(branch)),
            None => Ok(()),
        }
    }

    fn validate_str(&self, s: &str, map: &Map<String, Value>, scope: &Scope) -> Result<(), Failure> {
        let len = s.chars().count() as u64;
        if let Some(min) = map.get("minLength").and_then(Value::as_u64) {
            if len < min {
                return Err(make_error(format!("'{s}' is too short"), &scope.keyword("minLength")));
            }
        }
        if let Some(max) = map.get("maxLength").and_then(Value::as_u64) {
            if len > max {
                return Err(make_error(format!("'{s}' is too long"), &scope.keyword("maxLength")));
            }
        }
        if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
            if let Some(regex) = self.regexes.get(pattern) {
                if !regex.is_match(s) {
                    return Err(make_error(format!("'{s}' does not match '{pattern}'"), &scope.keyword("pattern")));
                }
            }
        }
        Ok(())
    }

    fn validate_arr(&self, items: &[Value], map: &Map<String, Value>, scope: &Scope) -> Result<(), Failure> {
        let value = Value::Array(items.to_vec());
        let len = items.len() as u64;
        if let Some(min) = map.get("minItems").and_then(Value::as_u64) {
            if len < min {
                return Err(make_error(format!("{value} is too short"), &scope.keyword("minItems")));
            }
        }
        if let Some(max) = map.get("maxItems").and_then(Value::as_u64) {
            if len > max {
                return Err(make_error(format!("{value} is too long"), &scope.keyword("maxItems")));
            }
        }
        if map.get("uniqueItems") == Some(&Value::Bool(true)) {
            for (i, a) in items.iter().enumerate() {
                if items[i + 1..].iter().any(|b| json_equal(a, b)) {
                    return Err(make_error(format!("{value} has non-unique elements"), &scope.keyword("uniqueItems")));
                }
            }
        }

        match map.get("items") {
            Some(Value::Array(tuple)) => {
                for (idx, (item, sub)) in items.iter().zip(tuple).enumerate() {
                    let step = idx.to_string();
                    self.validate_inner(item, sub, &scope.item("items", &step).at(&step))?;
                }
                if let Some(extra) = map.get("additionalItems") {
                    for (idx, item) in items.iter().enumerate().skip(tuple.len()) {
                        if extra == &Value::Bool(false) {
                            let message = format!("Additional items are not allowed ({} was unexpected)", describe(item));
                            return Err(make_error(message, &scope.keyword("additionalItems")));
                        }
                        self.validate_inner(item, extra, &scope.keyword("additionalItems").at(&idx.to_string()))?;
                    }
                }
            }
            Some(sub) => {
                for (idx, item) in items.iter().enumerate() {
                    self.validate_inner(item, sub, &scope.keyword("items").at(&idx.to_string()))?;
                }
            }
            None => {}
        }

        if let Some(sub) = map.get("contains") {
            let found = items.iter().any(|item| self.validate_inner(item, sub, &scope.keyword("contains")).is_ok());
            if !found {
                let message = format!("{value} does not contain items matching the given schema");
                return Err(make_error(message, &scope.keyword("contains")));
            }
        }
        Ok(())
    }

    fn validate_obj(&self, members: &Map<String, Value>, map: &Map<String, Value>, scope: &Scope) -> Result<(), Failure> {
        let count = members.len() as u64;
        if let Some(min) = map.get("minProperties").and_then(Value::as_u64) {
            if count < min {
                let message = format!("{} does not have enough properties", Value::Object(members.clone()));
                return Err(make_error(message, &scope.keyword("minProperties")));
            }
        }
        if let Some(max) = map.get("maxProperties").and_then(Value::as_u64) {
            if count > max {
                let message = format!("{} has too many properties", Value::Object(members.clone()));
                return Err(make_error(message, &scope.keyword("maxProperties")));
            }
        }
        if let Some(Value::Array(required)) = map.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !members.contains_key(name) {
                    return Err(make_error(format!("'{name}' is a required property"), &scope.keyword("required")));
                }
            }
        }
        if let Some(names) = map.get("propertyNames") {
            for name in members.keys() {
                let key = Value::String(name.clone());
                self.validate_inner(&key, names, &scope.keyword("propertyNames").at(name))?;
            }
        }

        let properties = map.get("properties").and_then(Value::as_object);
        let patterns = map.get("patternProperties").and_then(Value::as_object);
        let mut unexpected = Vec::new();

        for (name, member) in members {
            let mut covered = false;
            if let Some(sub) = properties.and_then(|p| p.get(name)) {
                covered = true;
                self.validate_inner(member, sub, &scope.item("properties", name).at(name))?;
            }
            for (pattern, sub) in patterns.into_iter().flatten() {
                let Some(regex) = self.regexes.get(pattern) else { continue };
                if regex.is_match(name) {
                    covered = true;
                    self.validate_inner(member, sub, &scope.item("patternProperties", pattern).at(name))?;
                }
            }
            if !covered {
                unexpected.push((name, member));
            }
        }

        match map.get("additionalProperties") {
            Some(Value::Bool(false)) if !unexpected.is_empty() => {
                let names: Vec<String> = unexpected.iter().map(|(n, _)| format!("'{n}'")).collect();
                let verb = if names.len() == 1 { "was" } else { "were" };
                let message = format!("Additional properties are not allowed ({} {verb} unexpected)", names.join(", "));
                Err(make_error(message, &scope.keyword("additionalProperties")))
            }
            Some(sub @ Value::Object(_)) => {
                for (name, member) in unexpected {
                    self.validate_inner(member, sub, &scope.keyword("additionalProperties").at(name))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn validate_type(value: &Value, arg: &Value, scope: &Scope) -> Result<(), Failure> {
    let names: Vec<&str> = match arg {
        Value::String(name) => vec![name.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return Ok(()),
    };
    if names.iter().any(|name| is_type(value, name)) {
        return Ok(());
    }
    let expected: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    Err(make_error(format!("{} is not of type {}", describe(value), expected.join(", ")), scope))
}

fn is_type(value: &Value, name: &str) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "number" => value.is_number(),
        "string" => value.is_string(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => false,
    }
}

fn validate_num(value: &Value, map: &Map<String, Value>, scope: &Scope) -> Result<(), Failure> {
    let Some(num) = value.as_f64() else { return Ok(()) };
    let bound = |keyword: &str| map.get(keyword).and_then(Value::as_f64);

    if let Some(min) = bound("minimum") {
        if num < min {
            return Err(make_error(format!("{value} is less than the minimum of {}", map["minimum"]), &scope.keyword("minimum")));
        }
    }
    if let Some(max) = bound("maximum") {
        if num > max {
            return Err(make_error(format!("{value} is greater than the maximum of {}", map["maximum"]), &scope.keyword("maximum")));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if num <= min {
            let message = format!("{value} is less than or equal to the minimum of {}", map["exclusiveMinimum"]);
            return Err(make_error(message, &scope.keyword("exclusiveMinimum")));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if num >= max {
            let message = format!("{value} is greater than or equal to the maximum of {}", map["exclusiveMaximum"]);
            return Err(make_error(message, &scope.keyword("exclusiveMaximum")));
        }
    }
    if let Some(step) = bound("multipleOf") {
        let quotient = num / step;
        if (quotient - quotient.round()).abs() > 1e-9 {
            return Err(make_error(format!("{value} is not a multiple of {}", map["multipleOf"]), &scope.keyword("multipleOf")));
        }
    }
    Ok(())
}

fn branches(arg: &Value) -> &[Value] {
    arg.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn make_error(message: String, scope: &Scope) -> Failure {
    Failure::Invalid(ValidationError {
        message,
        schema_path: scope.schema_path.clone(),
        instance_path: scope.instance_path.clone(),
    })
}

/// Render a value the way messages quote it: strings in single quotes.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`).
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .map(|(a, b)| a == b)
            .unwrap_or(false),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).map(|bv| json_equal(v, bv)).unwrap_or(false))
        }
        _ => false,
    }
}
