//! Query, add, update and delete by JSONPath.
//!
//! Matches are located first and then re-resolved one by one in the working
//! document by their normalized path. A match that was detached by an
//! earlier edit in the same call (its ancestor was replaced or removed) is
//! skipped, the same as writing into a node that is no longer part of the
//! document.

use jsonlib_json_path::{json_path_to_string, JSONPath, JsonPathEval, JsonPathParser, NormalizedPath, Segment};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{JsonLibraryError, Result};

/// Editor configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorOptions {
    /// Write each edit back into the caller's document.
    ///
    /// Off by default. With it on, `add`, `update` and `delete` also replace
    /// the document they are given with the result, but only once the whole
    /// edit has succeeded.
    pub mutate_in_place: bool,
}

/// Runs the editing operations under one set of [`EditorOptions`].
#[derive(Debug, Clone, Default)]
pub struct JsonEditor {
    options: EditorOptions,
}

impl JsonEditor {
    pub fn new(options: EditorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EditorOptions {
        self.options
    }

    /// Values of every match, in match order, duplicates included.
    pub fn get_value(&self, doc: &Value, path: &str, fail_on_empty: bool) -> Result<Vec<Value>> {
        get_value_from_json(doc, path, fail_on_empty)
    }

    /// Merge `value` into matched objects, append it to matched arrays, or
    /// create the last key under the parent when nothing matches.
    pub fn add_object(&self, doc: &mut Value, path: &str, value: &Value) -> Result<Value> {
        self.edit(doc, |target| apply_add(target, path, value))
    }

    /// Replace every matched value with `new_value`.
    pub fn update_value(&self, doc: &mut Value, path: &str, new_value: &Value) -> Result<Value> {
        self.edit(doc, |target| apply_update(target, path, new_value))
    }

    /// Remove every matched value from its container.
    pub fn delete_object(&self, doc: &mut Value, path: &str) -> Result<Value> {
        self.edit(doc, |target| apply_delete(target, path))
    }

    fn edit<F>(&self, doc: &mut Value, op: F) -> Result<Value>
    where
        F: FnOnce(&mut Value) -> Result<()>,
    {
        let mut working = doc.clone();
        op(&mut working)?;
        if self.options.mutate_in_place {
            doc.clone_from(&working);
        }
        Ok(working)
    }
}

/// Compile a path expression, reporting the expression on failure.
pub fn compile(path: &str) -> Result<JSONPath> {
    JsonPathParser::parse(path).map_err(|source| JsonLibraryError::PathSyntax {
        expr: path.to_string(),
        source,
    })
}

fn locate(path: &JSONPath, doc: &Value) -> Vec<NormalizedPath> {
    JsonPathEval::find(path, doc).into_iter().map(|m| m.path).collect()
}

/// Values matched by `path`. An empty result is an error only with
/// `fail_on_empty`.
pub fn get_value_from_json(doc: &Value, path: &str, fail_on_empty: bool) -> Result<Vec<Value>> {
    let compiled = compile(path)?;
    let values: Vec<Value> = JsonPathEval::eval(&compiled, doc).into_iter().cloned().collect();
    if fail_on_empty && values.is_empty() {
        return Err(JsonLibraryError::EmptyResult { path: path.to_string() });
    }
    Ok(values)
}

/// Copy-on-write add. `doc` and `value` are left untouched.
pub fn add_object_to_json(doc: &Value, path: &str, value: &Value) -> Result<Value> {
    let mut working = doc.clone();
    apply_add(&mut working, path, value)?;
    Ok(working)
}

/// Copy-on-write update. A path with no match returns an unchanged copy.
pub fn update_value_to_json(doc: &Value, path: &str, new_value: &Value) -> Result<Value> {
    let mut working = doc.clone();
    apply_update(&mut working, path, new_value)?;
    Ok(working)
}

/// Copy-on-write delete. A path with no match returns an unchanged copy.
pub fn delete_object_from_json(doc: &Value, path: &str) -> Result<Value> {
    let mut working = doc.clone();
    apply_delete(&mut working, path)?;
    Ok(working)
}

fn apply_add(doc: &mut Value, path: &str, value: &Value) -> Result<()> {
    let compiled = compile(path)?;
    let targets = locate(&compiled, doc);

    if targets.is_empty() {
        return add_under_parent(doc, path, &compiled, value);
    }

    // Keys overwritten by a merge; matches below them are detached.
    let mut replaced: Vec<NormalizedPath> = Vec::new();
    for target in &targets {
        if is_detached(target, &replaced) {
            debug!(path = %target, "skipping match detached by an earlier merge");
            continue;
        }
        let Some(node) = target.resolve_mut(doc) else {
            debug!(path = %target, "match no longer resolves");
            continue;
        };
        match node {
            Value::Object(map) => {
                let Value::Object(extra) = value else {
                    return Err(JsonLibraryError::InvalidMerge { path: target.to_string() });
                };
                merge_into(map, extra);
                replaced.extend(extra.keys().map(|key| child_of(target, Segment::Field(key.clone()))));
            }
            Value::Array(arr) => arr.push(value.clone()),
            _ => {}
        }
    }
    Ok(())
}

/// Nothing matched: set the final name under each match of the parent path.
fn add_under_parent(doc: &mut Value, path: &str, compiled: &JSONPath, value: &Value) -> Result<()> {
    let Some((parent, name)) = compiled.split_last_name() else {
        return Err(JsonLibraryError::NoMatch { path: path.to_string() });
    };
    let parent_expr = json_path_to_string(&parent);
    let parents = locate(&parent, doc);
    if parents.is_empty() {
        return Err(JsonLibraryError::NoMatch { path: parent_expr });
    }

    debug!(parent = %parent_expr, key = %name, "no match, adding key under parent");
    for target in &parents {
        if let Some(Value::Object(map)) = target.resolve_mut(doc) {
            map.insert(name.clone(), value.clone());
        }
    }
    Ok(())
}

/// Existing keys keep their position; new keys are appended in order.
fn merge_into(map: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, val) in extra {
        map.insert(key.clone(), val.clone());
    }
}

fn apply_update(doc: &mut Value, path: &str, new_value: &Value) -> Result<()> {
    let compiled = compile(path)?;
    let targets = locate(&compiled, doc);

    let mut replaced: Vec<NormalizedPath> = Vec::new();
    for target in targets {
        if is_detached(&target, &replaced) {
            debug!(path = %target, "skipping match below a replaced value");
            continue;
        }
        let Some((container, segment)) = container_of(doc, &target) else {
            debug!(path = %target, "match has no container, skipping");
            continue;
        };
        let written = match (container, segment) {
            (Value::Array(arr), Segment::Index(idx)) => match arr.get_mut(*idx) {
                Some(slot) => {
                    *slot = new_value.clone();
                    true
                }
                None => false,
            },
            (Value::Object(map), Segment::Field(name)) => match map.get_mut(name) {
                Some(slot) => {
                    *slot = new_value.clone();
                    true
                }
                None => false,
            },
            _ => false,
        };
        if written {
            replaced.push(target);
        }
    }
    Ok(())
}

fn apply_delete(doc: &mut Value, path: &str) -> Result<()> {
    let compiled = compile(path)?;

    // Reverse match order, then group by container. Deeper containers go
    // first and indices are removed highest first, so no removal shifts a
    // position that is still waiting to be removed.
    let mut groups: Vec<(NormalizedPath, Vec<Segment>)> = Vec::new();
    for target in locate(&compiled, doc).into_iter().rev() {
        let (Some(container), Some(segment)) = (target.parent(), target.last().cloned()) else {
            debug!("root match cannot be deleted, skipping");
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == container) {
            Some((_, segments)) => segments.push(segment),
            None => groups.push((container, vec![segment])),
        }
    }
    groups.sort_by(|(a, _), (b, _)| b.steps().len().cmp(&a.steps().len()));

    for (container, mut segments) in groups {
        let Some(node) = container.resolve_mut(doc) else {
            debug!(path = %container, "container was removed earlier, skipping");
            continue;
        };
        match node {
            Value::Array(arr) => {
                let mut indices: Vec<usize> = segments
                    .drain(..)
                    .filter_map(|s| match s {
                        Segment::Index(idx) => Some(idx),
                        Segment::Field(_) => None,
                    })
                    .collect();
                indices.sort_unstable_by(|a, b| b.cmp(a));
                indices.dedup();
                for idx in indices {
                    if idx < arr.len() {
                        arr.remove(idx);
                    }
                }
            }
            Value::Object(map) => {
                for segment in segments {
                    if let Segment::Field(name) = segment {
                        map.shift_remove(&name);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Split a match into its mutable container and its position there.
fn container_of<'d, 'p>(doc: &'d mut Value, target: &'p NormalizedPath) -> Option<(&'d mut Value, &'p Segment)> {
    let segment = target.last()?;
    let container = target.parent()?.resolve_mut(doc)?;
    Some((container, segment))
}

fn child_of(path: &NormalizedPath, step: Segment) -> NormalizedPath {
    let mut steps = path.steps().to_vec();
    steps.push(step);
    NormalizedPath::new(steps)
}

/// A match at or below an already replaced location no longer belongs to
/// the working document.
fn is_detached(target: &NormalizedPath, replaced: &[NormalizedPath]) -> bool {
    replaced.iter().any(|r| target == r || target.is_descendant_of(r))
}
