//! JSONPath types: the compiled expression tree and the located matches it
//! produces.

use std::fmt;

use serde_json::Value;

/// Selector types for JSONPath.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Named selector for property access: `.name`, `['key']`
    Name(String),
    /// Index selector for array element access: `[0]`, `[-1]`
    Index(isize),
    /// Slice selector for array slicing: `[start:end:step]`
    Slice { start: Option<isize>, end: Option<isize>, step: Option<isize> },
    /// Wildcard selector for selecting all elements: `.*`, `[*]`
    Wildcard,
    /// Filter expression for conditional selection: `[?(@.price < 10)]`
    Filter(FilterExpression),
}

/// Path segment containing one or more selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    /// Selectors in this segment, in declaration order.
    pub selectors: Vec<Selector>,
    /// Whether this is a recursive descent segment (`..`).
    pub recursive: bool,
}

impl PathSegment {
    pub fn new(selectors: Vec<Selector>, recursive: bool) -> Self {
        Self { selectors, recursive }
    }
}

/// Complete JSONPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JSONPath {
    /// Path segments.
    pub segments: Vec<PathSegment>,
}

impl JSONPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Split off a trailing `.name` / `['name']` segment.
    ///
    /// Returns the parent expression and the name, or `None` when the path
    /// is the bare root or ends in anything other than a single,
    /// non-recursive name selector.
    pub fn split_last_name(&self) -> Option<(JSONPath, String)> {
        let (last, parent) = self.segments.split_last()?;
        if last.recursive || last.selectors.len() != 1 {
            return None;
        }
        match &last.selectors[0] {
            Selector::Name(name) => Some((JSONPath::new(parent.to_vec()), name.clone())),
            _ => None,
        }
    }
}

/// Filter expression types.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// Comparison expression: `@.price < 10`
    Comparison {
        operator: ComparisonOperator,
        left: ValueExpression,
        right: ValueExpression,
    },
    /// Logical expression: `@.a && @.b`
    Logical {
        operator: LogicalOperator,
        left: Box<FilterExpression>,
        right: Box<FilterExpression>,
    },
    /// Existence test: `@.name`
    Existence { path: JSONPath, from_root: bool },
    /// Truthiness of a literal: `true`
    Literal(Value),
    /// Parenthesized expression: `(@.a || @.b)`
    Paren(Box<FilterExpression>),
    /// Negation: `!@.flag`
    Negation(Box<FilterExpression>),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And, // &&
    Or,  // ||
}

/// Value expressions in filters.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpression {
    /// Current node: `@`
    Current,
    /// Literal value: `"string"`, `42`, `true`, `null`
    Literal(Value),
    /// Path relative to the current node: `@.name`
    Path(JSONPath),
    /// Path relative to the document root: `$.limit`
    RootPath(JSONPath),
}

/// Position of a match inside its immediate container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Position in an array.
    Index(usize),
    /// Key in an object.
    Field(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(idx) => write!(f, "[{idx}]"),
            Segment::Field(name) => {
                write!(f, "['")?;
                for ch in name.chars() {
                    match ch {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        _ => write!(f, "{ch}")?,
                    }
                }
                write!(f, "']")
            }
        }
    }
}

/// Location of a node as a list of steps from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedPath(Vec<Segment>);

impl NormalizedPath {
    pub fn new(steps: Vec<Segment>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Path of the container holding this node.
    pub fn parent(&self) -> Option<NormalizedPath> {
        self.0.split_last().map(|(_, rest)| NormalizedPath(rest.to_vec()))
    }

    /// Whether `self` lies strictly below `other`.
    pub fn is_descendant_of(&self, other: &NormalizedPath) -> bool {
        self.0.len() > other.0.len() && self.0.starts_with(&other.0)
    }

    pub(crate) fn child(&self, step: Segment) -> NormalizedPath {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(step);
        NormalizedPath(steps)
    }

    /// Follow the path in `doc`.
    pub fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(doc, |node, step| match (node, step) {
            (Value::Array(arr), Segment::Index(idx)) => arr.get(*idx),
            (Value::Object(map), Segment::Field(name)) => map.get(name),
            _ => None,
        })
    }

    /// Follow the path in `doc` mutably.
    pub fn resolve_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        self.0.iter().try_fold(doc, |node, step| match (node, step) {
            (Value::Array(arr), Segment::Index(idx)) => arr.get_mut(*idx),
            (Value::Object(map), Segment::Field(name)) => map.get_mut(name),
            _ => None,
        })
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// A node selected by a JSONPath, together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    /// The matched value.
    pub value: &'a Value,
    /// Normalized path from the root to `value`.
    pub path: NormalizedPath,
}

impl<'a> Match<'a> {
    /// How the value sits in its container. `None` for the root.
    pub fn segment(&self) -> Option<&Segment> {
        self.path.last()
    }

    /// Path of the containing array or object. `None` for the root.
    pub fn context_path(&self) -> Option<NormalizedPath> {
        self.path.parent()
    }

    /// The containing array or object, looked up in `doc`.
    pub fn context(&self, doc: &'a Value) -> Option<&'a Value> {
        self.context_path().and_then(|p| p.resolve(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalized_path_display() {
        let path = NormalizedPath::new(vec![
            Segment::Field("phoneNumbers".into()),
            Segment::Index(0),
            Segment::Field("it's".into()),
        ]);
        assert_eq!(path.to_string(), r"$['phoneNumbers'][0]['it\'s']");
        assert_eq!(NormalizedPath::default().to_string(), "$");
    }

    #[test]
    fn resolve_follows_steps_and_rejects_kind_mismatch() {
        let doc = json!({"a": [{"b": 1}]});
        let ok = NormalizedPath::new(vec![
            Segment::Field("a".into()),
            Segment::Index(0),
            Segment::Field("b".into()),
        ]);
        assert_eq!(ok.resolve(&doc), Some(&json!(1)));

        let wrong = NormalizedPath::new(vec![Segment::Index(0)]);
        assert_eq!(wrong.resolve(&doc), None);
    }

    #[test]
    fn resolve_mut_allows_in_place_write() {
        let mut doc = json!({"a": [1, 2]});
        let path = NormalizedPath::new(vec![Segment::Field("a".into()), Segment::Index(1)]);
        *path.resolve_mut(&mut doc).unwrap() = json!(5);
        assert_eq!(doc, json!({"a": [1, 5]}));
    }

    #[test]
    fn descendant_relation() {
        let a = NormalizedPath::new(vec![Segment::Field("a".into())]);
        let ab = a.child(Segment::Index(3));
        assert!(ab.is_descendant_of(&a));
        assert!(!a.is_descendant_of(&ab));
        assert!(!a.is_descendant_of(&a));
        assert_eq!(ab.parent(), Some(a));
    }

    #[test]
    fn split_last_name_only_for_plain_names() {
        let path = JSONPath::new(vec![
            PathSegment::new(vec![Selector::Name("a".into())], true),
            PathSegment::new(vec![Selector::Name("b".into())], false),
        ]);
        let (parent, name) = path.split_last_name().unwrap();
        assert_eq!(name, "b");
        assert_eq!(parent.segments.len(), 1);

        let idx = JSONPath::new(vec![PathSegment::new(vec![Selector::Index(0)], false)]);
        assert!(idx.split_last_name().is_none());

        let recursive = JSONPath::new(vec![PathSegment::new(vec![Selector::Name("a".into())], true)]);
        assert!(recursive.split_last_name().is_none());

        assert!(JSONPath::new(vec![]).split_last_name().is_none());
    }
}
