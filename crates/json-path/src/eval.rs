//! JSONPath evaluator.

use std::cmp::Ordering;

use crate::types::*;
use serde_json::Value;

/// JSONPath evaluator.
pub struct JsonPathEval;

impl JsonPathEval {
    /// Evaluate a JSONPath against a JSON document.
    ///
    /// Returns a vector of references to matching values.
    pub fn eval<'a>(path: &JSONPath, doc: &'a Value) -> Vec<&'a Value> {
        Self::find(path, doc).into_iter().map(|m| m.value).collect()
    }

    /// Evaluate a JSONPath and report where each match was found.
    ///
    /// Matches come out in traversal order: document order for wildcards
    /// and descendant segments, declaration order for unions. The same node
    /// can appear more than once when several selectors reach it.
    pub fn find<'a>(path: &JSONPath, doc: &'a Value) -> Vec<Match<'a>> {
        Self::find_from(path, doc, doc, NormalizedPath::default())
    }

    fn find_from<'a>(
        path: &JSONPath,
        root: &Value,
        start: &'a Value,
        start_path: NormalizedPath,
    ) -> Vec<Match<'a>> {
        let mut results = vec![Match { value: start, path: start_path }];

        for segment in &path.segments {
            let mut next = Vec::new();
            for current in &results {
                if segment.recursive {
                    Self::eval_recursive(root, current.value, &current.path, &segment.selectors, &mut next);
                } else {
                    for selector in &segment.selectors {
                        Self::eval_selector(root, current.value, &current.path, selector, &mut next);
                    }
                }
            }
            results = next;
        }

        results
    }

    fn eval_recursive<'a>(
        root: &Value,
        value: &'a Value,
        current_path: &NormalizedPath,
        selectors: &[Selector],
        results: &mut Vec<Match<'a>>,
    ) {
        for selector in selectors {
            Self::eval_selector(root, value, current_path, selector, results);
        }

        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_path = current_path.child(Segment::Field(key.clone()));
                    Self::eval_recursive(root, child, &child_path, selectors, results);
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    let child_path = current_path.child(Segment::Index(idx));
                    Self::eval_recursive(root, child, &child_path, selectors, results);
                }
            }
            _ => {}
        }
    }

    fn eval_selector<'a>(
        root: &Value,
        value: &'a Value,
        current_path: &NormalizedPath,
        selector: &Selector,
        results: &mut Vec<Match<'a>>,
    ) {
        let mut push = |child: &'a Value, step: Segment| {
            results.push(Match { value: child, path: current_path.child(step) });
        };

        match selector {
            Selector::Name(name) => {
                if let Value::Object(map) = value {
                    if let Some(child) = map.get(name) {
                        push(child, Segment::Field(name.clone()));
                    }
                }
            }
            Selector::Index(index) => {
                if let Value::Array(arr) = value {
                    if let Some(idx) = Self::resolve_index(*index, arr.len()) {
                        push(&arr[idx], Segment::Index(idx));
                    }
                }
            }
            Selector::Wildcard => match value {
                Value::Object(map) => {
                    for (key, child) in map {
                        push(child, Segment::Field(key.clone()));
                    }
                }
                Value::Array(arr) => {
                    for (idx, child) in arr.iter().enumerate() {
                        push(child, Segment::Index(idx));
                    }
                }
                _ => {}
            },
            Selector::Slice { start, end, step } => {
                if let Value::Array(arr) = value {
                    for idx in Self::slice_indices(*start, *end, *step, arr.len()) {
                        push(&arr[idx], Segment::Index(idx));
                    }
                }
            }
            Selector::Filter(expr) => match value {
                Value::Object(map) => {
                    for (key, child) in map {
                        if Self::eval_filter(expr, child, root) {
                            push(child, Segment::Field(key.clone()));
                        }
                    }
                }
                Value::Array(arr) => {
                    for (idx, child) in arr.iter().enumerate() {
                        if Self::eval_filter(expr, child, root) {
                            push(child, Segment::Index(idx));
                        }
                    }
                }
                _ => {}
            },
        }
    }

    fn resolve_index(index: isize, len: usize) -> Option<usize> {
        let idx = if index < 0 { len as isize + index } else { index };
        if idx >= 0 && (idx as usize) < len {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Indices selected by `[start:end:step]`, in selection order.
    fn slice_indices(start: Option<isize>, end: Option<isize>, step: Option<isize>, len: usize) -> Vec<usize> {
        let len = len as isize;
        let step = step.unwrap_or(1);
        let normalize = |i: isize| if i < 0 { len + i } else { i };
        let mut out = Vec::new();

        if step > 0 {
            let lower = start.map(normalize).unwrap_or(0).clamp(0, len);
            let upper = end.map(normalize).unwrap_or(len).clamp(0, len);
            let mut i = lower;
            while i < upper {
                out.push(i as usize);
                let Some(next) = i.checked_add(step) else { break };
                i = next;
            }
        } else if step < 0 {
            let upper = start.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
            let lower = end.map(normalize).unwrap_or(-len - 1).clamp(-1, len - 1);
            let mut i = upper;
            while lower < i {
                out.push(i as usize);
                let Some(next) = i.checked_add(step) else { break };
                i = next;
            }
        }

        out
    }

    fn eval_filter(expr: &FilterExpression, current: &Value, root: &Value) -> bool {
        match expr {
            FilterExpression::Existence { path, from_root } => {
                let base = if *from_root { root } else { current };
                !Self::find_from(path, root, base, NormalizedPath::default()).is_empty()
            }
            FilterExpression::Literal(value) => Self::is_truthy(value),
            FilterExpression::Comparison { operator, left, right } => {
                let left_val = Self::eval_value_expr(left, current, root);
                let right_val = Self::eval_value_expr(right, current, root);
                Self::compare(*operator, left_val, right_val)
            }
            FilterExpression::Logical { operator, left, right } => match operator {
                LogicalOperator::And => {
                    Self::eval_filter(left, current, root) && Self::eval_filter(right, current, root)
                }
                LogicalOperator::Or => {
                    Self::eval_filter(left, current, root) || Self::eval_filter(right, current, root)
                }
            },
            FilterExpression::Negation(expr) => !Self::eval_filter(expr, current, root),
            FilterExpression::Paren(expr) => Self::eval_filter(expr, current, root),
        }
    }

    fn is_truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// A filter operand; `None` when a path selects nothing.
    fn eval_value_expr<'a>(expr: &'a ValueExpression, current: &'a Value, root: &'a Value) -> Option<&'a Value> {
        match expr {
            ValueExpression::Current => Some(current),
            ValueExpression::Literal(v) => Some(v),
            ValueExpression::Path(path) => Self::single(path, root, current),
            ValueExpression::RootPath(path) => Self::single(path, root, root),
        }
    }

    fn single<'a>(path: &JSONPath, root: &Value, base: &'a Value) -> Option<&'a Value> {
        Self::find_from(path, root, base, NormalizedPath::default())
            .into_iter()
            .next()
            .map(|m| m.value)
    }

    fn compare(operator: ComparisonOperator, left: Option<&Value>, right: Option<&Value>) -> bool {
        match (left, right) {
            (None, None) => matches!(
                operator,
                ComparisonOperator::Equal | ComparisonOperator::LessEqual | ComparisonOperator::GreaterEqual
            ),
            (Some(l), Some(r)) => {
                // Numbers compare by value so `1` and `1.0` are equal.
                let ord = Self::compare_values(l, r);
                let equal = match (l, r) {
                    (Value::Number(_), Value::Number(_)) => ord == Some(Ordering::Equal),
                    _ => l == r,
                };
                match operator {
                    ComparisonOperator::Equal => equal,
                    ComparisonOperator::NotEqual => !equal,
                    ComparisonOperator::Less => ord == Some(Ordering::Less),
                    ComparisonOperator::LessEqual => equal || ord == Some(Ordering::Less),
                    ComparisonOperator::Greater => ord == Some(Ordering::Greater),
                    ComparisonOperator::GreaterEqual => equal || ord == Some(Ordering::Greater),
                }
            }
            _ => operator == ComparisonOperator::NotEqual,
        }
    }

    fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}
