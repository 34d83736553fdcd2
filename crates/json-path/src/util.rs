//! JSONPath utility helpers.

use crate::types::{
    ComparisonOperator, FilterExpression, JSONPath, LogicalOperator, PathSegment, Selector, ValueExpression,
};

/// Convert JSONPath AST to string representation.
pub fn json_path_to_string(path: &JSONPath) -> String {
    let mut out = String::from("$");
    push_segments(&mut out, path);
    out
}

fn push_segments(out: &mut String, path: &JSONPath) {
    for segment in &path.segments {
        out.push_str(&segment_to_string(segment));
    }
}

fn segment_to_string(segment: &PathSegment) -> String {
    let prefix = if segment.recursive { ".." } else { "" };
    if let [selector] = segment.selectors.as_slice() {
        match selector {
            Selector::Name(name) if is_identifier(name) => {
                return if segment.recursive { format!("..{name}") } else { format!(".{name}") };
            }
            Selector::Wildcard => {
                return if segment.recursive { String::from("..*") } else { String::from(".*") };
            }
            _ => {}
        }
    }
    let joined = segment
        .selectors
        .iter()
        .map(selector_to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{prefix}[{joined}]")
}

fn selector_to_string(selector: &Selector) -> String {
    match selector {
        Selector::Name(name) => format!("'{}'", escape_single_quoted(name)),
        Selector::Index(index) => index.to_string(),
        Selector::Slice { start, end, step } => {
            let mut s = String::new();
            if let Some(v) = start {
                s.push_str(&v.to_string());
            }
            s.push(':');
            if let Some(v) = end {
                s.push_str(&v.to_string());
            }
            if let Some(v) = step {
                s.push(':');
                s.push_str(&v.to_string());
            }
            s
        }
        Selector::Wildcard => String::from("*"),
        Selector::Filter(expr @ FilterExpression::Paren(_)) => format!("?{}", filter_to_string(expr)),
        Selector::Filter(expr) => format!("?({})", filter_to_string(expr)),
    }
}

fn filter_to_string(expr: &FilterExpression) -> String {
    match expr {
        FilterExpression::Comparison { operator, left, right } => {
            format!("{}{}{}", value_to_string(left), comparison_symbol(*operator), value_to_string(right))
        }
        FilterExpression::Logical { operator, left, right } => {
            let op = match operator {
                LogicalOperator::And => "&&",
                LogicalOperator::Or => "||",
            };
            format!("{}{}{}", filter_to_string(left), op, filter_to_string(right))
        }
        FilterExpression::Existence { path, from_root } => {
            let mut s = String::from(if *from_root { "$" } else { "@" });
            push_segments(&mut s, path);
            s
        }
        FilterExpression::Literal(value) => value.to_string(),
        FilterExpression::Paren(inner) => format!("({})", filter_to_string(inner)),
        FilterExpression::Negation(inner) => format!("!{}", filter_to_string(inner)),
    }
}

fn value_to_string(expr: &ValueExpression) -> String {
    match expr {
        ValueExpression::Current => String::from("@"),
        ValueExpression::Literal(value) => match value {
            serde_json::Value::String(s) => format!("'{}'", escape_single_quoted(s)),
            other => other.to_string(),
        },
        ValueExpression::Path(path) => {
            let mut s = String::from("@");
            push_segments(&mut s, path);
            s
        }
        ValueExpression::RootPath(path) => json_path_to_string(path),
    }
}

fn comparison_symbol(operator: ComparisonOperator) -> &'static str {
    match operator {
        ComparisonOperator::Equal => "==",
        ComparisonOperator::NotEqual => "!=",
        ComparisonOperator::Less => "<",
        ComparisonOperator::LessEqual => "<=",
        ComparisonOperator::Greater => ">",
        ComparisonOperator::GreaterEqual => ">=",
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn escape_single_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonPathParser;

    fn round_trip(expr: &str) -> String {
        json_path_to_string(&JsonPathParser::parse(expr).unwrap())
    }

    #[test]
    fn stringify_basic_and_recursive_paths() {
        assert_eq!(round_trip("$.store.*..title"), "$.store.*..title");
        assert_eq!(round_trip("$..*"), "$..*");
        assert_eq!(round_trip("$"), "$");
    }

    #[test]
    fn stringify_brackets_unions_and_slices() {
        assert_eq!(round_trip("$['store name'][0]"), "$['store name'][0]");
        assert_eq!(round_trip("$[0, 2]"), "$[0,2]");
        assert_eq!(round_trip("$[1:5:2]"), "$[1:5:2]");
        assert_eq!(round_trip("$..['it\\'s']"), "$..['it\\'s']");
    }

    #[test]
    fn stringify_filters() {
        assert_eq!(
            round_trip("$.bankAccounts[?(@.amount >= 100 && !@.closed)].bank"),
            "$.bankAccounts[?(@.amount>=100&&!@.closed)].bank"
        );
        assert_eq!(round_trip("$[?(@.name == 'x')]"), "$[?(@.name=='x')]");
    }

    #[test]
    fn stringified_paths_parse_to_the_same_tree() {
        for expr in ["$..address.streetAddress", "$.a[?(@.b<$.c)]", "$[::-1]", "$['a.b'].c"] {
            let parsed = JsonPathParser::parse(expr).unwrap();
            let again = JsonPathParser::parse(&json_path_to_string(&parsed)).unwrap();
            assert_eq!(parsed, again, "{expr}");
        }
    }
}
