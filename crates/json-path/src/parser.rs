//! JSONPath parser.
//!
//! Recursive descent straight over the expression text. Offsets reported in
//! errors are byte offsets.

use crate::types::*;
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected root identifier '$' at start")]
    ExpectedRoot,
    #[error("Unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Invalid selector at offset {0}")]
    InvalidSelector(usize),
    #[error("Unexpected trailing input at offset {0}: '{1}'")]
    TrailingInput(usize, String),
}

/// Two-character operators come before their one-character prefixes.
const COMPARISON_OPERATORS: [(&str, ComparisonOperator); 6] = [
    ("==", ComparisonOperator::Equal),
    ("!=", ComparisonOperator::NotEqual),
    ("<=", ComparisonOperator::LessEqual),
    (">=", ComparisonOperator::GreaterEqual),
    ("<", ComparisonOperator::Less),
    (">", ComparisonOperator::Greater),
];

type FilterResult = Result<FilterExpression, ParseError>;

/// JSONPath parser.
pub struct JsonPathParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> JsonPathParser<'a> {
    /// Parse a complete expression. Anything left after the path is an error.
    pub fn parse(input: &'a str) -> Result<JSONPath, ParseError> {
        let mut parser = Self { src: input, pos: 0 };
        parser.skip_ws();
        if !parser.eat('$') {
            return Err(ParseError::ExpectedRoot);
        }
        let segments = parser.segments(false)?;
        parser.skip_ws();
        match parser.rest() {
            "" => Ok(JSONPath::new(segments)),
            rest => Err(ParseError::TrailingInput(parser.pos, rest.to_string())),
        }
    }

    fn segments(&mut self, in_filter: bool) -> Result<Vec<PathSegment>, ParseError> {
        let mut segments = Vec::new();
        loop {
            if in_filter {
                self.skip_ws();
                if self.at_filter_boundary() {
                    break;
                }
            }
            let segment = if self.eat_str("..") {
                PathSegment::new(self.member_selectors()?, true)
            } else if self.eat('.') {
                PathSegment::new(self.member_selectors()?, false)
            } else if self.peek() == Some('[') {
                PathSegment::new(self.bracket()?, false)
            } else {
                break;
            };
            segments.push(segment);
        }
        Ok(segments)
    }

    /// What follows `.` or `..`: `*`, a bare name, or a bracketed list
    /// (so `$.[0]` reads as `$[0]`).
    fn member_selectors(&mut self) -> Result<Vec<Selector>, ParseError> {
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(vec![Selector::Wildcard])
            }
            Some('[') => self.bracket(),
            _ => Ok(vec![Selector::Name(self.name()?)]),
        }
    }

    fn bracket(&mut self) -> Result<Vec<Selector>, ParseError> {
        self.expect('[')?;
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.selector()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(selectors),
                Some(c) => return Err(ParseError::UnexpectedChar(c, self.pos - c.len_utf8())),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn selector(&mut self) -> Result<Selector, ParseError> {
        match self.peek() {
            Some('\'' | '"') => self.string().map(Selector::Name),
            Some('*') => {
                self.bump();
                Ok(Selector::Wildcard)
            }
            Some('?') => {
                self.bump();
                self.disjunction().map(Selector::Filter)
            }
            Some(':' | '-' | '0'..='9') => self.index_or_slice(),
            Some(_) => Err(ParseError::InvalidSelector(self.pos)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn index_or_slice(&mut self) -> Result<Selector, ParseError> {
        let start = self.int()?;
        self.skip_ws();
        if !self.eat(':') {
            return start.map(Selector::Index).ok_or(ParseError::InvalidSelector(self.pos));
        }
        let end = self.int()?;
        self.skip_ws();
        let step = if self.eat(':') { self.int()? } else { None };
        Ok(Selector::Slice { start, end, step })
    }

    /// An optional signed integer.
    fn int(&mut self) -> Result<Option<isize>, ParseError> {
        self.skip_ws();
        if !matches!(self.peek(), Some('-' | '0'..='9')) {
            return Ok(None);
        }
        let start = self.pos;
        self.eat('-');
        self.digits();
        self.src[start..self.pos]
            .parse()
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber)
    }

    fn name(&mut self) -> Result<String, ParseError> {
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if !name.is_empty() {
            return Ok(name.to_string());
        }
        Err(match self.peek() {
            Some(c) => ParseError::UnexpectedChar(c, self.pos),
            None => ParseError::UnexpectedEnd,
        })
    }

    /// A string in single or double quotes.
    fn string(&mut self) -> Result<String, ParseError> {
        let quote = self.bump().ok_or(ParseError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnclosedString),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        Ok(match self.bump() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{08}',
            Some('f') => '\u{0C}',
            Some(c @ ('/' | '\\' | '\'' | '"')) => c,
            Some('u') => return self.unicode_escape(),
            _ => return Err(ParseError::InvalidEscape),
        })
    }

    /// `\uXXXX`; a high surrogate must be followed by an escaped low one.
    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.eat_str("\\u") {
                return Err(ParseError::InvalidEscape);
            }
            let low = self.hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(ParseError::InvalidEscape);
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or(ParseError::InvalidEscape)
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let src = self.src;
        let digits = src
            .get(self.pos..self.pos + 4)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or(ParseError::InvalidEscape)?;
        self.pos += 4;
        u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidEscape)
    }

    fn disjunction(&mut self) -> FilterResult {
        self.chain("||", LogicalOperator::Or, Self::conjunction)
    }

    fn conjunction(&mut self) -> FilterResult {
        self.chain("&&", LogicalOperator::And, Self::unary)
    }

    /// Left-associative `operand (token operand)*`.
    fn chain(&mut self, token: &str, operator: LogicalOperator, operand: fn(&mut Self) -> FilterResult) -> FilterResult {
        let mut left = operand(self)?;
        loop {
            self.skip_ws();
            if !self.eat_str(token) {
                return Ok(left);
            }
            let right = operand(self)?;
            left = FilterExpression::Logical { operator, left: Box::new(left), right: Box::new(right) };
        }
    }

    fn unary(&mut self) -> FilterResult {
        self.skip_ws();
        if self.peek() == Some('!') && !self.at("!=") {
            self.bump();
            return Ok(FilterExpression::Negation(Box::new(self.unary()?)));
        }
        if self.eat('(') {
            let inner = self.disjunction()?;
            self.skip_ws();
            self.expect(')')?;
            return Ok(FilterExpression::Paren(Box::new(inner)));
        }
        self.comparison()
    }

    /// `operand op operand`, or a lone operand as an existence or literal test.
    fn comparison(&mut self) -> FilterResult {
        let left = self.operand()?;
        self.skip_ws();
        let Some(operator) = self.comparison_operator() else {
            return Ok(match left {
                ValueExpression::Path(path) => FilterExpression::Existence { path, from_root: false },
                ValueExpression::RootPath(path) => FilterExpression::Existence { path, from_root: true },
                ValueExpression::Current => FilterExpression::Existence { path: JSONPath::new(vec![]), from_root: false },
                ValueExpression::Literal(value) => FilterExpression::Literal(value),
            });
        };
        let right = self.operand()?;
        Ok(FilterExpression::Comparison { operator, left, right })
    }

    fn comparison_operator(&mut self) -> Option<ComparisonOperator> {
        let (token, operator) = COMPARISON_OPERATORS.iter().find(|(token, _)| self.at(token))?;
        self.pos += token.len();
        Some(*operator)
    }

    fn operand(&mut self) -> Result<ValueExpression, ParseError> {
        self.skip_ws();
        if self.eat('@') {
            if !matches!(self.peek(), Some('.' | '[')) {
                return Ok(ValueExpression::Current);
            }
            return Ok(ValueExpression::Path(JSONPath::new(self.segments(true)?)));
        }
        if self.eat('$') {
            return Ok(ValueExpression::RootPath(JSONPath::new(self.segments(true)?)));
        }
        match self.peek() {
            Some('\'' | '"') => self.string().map(|s| ValueExpression::Literal(Value::String(s))),
            Some('-' | '0'..='9') => self.number().map(ValueExpression::Literal),
            Some(_) => self
                .keyword_literal()
                .map(ValueExpression::Literal)
                .ok_or(ParseError::InvalidSelector(self.pos)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn keyword_literal(&mut self) -> Option<Value> {
        let (word, value) = [("true", Value::Bool(true)), ("false", Value::Bool(false)), ("null", Value::Null)]
            .into_iter()
            .find(|(word, _)| self.at_word(word))?;
        self.pos += word.len();
        Some(value)
    }

    /// Integers that fit stay integers; everything else becomes a float.
    fn number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        self.eat('-');
        if self.digits().is_empty() {
            return Err(ParseError::InvalidNumber);
        }
        let mut integral = true;
        if self.eat('.') {
            integral = false;
            if self.digits().is_empty() {
                return Err(ParseError::InvalidNumber);
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            integral = false;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.digits().is_empty() {
                return Err(ParseError::InvalidNumber);
            }
        }

        let text = &self.src[start..self.pos];
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::from(n));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(ParseError::InvalidNumber)
    }

    // Cursor.

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        let hit = self.peek() == Some(expected);
        if hit {
            self.pos += expected.len_utf8();
        }
        hit
    }

    fn at(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let hit = self.at(s);
        if hit {
            self.pos += s.len();
        }
        hit
    }

    /// `word` not running on into a longer identifier.
    fn at_word(&self, word: &str) -> bool {
        self.rest()
            .strip_prefix(word)
            .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(ParseError::UnexpectedChar(c, self.pos)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn digits(&mut self) -> &'a str {
        self.take_while(|c| c.is_ascii_digit())
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Inside a filter, a relative or root path stops at these.
    fn at_filter_boundary(&self) -> bool {
        matches!(self.peek(), None | Some(')' | ',' | ']' | '&' | '|' | '=' | '!' | '<' | '>'))
    }
}
