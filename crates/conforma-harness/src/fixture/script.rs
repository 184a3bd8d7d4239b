//! Expectation-script directives.
//!
//! The metadata section of a fixture carries a tiny call grammar, one
//! directive per line:
//!
//! ```text
//! assert_equals(cues.length, 2)
//! assert_equals(cues[0].align, "start")
//! assert_true(cues[1].snap_to_lines)
//! assert_approx_equals(cues[1].position, 100, 0.5)
//! ```
//!
//! Paths navigate the JSON value the engine adapter produced; `.length` on
//! an array resolves to its element count and on a string to its
//! code-point count. Literals are null, booleans, integers, floats, and
//! double-quoted strings.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use conforma_core::{AssertionResult, HarnessError, SameValue};

use crate::harness::TestHandle;

/// Literal operand in a directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Double-quoted string literal.
    Str(String),
}

impl Literal {
    /// Whether a resolved JSON value is this literal under SameValue
    /// semantics (numbers compare numerically across integer/float
    /// representations; NaN never appears in JSON).
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Literal::Null => value.is_null(),
            Literal::Bool(b) => value.as_bool() == Some(*b),
            Literal::Int(i) => match value.as_i64() {
                Some(v) => v == *i,
                None => value.as_f64().is_some_and(|v| v.same_value(&(*i as f64))),
            },
            Literal::Float(f) => value.as_f64().is_some_and(|v| v.same_value(f)),
            Literal::Str(s) => value.as_str() == Some(s.as_str()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// One step of a value path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.name`
    Field(String),
    /// `[index]`
    Index(usize),
}

/// Dotted/indexed path into a bound JSON value, e.g. `cues[0].align`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePath {
    /// Name of the bound root value.
    pub root: String,
    /// Navigation steps applied to the root.
    pub segments: Vec<PathSegment>,
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl ValuePath {
    /// Resolve against the bindings.
    ///
    /// The error string is a run-time failure message (recorded as a
    /// failing assertion), not a load error: whether a path resolves
    /// depends on what the engine produced.
    pub fn resolve(&self, bindings: &Bindings) -> Result<Value, String> {
        let mut current = bindings
            .get(&self.root)
            .cloned()
            .ok_or_else(|| format!("'{}' is not bound", self.root))?;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Field(name) => match (&current, name.as_str()) {
                    (Value::Array(items), "length") => Value::from(items.len() as u64),
                    (Value::String(s), "length") => Value::from(s.chars().count() as u64),
                    (Value::Object(map), _) => map
                        .get(name)
                        .cloned()
                        .ok_or_else(|| format!("'{self}' has no field '{name}'"))?,
                    _ => return Err(format!("'{self}' cannot resolve '.{name}'")),
                },
                PathSegment::Index(index) => match &current {
                    Value::Array(items) => items
                        .get(*index)
                        .cloned()
                        .ok_or_else(|| format!("'{self}' index {index} out of bounds"))?,
                    _ => return Err(format!("'{self}' is not indexable")),
                },
            };
        }
        Ok(current)
    }
}

/// Values the expectation script can see, keyed by root name.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    /// Create an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to an engine-produced value.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// One parsed expectation directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `assert_equals(path, literal)`
    AssertEquals {
        /// Path to the observed value.
        path: ValuePath,
        /// Expected literal.
        expected: Literal,
    },
    /// `assert_not_equals(path, literal)`
    AssertNotEquals {
        /// Path to the observed value.
        path: ValuePath,
        /// Literal the value must differ from.
        expected: Literal,
    },
    /// `assert_true(path)` — the value must be exactly `true`.
    AssertTrue {
        /// Path to the observed value.
        path: ValuePath,
    },
    /// `assert_false(path)` — the value must be exactly `false`.
    AssertFalse {
        /// Path to the observed value.
        path: ValuePath,
    },
    /// `assert_approx_equals(path, number, epsilon)`
    AssertApproxEquals {
        /// Path to the observed value.
        path: ValuePath,
        /// Expected number.
        expected: f64,
        /// Permitted absolute difference.
        epsilon: f64,
    },
}

impl Directive {
    fn path(&self) -> &ValuePath {
        match self {
            Directive::AssertEquals { path, .. }
            | Directive::AssertNotEquals { path, .. }
            | Directive::AssertTrue { path }
            | Directive::AssertFalse { path }
            | Directive::AssertApproxEquals { path, .. } => path,
        }
    }

    /// Assertion description used in the report.
    pub fn describe(&self) -> String {
        match self {
            Directive::AssertEquals { path, expected } => format!("{path} equals {expected}"),
            Directive::AssertNotEquals { path, expected } => {
                format!("{path} differs from {expected}")
            }
            Directive::AssertTrue { path } => format!("{path} is true"),
            Directive::AssertFalse { path } => format!("{path} is false"),
            Directive::AssertApproxEquals {
                path,
                expected,
                epsilon,
            } => format!("{path} is within {epsilon} of {expected}"),
        }
    }

    /// Evaluate against the bindings, recording the outcome on `handle`.
    ///
    /// A path that fails to resolve records a failing assertion carrying
    /// the unresolved path; it never aborts the remaining directives.
    pub fn execute(&self, handle: &TestHandle, bindings: &Bindings) -> bool {
        let description = self.describe();
        let resolved = match self.path().resolve(bindings) {
            Ok(value) => value,
            Err(message) => {
                return handle.record(AssertionResult::fail(
                    format!("{description}: {message}"),
                    None,
                    None,
                ));
            }
        };
        let (passed, expected_rendering) = match self {
            Directive::AssertEquals { expected, .. } => {
                (expected.matches(&resolved), expected.to_string())
            }
            Directive::AssertNotEquals { expected, .. } => (
                !expected.matches(&resolved),
                format!("anything but {expected}"),
            ),
            Directive::AssertTrue { .. } => (resolved == Value::Bool(true), "true".to_string()),
            Directive::AssertFalse { .. } => (resolved == Value::Bool(false), "false".to_string()),
            Directive::AssertApproxEquals {
                expected, epsilon, ..
            } => (
                resolved
                    .as_f64()
                    .is_some_and(|v| (v - expected).abs() <= *epsilon),
                format!("{expected} \u{00b1} {epsilon}"),
            ),
        };
        if passed {
            handle.record(AssertionResult::pass(description))
        } else {
            handle.record(AssertionResult::fail(
                description,
                Some(resolved.to_string()),
                Some(expected_rendering),
            ))
        }
    }
}

/// Parse one directive line.
pub fn parse_directive(line: &str) -> Result<Directive, HarnessError> {
    let line = line.trim().trim_end_matches(';').trim_end();
    let open = line
        .find('(')
        .ok_or_else(|| HarnessError::script(format!("expected a call, got '{line}'")))?;
    let name = line[..open].trim();
    let rest = &line[open + 1..];
    let close = rest
        .rfind(')')
        .ok_or_else(|| HarnessError::script(format!("unclosed call in '{line}'")))?;
    if !rest[close + 1..].trim().is_empty() {
        return Err(HarnessError::script(format!(
            "trailing input after ')' in '{line}'"
        )));
    }
    let args = split_args(&rest[..close])?;
    match name {
        "assert_equals" => {
            let [path, literal] = two_args(name, &args)?;
            Ok(Directive::AssertEquals {
                path: parse_path(path)?,
                expected: parse_literal(literal)?,
            })
        }
        "assert_not_equals" => {
            let [path, literal] = two_args(name, &args)?;
            Ok(Directive::AssertNotEquals {
                path: parse_path(path)?,
                expected: parse_literal(literal)?,
            })
        }
        "assert_true" => Ok(Directive::AssertTrue {
            path: parse_path(one_arg(name, &args)?)?,
        }),
        "assert_false" => Ok(Directive::AssertFalse {
            path: parse_path(one_arg(name, &args)?)?,
        }),
        "assert_approx_equals" => {
            let [path, expected, epsilon] = three_args(name, &args)?;
            Ok(Directive::AssertApproxEquals {
                path: parse_path(path)?,
                expected: parse_number(expected)?,
                epsilon: parse_number(epsilon)?,
            })
        }
        other => Err(HarnessError::script(format!("unknown directive '{other}'"))),
    }
}

fn one_arg<'a>(name: &str, args: &'a [String]) -> Result<&'a str, HarnessError> {
    match args {
        [only] => Ok(only.as_str()),
        _ => Err(arity(name, 1, args.len())),
    }
}

fn two_args<'a>(name: &str, args: &'a [String]) -> Result<[&'a str; 2], HarnessError> {
    match args {
        [a, b] => Ok([a.as_str(), b.as_str()]),
        _ => Err(arity(name, 2, args.len())),
    }
}

fn three_args<'a>(name: &str, args: &'a [String]) -> Result<[&'a str; 3], HarnessError> {
    match args {
        [a, b, c] => Ok([a.as_str(), b.as_str(), c.as_str()]),
        _ => Err(arity(name, 3, args.len())),
    }
}

fn arity(name: &str, wanted: usize, got: usize) -> HarnessError {
    HarnessError::script(format!("{name} takes {wanted} argument(s), got {got}"))
}

fn split_args(src: &str) -> Result<Vec<String>, HarnessError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    for c in src.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else {
            match c {
                '"' => {
                    in_string = true;
                    current.push(c);
                }
                ',' => {
                    args.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            }
        }
    }
    if in_string {
        return Err(HarnessError::script("unterminated string literal"));
    }
    let last = current.trim();
    if !last.is_empty() {
        args.push(last.to_string());
    }
    Ok(args)
}

fn parse_literal(src: &str) -> Result<Literal, HarnessError> {
    match src {
        "null" => return Ok(Literal::Null),
        "true" => return Ok(Literal::Bool(true)),
        "false" => return Ok(Literal::Bool(false)),
        _ => {}
    }
    if src.starts_with('"') {
        return parse_string(src).map(Literal::Str);
    }
    if let Ok(i) = src.parse::<i64>() {
        return Ok(Literal::Int(i));
    }
    if let Ok(f) = src.parse::<f64>() {
        return Ok(Literal::Float(f));
    }
    Err(HarnessError::script(format!("invalid literal '{src}'")))
}

fn parse_number(src: &str) -> Result<f64, HarnessError> {
    src.parse::<f64>()
        .map_err(|_| HarnessError::script(format!("invalid number '{src}'")))
}

fn parse_string(src: &str) -> Result<String, HarnessError> {
    let inner = src
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| HarnessError::script(format!("malformed string literal {src}")))?;
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => return Err(HarnessError::script("dangling escape in string literal")),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn parse_path(src: &str) -> Result<ValuePath, HarnessError> {
    let mut chars = src.trim().chars().peekable();
    let root = parse_ident(&mut chars)
        .ok_or_else(|| HarnessError::script(format!("invalid path '{src}'")))?;
    let mut segments = Vec::new();
    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                let field = parse_ident(&mut chars)
                    .ok_or_else(|| HarnessError::script(format!("invalid field in '{src}'")))?;
                segments.push(PathSegment::Field(field));
            }
            '[' => {
                chars.next();
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if chars.next() != Some(']') || digits.is_empty() {
                    return Err(HarnessError::script(format!("invalid index in '{src}'")));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| HarnessError::script(format!("invalid index in '{src}'")))?;
                segments.push(PathSegment::Index(index));
            }
            _ => return Err(HarnessError::script(format!("invalid path '{src}'"))),
        }
    }
    Ok(ValuePath { root, segments })
}

fn parse_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    match chars.peek() {
        Some(&c) if c.is_ascii_alphabetic() || c == '_' => {
            ident.push(c);
            chars.next();
        }
        _ => return None,
    }
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    Some(ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_equals_with_string_literal() {
        let directive = parse_directive("assert_equals(cues[0].align, \"start\")")
            .expect("parse");
        assert_eq!(
            directive,
            Directive::AssertEquals {
                path: ValuePath {
                    root: "cues".into(),
                    segments: vec![PathSegment::Index(0), PathSegment::Field("align".into())],
                },
                expected: Literal::Str("start".into()),
            }
        );
    }

    #[test]
    fn parses_length_path_and_integer_literal() {
        let directive = parse_directive("assert_equals(cues.length, 2)").expect("parse");
        assert_eq!(directive.describe(), "cues.length equals 2");
    }

    #[test]
    fn parses_approx_with_three_args() {
        let directive =
            parse_directive("assert_approx_equals(cues[1].position, 100, 0.5)").expect("parse");
        assert!(matches!(
            directive,
            Directive::AssertApproxEquals { epsilon, .. } if epsilon == 0.5
        ));
    }

    #[test]
    fn string_literals_may_contain_commas_and_escapes() {
        let directive =
            parse_directive("assert_equals(cues[0].text, \"one, \\\"two\\\"\")").expect("parse");
        match directive {
            Directive::AssertEquals { expected, .. } => {
                assert_eq!(expected, Literal::Str("one, \"two\"".into()));
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn unknown_directive_is_a_script_error() {
        let err = parse_directive("assert_frobs(cues, 1)").unwrap_err();
        assert!(matches!(err, HarnessError::Script { .. }));
    }

    #[test]
    fn wrong_arity_is_a_script_error() {
        let err = parse_directive("assert_equals(cues.length)").unwrap_err();
        assert!(matches!(err, HarnessError::Script { .. }));
    }

    #[test]
    fn resolve_walks_fields_indexes_and_length() {
        let mut bindings = Bindings::new();
        bindings.bind(
            "cues",
            json!([{"align": "start"}, {"align": "end", "position": 100}]),
        );

        let path = match parse_directive("assert_equals(cues.length, 2)").expect("parse") {
            Directive::AssertEquals { path, .. } => path,
            _ => unreachable!(),
        };
        assert_eq!(path.resolve(&bindings).expect("resolve"), json!(2));

        let path = match parse_directive("assert_equals(cues[1].position, 100)").expect("parse") {
            Directive::AssertEquals { path, .. } => path,
            _ => unreachable!(),
        };
        assert_eq!(path.resolve(&bindings).expect("resolve"), json!(100));
    }

    #[test]
    fn resolve_reports_missing_fields_as_messages() {
        let mut bindings = Bindings::new();
        bindings.bind("cues", json!([{"align": "start"}]));
        let path = ValuePath {
            root: "cues".into(),
            segments: vec![PathSegment::Index(0), PathSegment::Field("size".into())],
        };
        let err = path.resolve(&bindings).unwrap_err();
        assert!(err.contains("has no field 'size'"));
    }

    #[test]
    fn integer_literal_matches_json_numbers_numerically() {
        assert!(Literal::Int(100).matches(&json!(100)));
        assert!(Literal::Int(100).matches(&json!(100.0)));
        assert!(!Literal::Int(100).matches(&json!(100.5)));
        assert!(!Literal::Int(100).matches(&json!("100")));
    }

    #[test]
    fn true_directive_requires_exact_boolean() {
        let mut bindings = Bindings::new();
        bindings.bind("flags", json!({"on": true, "count": 1}));
        let on = parse_directive("assert_true(flags.on)").expect("parse");
        let count = parse_directive("assert_true(flags.count)").expect("parse");

        // Execute through a real handle so the record path is exercised.
        let h = crate::harness::Harness::new(conforma_core::HarnessConfig::default());
        h.test("booleans", |t| {
            assert!(on.execute(t, &bindings));
            assert!(!count.execute(t, &bindings), "1 must not coerce to true");
        })
        .expect("register");
    }
}
