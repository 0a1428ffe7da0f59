//! Evaluator for filter expressions against a set of tags.
//!
//! Tags follow the OSM yes/no convention: a bare tag name used as a
//! condition is true when its value is `yes`.

use super::ast::{BinaryOp, Expr, UnaryOp};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Str(s) => s == "yes",
            _ => false,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Str(s) => parse_numeric(s),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

/// Evaluate a filter expression to a boolean against a set of tags.
pub fn evaluate_filter(expr: &Expr, tags: &HashMap<String, String>) -> bool {
    evaluate(expr, tags).is_truthy()
}

/// Evaluate an expression against a set of tags.
pub fn evaluate(expr: &Expr, tags: &HashMap<String, String>) -> Value {
    match expr {
        Expr::Identifier(name) => tags
            .get(name)
            .map(|v| Value::Str(v.clone()))
            .unwrap_or(Value::Nil),
        Expr::Integer(n) => Value::Int(*n),
        Expr::Float(n) => Value::Float(*n),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Str(s) => Value::Str(s.clone()),
        Expr::Nil | Expr::Range(..) => Value::Nil,
        Expr::Array(items) => Value::Array(items.iter().map(|e| evaluate(e, tags)).collect()),

        Expr::Unary { op, operand } => {
            let value = evaluate(operand, tags);
            match op {
                UnaryOp::Not | UnaryOp::Bang => Value::Bool(!value.is_truthy()),
                UnaryOp::Neg => match value {
                    Value::Int(n) => n.checked_neg().map(Value::Int).unwrap_or(Value::Nil),
                    other => other
                        .as_number()
                        .map(|n| Value::Float(-n))
                        .unwrap_or(Value::Nil),
                },
            }
        }

        Expr::Binary { op, left, right } => evaluate_binary(*op, left, right, tags),

        Expr::Matches { left, right } => {
            match (evaluate(left, tags), evaluate(right, tags)) {
                (Value::Str(text), Value::Str(pattern)) => Value::Bool(
                    Regex::new(&pattern)
                        .map(|re| re.is_match(&text))
                        .unwrap_or(false),
                ),
                _ => Value::Bool(false),
            }
        }

        Expr::Call { name, args } => match (name.as_str(), args.as_slice()) {
            ("is_tag", [Expr::Identifier(key)]) | ("is_tag", [Expr::Str(key)]) => {
                Value::Bool(tags.contains_key(key))
            }
            _ => Value::Nil,
        },

        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if evaluate_filter(cond, tags) {
                evaluate(then, tags)
            } else {
                evaluate(otherwise, tags)
            }
        }
    }
}

fn evaluate_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    tags: &HashMap<String, String>,
) -> Value {
    if op.is_and() {
        return Value::Bool(evaluate_filter(left, tags) && evaluate_filter(right, tags));
    }
    if op.is_or() {
        return Value::Bool(evaluate_filter(left, tags) || evaluate_filter(right, tags));
    }
    if op.is_membership() {
        let found = contains(left, right, tags);
        return Value::Bool(if op == BinaryOp::In { found } else { !found });
    }

    let lhs = evaluate(left, tags);
    let rhs = evaluate(right, tags);

    match op {
        BinaryOp::Eq => Value::Bool(values_equal(&lhs, &rhs)),
        BinaryOp::Ne => Value::Bool(!values_equal(&lhs, &rhs)),
        BinaryOp::Lt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Contains | BinaryOp::StartsWith | BinaryOp::EndsWith => {
            let (Value::Str(text), Value::Str(needle)) = (&lhs, &rhs) else {
                return Value::Bool(false);
            };
            Value::Bool(match op {
                BinaryOp::Contains => text.contains(needle.as_str()),
                BinaryOp::StartsWith => text.starts_with(needle.as_str()),
                _ => text.ends_with(needle.as_str()),
            })
        }
        _ => arithmetic(op, lhs, rhs),
    }
}

/// Membership of `left` in an array or range literal.
fn contains(left: &Expr, right: &Expr, tags: &HashMap<String, String>) -> bool {
    let needle = evaluate(left, tags);
    match right {
        Expr::Range(lo, hi) => {
            let lo = evaluate(lo, tags);
            let hi = evaluate(hi, tags);
            matches!(
                compare(&needle, &lo),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                compare(&needle, &hi),
                Some(Ordering::Less | Ordering::Equal)
            )
        }
        other => match evaluate(other, tags) {
            Value::Array(items) => items.iter().any(|item| values_equal(&needle, item)),
            _ => false,
        },
    }
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    match (op, &lhs, &rhs) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => return Value::Str(format!("{a}{b}")),
        (_, Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::Div => a.checked_div(*b),
                BinaryOp::Mod => a.checked_rem(*b),
                _ => None,
            };
            return result.map(Value::Int).unwrap_or(Value::Nil);
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) else {
        return Value::Nil;
    };
    match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Mod => Value::Float(a % b),
        _ => Value::Nil,
    }
}

/// Equality with numeric coercion: a tag value `"2"` equals the number 2.
fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_numeric() || b.is_numeric() {
        return match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    a == b
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ if a.is_numeric() || b.is_numeric() => a.as_number()?.partial_cmp(&b.as_number()?),
        _ => None,
    }
}

/// Parse a numeric value from a string.
/// Handles common OSM patterns like "50 mph", "30", "5.5".
fn parse_numeric(s: &str) -> Option<f64> {
    // Try direct parse first
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }

    // Try to extract leading number (e.g., "50 mph" -> 50)
    let numeric_part: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    numeric_part.parse::<f64>().ok()
}
