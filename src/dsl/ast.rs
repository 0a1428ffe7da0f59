//! AST types for the filter expression language.

use std::fmt;

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Tag name: `highway`
    Identifier(String),

    /// Integer literal: `2`
    Integer(i64),

    /// Float literal: `2.5`
    Float(f64),

    /// Boolean literal: `true`, `false`
    Bool(bool),

    /// String literal: `'primary'`
    Str(String),

    /// `nil`
    Nil,

    /// Array literal: `['a', 'b']`
    Array(Vec<Expr>),

    /// Range literal: `1..5`
    Range(Box<Expr>, Box<Expr>),

    /// Unary operation: `not x`, `!x`, `-x`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation: `a and b`, `lanes >= 2`, `highway in [...]`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Regex test: `name matches '^Rue'`
    Matches { left: Box<Expr>, right: Box<Expr> },

    /// Function call: `is_tag(highway)`
    Call { name: String, args: Vec<Expr> },

    /// Ternary: `cond ? a : b`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,  // not
    Bang, // !
    Neg,  // -
}

/// Binary operator. `and`/`&&` and `or`/`||` are kept apart so that
/// rewrites preserve the spelling of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,    // and
    AndAnd, // &&
    Or,     // or
    OrOr,   // ||
    Eq,     // ==
    Ne,     // !=
    Lt,     // <
    Le,     // <=
    Gt,     // >
    Ge,     // >=
    In,     // in
    NotIn,  // not in
    Contains,
    StartsWith,
    EndsWith,
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Bang => "!",
            UnaryOp::Neg => "-",
        }
    }

    pub fn is_negation(self) -> bool {
        matches!(self, UnaryOp::Not | UnaryOp::Bang)
    }
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::AndAnd => "&&",
            BinaryOp::Or => "or",
            BinaryOp::OrOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Contains => "contains",
            BinaryOp::StartsWith => "startsWith",
            BinaryOp::EndsWith => "endsWith",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// The operator whose result is the negation of this one, if any.
    pub fn dual(self) -> Option<BinaryOp> {
        let dual = match self {
            BinaryOp::And => BinaryOp::Or,
            BinaryOp::Or => BinaryOp::And,
            BinaryOp::AndAnd => BinaryOp::OrOr,
            BinaryOp::OrOr => BinaryOp::AndAnd,
            BinaryOp::Eq => BinaryOp::Ne,
            BinaryOp::Ne => BinaryOp::Eq,
            BinaryOp::Ge => BinaryOp::Lt,
            BinaryOp::Lt => BinaryOp::Ge,
            BinaryOp::Gt => BinaryOp::Le,
            BinaryOp::Le => BinaryOp::Gt,
            BinaryOp::In => BinaryOp::NotIn,
            BinaryOp::NotIn => BinaryOp::In,
            _ => return None,
        };
        Some(dual)
    }

    pub fn is_and(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::AndAnd)
    }

    pub fn is_or(self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::OrOr)
    }

    pub fn is_logical(self) -> bool {
        self.is_and() || self.is_or()
    }

    pub fn is_membership(self) -> bool {
        matches!(self, BinaryOp::In | BinaryOp::NotIn)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Lowercase name of the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "identifier",
            Expr::Integer(_) => "integer",
            Expr::Float(_) => "float",
            Expr::Bool(_) => "bool",
            Expr::Str(_) => "string",
            Expr::Nil => "nil",
            Expr::Array(_) => "array",
            Expr::Range(..) => "range",
            Expr::Unary { .. } => "unary",
            Expr::Binary { .. } => "binary",
            Expr::Matches { .. } => "matches",
            Expr::Call { .. } => "function",
            Expr::Conditional { .. } => "conditional",
        }
    }

    /// Move the node out, leaving `nil` in its slot.
    pub fn take(&mut self) -> Expr {
        std::mem::replace(self, Expr::Nil)
    }

    /// Replace the node with its negation under `op`.
    pub fn negate_with(&mut self, op: UnaryOp) {
        let inner = self.take();
        *self = Expr::unary(op, inner);
    }

    pub fn is_disjunction(&self) -> bool {
        matches!(self, Expr::Binary { op, .. } if op.is_or())
    }

    /// Visit each direct child mutably, in source order.
    pub fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Expr)) {
        match self {
            Expr::Array(items) => items.iter_mut().for_each(f),
            Expr::Call { args, .. } => args.iter_mut().for_each(f),
            Expr::Range(lo, hi) => {
                f(lo);
                f(hi);
            }
            Expr::Unary { operand, .. } => f(operand),
            Expr::Binary { left, right, .. } | Expr::Matches { left, right } => {
                f(left);
                f(right);
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                f(cond);
                f(then);
                f(otherwise);
            }
            Expr::Identifier(_)
            | Expr::Integer(_)
            | Expr::Float(_)
            | Expr::Bool(_)
            | Expr::Str(_)
            | Expr::Nil => {}
        }
    }

    /// Literal value equality: same literal kind and value. Non-literals
    /// never compare equal, not even to themselves.
    pub fn same_literal(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Integer(a), Expr::Integer(b)) => a == b,
            (Expr::Float(a), Expr::Float(b)) => a == b,
            (Expr::Bool(a), Expr::Bool(b)) => a == b,
            (Expr::Str(a), Expr::Str(b)) => a == b,
            (Expr::Nil, Expr::Nil) => true,
            _ => false,
        }
    }
}
