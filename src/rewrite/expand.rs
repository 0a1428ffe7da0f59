//! Expansion of membership tests into equality and comparison trees.

use crate::dsl::{BinaryOp, Expr, UnaryOp};

/// Rewrite `in`/`not in` tests against array and range literals, bottom-up.
///
/// `a not in ['b','c','d']` becomes `not (a=='b' or a=='c' or a=='d')` and
/// `a not in 2..6` becomes `not (a>=2 and a<=6)`. Membership against
/// anything else is left as is.
pub fn expand_membership(node: &mut Expr) {
    node.for_each_child_mut(expand_membership);

    let Expr::Binary { op, left, right } = node else {
        return;
    };
    if !op.is_membership() {
        return;
    }
    let negated = *op == BinaryOp::NotIn;

    let expanded = match right.as_mut() {
        Expr::Array(items) => expand_array(left, std::mem::take(items)),
        Expr::Range(lo, hi) => expand_range(left, lo.take(), hi.take()),
        _ => return,
    };

    *node = if negated {
        Expr::unary(UnaryOp::Not, expanded)
    } else {
        expanded
    };
}

fn expand_array(left: &Expr, items: Vec<Expr>) -> Expr {
    items
        .into_iter()
        .map(|item| Expr::binary(BinaryOp::Eq, left.clone(), item))
        .reduce(|acc, eq| Expr::binary(BinaryOp::Or, acc, eq))
        .unwrap_or(Expr::Bool(false))
}

fn expand_range(left: &Expr, lo: Expr, hi: Expr) -> Expr {
    if lo.same_literal(&hi) {
        return Expr::binary(BinaryOp::Eq, left.clone(), lo);
    }
    Expr::binary(
        BinaryOp::And,
        Expr::binary(BinaryOp::Ge, left.clone(), lo),
        Expr::binary(BinaryOp::Le, left.clone(), hi),
    )
}
