//! Distribution and folding of negations.

use crate::dsl::Expr;

/// Push negations down through connectives and fold them into operators,
/// top-down.
///
/// `not (a and b)` becomes `not a or not b`, `not (a == b)` becomes
/// `a != b`, `not not a` becomes `a` and `not true` becomes `false`.
/// Negations that cannot be folded, such as `not is_tag(x)`, stay.
pub fn normalize_negations(node: &mut Expr) {
    while let Some(reduced) = reduce_negation(node) {
        *node = reduced;
    }
    node.for_each_child_mut(normalize_negations);
}

/// The replacement for a reducible negation node, or `None`.
fn reduce_negation(node: &mut Expr) -> Option<Expr> {
    let Expr::Unary { op: not, operand } = node else {
        return None;
    };
    if !not.is_negation() {
        return None;
    }
    let not = *not;

    match operand.as_mut() {
        Expr::Binary { op, left, right } => {
            let dual = op.dual()?;
            if op.is_logical() {
                left.negate_with(not);
                right.negate_with(not);
            }
            *op = dual;
            Some(operand.take())
        }
        Expr::Unary { op, operand: inner } if op.is_negation() => Some(inner.take()),
        Expr::Bool(value) => Some(Expr::Bool(!*value)),
        _ => None,
    }
}
