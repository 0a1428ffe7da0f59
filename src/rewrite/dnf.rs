//! Conversion of the outermost boolean chain to disjunctive normal form.

use crate::dsl::Expr;

/// Upper bound on distribution rounds. Each rewrite may grow the tree.
pub const MAX_DNF_ROUNDS: usize = 1000;

/// Apply the distributive law until the outermost `and`/`or` chain is a
/// disjunction of conjunctions. Only the chain itself is rewritten; the
/// operands of comparisons, function arguments and negations are left
/// alone.
///
/// Returns the number of rounds that rewrote something.
pub fn to_dnf(node: &mut Expr) -> usize {
    for round in 0..MAX_DNF_ROUNDS {
        if !distribute(node) {
            tracing::debug!("DNF: converged after {} rewriting round(s)", round);
            return round;
        }
    }

    tracing::warn!(
        "DNF: gave up after {} rounds; filter may not be fully normalized",
        MAX_DNF_ROUNDS
    );
    MAX_DNF_ROUNDS
}

/// One bottom-up pass over the chain. Returns true if anything changed.
fn distribute(node: &mut Expr) -> bool {
    let Expr::Binary { op, left, right } = node else {
        return false;
    };
    if !op.is_logical() {
        return false;
    }
    let is_and = op.is_and();

    // Both sides are visited in the same round
    let applied = distribute(left) | distribute(right);
    if !is_and {
        return applied;
    }

    if left.is_disjunction() || right.is_disjunction() {
        let conjunction = node.take();
        *node = distribute_conjunction(conjunction);
        return true;
    }

    applied
}

/// `(B or C) and D` becomes `(B and D) or (C and D)`; a disjunction on the
/// right is handled symmetrically when the left side is not one.
fn distribute_conjunction(conjunction: Expr) -> Expr {
    let Expr::Binary {
        op: and,
        left,
        right,
    } = conjunction
    else {
        return conjunction;
    };

    match (*left, *right) {
        (
            Expr::Binary {
                op: or,
                left: b,
                right: c,
            },
            d,
        ) if or.is_or() => Expr::binary(
            or,
            Expr::binary(and, *b, d.clone()),
            Expr::binary(and, *c, d),
        ),
        (
            d,
            Expr::Binary {
                op: or,
                left: b,
                right: c,
            },
        ) if or.is_or() => Expr::binary(
            or,
            Expr::binary(and, d.clone(), *b),
            Expr::binary(and, d, *c),
        ),
        (left, right) => Expr::binary(and, left, right),
    }
}
