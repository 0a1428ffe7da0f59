//! Semantics-preserving rewrites applied to a parsed filter before query
//! generation. Passes mutate the tree in place and never fail.

mod dnf;
mod expand;
mod negate;

pub use dnf::{MAX_DNF_ROUNDS, to_dnf};
pub use expand::expand_membership;
pub use negate::normalize_negations;

use crate::dsl::Expr;

/// Run every pass in order: membership expansion, negation normalization,
/// then DNF conversion.
pub fn normalize(expr: &mut Expr) {
    expand_membership(expr);
    normalize_negations(expr);
    let rounds = to_dnf(expr);
    tracing::debug!("Rewrite: normalized filter ({} DNF round(s))", rounds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{evaluate_filter, parse_expr};
    use crate::utils::build_tag_map;

    const VALUES: [&str; 4] = ["a", "b", "c", "1"];

    /// Every assignment of `x` and `y` over `VALUES`, plus absent tags.
    fn assignments() -> Vec<Vec<(&'static str, &'static str)>> {
        let mut all = vec![vec![]];
        for x in VALUES {
            all.push(vec![("x", x)]);
            for y in VALUES {
                all.push(vec![("x", x), ("y", y)]);
            }
        }
        all
    }

    fn assert_equivalent(left: &Expr, right: &Expr) {
        for pairs in assignments() {
            let tags = build_tag_map(pairs.iter().copied());
            assert_eq!(
                evaluate_filter(left, &tags),
                evaluate_filter(right, &tags),
                "{:?} vs {:?} differ for {:?}",
                left,
                right,
                pairs
            );
        }
    }

    fn assert_rewrite_preserves(input: &str) {
        let original = parse_expr(input).unwrap();
        let mut rewritten = original.clone();
        normalize(&mut rewritten);
        assert_equivalent(&original, &rewritten);
    }

    #[test]
    fn array_membership_is_a_disjunction_of_equalities() {
        let mut ast = parse_expr("x in ['a', 'b', 1]").unwrap();
        expand_membership(&mut ast);
        let expected = parse_expr("x == 'a' or x == 'b' or x == 1").unwrap();
        assert_eq!(ast, expected);
        assert_equivalent(&parse_expr("x in ['a', 'b', 1]").unwrap(), &expected);

        let not_in = parse_expr("x not in ['a', 'b', 1]").unwrap();
        let negated = parse_expr("not (x == 'a' or x == 'b' or x == 1)").unwrap();
        assert_equivalent(&not_in, &negated);
    }

    #[test]
    fn range_membership_is_a_pair_of_bounds() {
        assert_equivalent(
            &parse_expr("x in 0..5").unwrap(),
            &parse_expr("x >= 0 and x <= 5").unwrap(),
        );
        assert_equivalent(
            &parse_expr("x in 1..1").unwrap(),
            &parse_expr("x == 1").unwrap(),
        );
    }

    #[test]
    fn full_rewrite_preserves_meaning() {
        assert_rewrite_preserves("x in ['a', 'b'] and y not in ['c']");
        assert_rewrite_preserves("not (x == 'a' or y != 'b')");
        assert_rewrite_preserves("(x == 'a' or x == 'b') and (y == 'c' or not (y == 'b'))");
        assert_rewrite_preserves("not (x in ['a', 'c'] and y == 'b')");
        assert_rewrite_preserves("not not (x startsWith 'a' || y == 'b') && is_tag(y)");
        assert_rewrite_preserves("x not in []");
    }

    #[test]
    fn double_negation_normalizes_like_the_operand() {
        for input in ["x == 'a'", "x == 'a' and not (y == 'b' or y == 'c')", "is_tag(x)"] {
            let mut plain = parse_expr(input).unwrap();
            let mut doubled = parse_expr(&format!("not not ({input})")).unwrap();
            normalize(&mut plain);
            normalize(&mut doubled);
            assert_eq!(plain, doubled);
        }
    }
}
