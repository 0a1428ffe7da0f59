//! Overpass criteria generation.
//!
//! A normalized filter is walked post-order. Nodes on the outermost
//! `and`/`or`/`not` chain, and the operands hanging directly off it, are in
//! root scope and may become tag filters such as `[highway="primary"]`.
//! Everything below them is nested and is rendered as an evaluator
//! expression for an `(if:...)` filter.

use super::CompileError;
use crate::dsl::{BinaryOp, Expr};
use crate::utils::format_literal_float;

#[derive(Debug, Clone, Copy)]
struct Scope {
    root: bool,
    /// Set on the operand of a root level `not`.
    negated: bool,
}

impl Scope {
    const ROOT: Scope = Scope {
        root: true,
        negated: false,
    };
    const NESTED: Scope = Scope {
        root: false,
        negated: false,
    };
}

/// Build the criteria for a filter that has been through
/// [`crate::rewrite::normalize`]. Each criterion is one top level disjunct.
pub fn build_criteria(expr: &Expr) -> Result<Vec<String>, CompileError> {
    let mut builder = CriteriaBuilder::default();
    builder.emit(expr, Scope::ROOT)?;

    let criteria: Vec<String> = builder.fragments.into_iter().map(wrap).collect();
    tracing::debug!("Overpass: built {} criteria", criteria.len());
    Ok(criteria)
}

/// Stack of rendered fragments. Each node pops its children's fragments
/// and pushes its own; a root level `or` may leave both sides on the stack
/// as separate criteria.
#[derive(Default)]
struct CriteriaBuilder {
    fragments: Vec<String>,
}

impl CriteriaBuilder {
    fn push(&mut self, fragment: String) {
        self.fragments.push(fragment);
    }

    fn pop(&mut self) -> String {
        self.fragments.pop().unwrap_or_default()
    }

    fn emit(&mut self, node: &Expr, scope: Scope) -> Result<(), CompileError> {
        let Scope { root, negated } = scope;

        match node {
            Expr::Integer(_) | Expr::Float(_) | Expr::Str(_) if negated => {
                return Err(CompileError::UnsupportedInversion(node.kind_name()));
            }
            Expr::Identifier(name) => {
                let name = quote_identifier(name);
                self.push(if !root {
                    bang_if(&name, negated)
                } else if negated {
                    format!("[{name}=\"no\"]")
                } else {
                    format!("[{name}=\"yes\"]")
                });
            }
            Expr::Integer(n) => self.push(n.to_string()),
            Expr::Float(n) => self.push(format_literal_float(*n)),
            Expr::Str(s) => self.push(quote(s)),
            Expr::Bool(value) => {
                let text = if *value != negated { "\"yes\"" } else { "\"no\"" };
                self.push(text.to_string());
            }
            Expr::Unary { op, operand } => {
                if root && op.is_negation() {
                    // The operand renders the negation itself
                    self.emit(
                        operand,
                        Scope {
                            root: true,
                            negated: true,
                        },
                    )?;
                } else {
                    self.emit(operand, Scope::NESTED)?;
                    let inner = self.pop();
                    self.push(format!("{}({})", bang_if(op.as_str(), negated), inner));
                }
            }
            Expr::Binary { op, left, right } => self.emit_binary(*op, left, right, scope)?,
            Expr::Matches { left, right } => {
                self.emit(left, Scope::NESTED)?;
                self.emit(right, Scope::NESTED)?;
                let rhs = self.pop();
                let lhs = self.pop();
                let op = bang_if("~", negated);
                self.push(if root {
                    format!("[{lhs}{op}{rhs}]")
                } else {
                    format!("{lhs}{op}{rhs}")
                });
            }
            Expr::Call { name, args } => {
                for arg in args {
                    self.emit(arg, Scope::NESTED)?;
                }
                let first = self.fragments.len().saturating_sub(args.len());
                let values = self.fragments.split_off(first);

                if root && name == "is_tag" && values.len() == 1 {
                    self.push(format!("[{}]", bang_if(&values[0], negated)));
                } else {
                    self.push(format!("{}({})", bang_if(name, negated), values.join(",")));
                }
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.emit(cond, Scope::NESTED)?;
                self.emit(then, Scope::NESTED)?;
                self.emit(otherwise, Scope::NESTED)?;
                let otherwise = self.pop();
                let then = self.pop();
                let cond = self.pop();
                let conditional = format!("{cond}?{then}:{otherwise}");
                self.push(if negated {
                    format!("!({conditional})")
                } else {
                    conditional
                });
            }
            Expr::Nil | Expr::Array(_) | Expr::Range(..) => {
                return Err(CompileError::UnsupportedNode(node.kind_name().to_string()));
            }
        }

        Ok(())
    }

    fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        scope: Scope,
    ) -> Result<(), CompileError> {
        let Scope { mut root, mut negated } = scope;

        if op.is_logical() {
            let child = if root { Scope::ROOT } else { Scope::NESTED };
            self.emit(left, child)?;
            self.emit(right, child)?;
            let rhs = self.pop();
            let lhs = self.pop();
            self.join_logical(op, lhs, rhs, root);
            return Ok(());
        }

        self.emit(left, Scope::NESTED)?;
        self.emit(right, Scope::NESTED)?;
        let mut rhs = self.pop();
        let mut lhs = self.pop();

        match op {
            BinaryOp::In | BinaryOp::NotIn => {
                return Err(CompileError::UnsupportedNode(format!("{op} operator")));
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if matches!(left, Expr::Identifier(_)) {
                    if !lhs.starts_with('"') {
                        lhs = quote(&lhs);
                    }
                    lhs = format!("t[{lhs}]");
                }
                self.push(format!("{lhs}{op}{rhs}"));
                return Ok(());
            }
            _ => {}
        }

        let literal = matches!(right, Expr::Str(_));
        let mut symbol = match op {
            BinaryOp::Contains => {
                if literal {
                    rhs = quote_meta(&rhs);
                }
                "~"
            }
            BinaryOp::StartsWith => {
                if literal {
                    rhs = format!("{}^{}", &rhs[..1], quote_meta(&rhs[1..]));
                }
                "~"
            }
            BinaryOp::EndsWith => {
                if literal {
                    let end = rhs.len() - 1;
                    rhs = format!("{}${}", quote_meta(&rhs[..end]), &rhs[end..]);
                }
                "~"
            }
            other => other.as_str(),
        };

        // A function operand can only be expressed in an evaluated filter
        if matches!(left, Expr::Call { .. }) || matches!(right, Expr::Call { .. }) {
            root = false;
        }

        if !root {
            self.push(format!("{lhs}{}{rhs}", bang_if(symbol, negated)));
            return Ok(());
        }

        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            if matches!(right, Expr::Identifier(_)) {
                std::mem::swap(&mut lhs, &mut rhs);
            }
            if op == BinaryOp::Ne {
                negated = !negated;
            }
            if rhs == "\"\"" {
                symbol = "~";
                rhs = "\"^$\"".to_string();
            } else {
                symbol = "=";
            }
        }
        self.push(format!("[{lhs}{}{rhs}]", bang_if(symbol, negated)));
        Ok(())
    }

    fn join_logical(&mut self, op: BinaryOp, lhs: String, rhs: String, root: bool) {
        let joiner = if op.is_and() { "&&" } else { "||" };

        if !root || (!is_wrapped(&lhs) && !is_wrapped(&rhs)) {
            self.push(format!("{lhs}{joiner}{rhs}"));
        } else if op.is_and() {
            // Adjacent filters intersect
            self.push(format!("{}{}", wrap(lhs), wrap(rhs)));
        } else {
            // Separate statements are unioned by the query
            self.push(lhs);
            self.push(rhs);
        }
    }
}

/// True for tag filters (`[...]`) and evaluated filters (`(if:...)`).
fn is_wrapped(fragment: &str) -> bool {
    fragment.starts_with('[') || fragment.starts_with("(if:")
}

fn wrap(fragment: String) -> String {
    if is_wrapped(&fragment) {
        fragment
    } else {
        format!("(if:{fragment})")
    }
}

fn bang_if(text: &str, negated: bool) -> String {
    if negated {
        format!("!{text}")
    } else {
        text.to_string()
    }
}

/// Escape the regex metacharacters `\.+*?()|[]{}^$`, leaving everything
/// else as is.
fn quote_meta(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn quote(text: &str) -> String {
    format!("{:?}", text)
}

/// Tag names made only of ASCII letters are left bare.
fn quote_identifier(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphabetic()) {
        name.to_string()
    } else {
        quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse_expr;
    use crate::rewrite::normalize;

    fn criteria(filter: &str) -> Vec<String> {
        try_criteria(filter).unwrap()
    }

    fn try_criteria(filter: &str) -> Result<Vec<String>, CompileError> {
        let mut ast = parse_expr(filter).unwrap();
        normalize(&mut ast);
        build_criteria(&ast)
    }

    #[test]
    fn membership_becomes_separate_criteria() {
        assert_eq!(
            criteria("highway in ['primary','secondary']"),
            vec![r#"[highway="primary"]"#, r#"[highway="secondary"]"#]
        );
    }

    #[test]
    fn negated_membership_becomes_intersection() {
        assert_eq!(
            criteria("access not in ['private','no']"),
            vec![r#"[access!="private"][access!="no"]"#]
        );
    }

    #[test]
    fn inequality() {
        assert_eq!(
            criteria("surface != 'cobblestone'"),
            vec![r#"[surface!="cobblestone"]"#]
        );
    }

    #[test]
    fn tag_presence() {
        assert_eq!(criteria("is_tag(highway)"), vec!["[highway]"]);
        assert_eq!(criteria("not is_tag(highway)"), vec!["[!highway]"]);
        assert_eq!(criteria("is_tag(oneway_bicycle)"), vec![r#"["oneway_bicycle"]"#]);
    }

    #[test]
    fn conjunction_of_expansions() {
        assert_eq!(
            criteria("highway in ['a'] and access not in ['no']"),
            vec![r#"[highway="a"][access!="no"]"#]
        );
    }

    #[test]
    fn empty_membership_never_matches() {
        assert_eq!(criteria("sport in []"), vec![r#"(if:"no")"#]);
        assert_eq!(criteria("sport not in []"), vec![r#"(if:"yes")"#]);
    }

    #[test]
    fn bare_identifiers_follow_yes_no() {
        assert_eq!(criteria("oneway"), vec![r#"[oneway="yes"]"#]);
        assert_eq!(criteria("!oneway"), vec![r#"[oneway="no"]"#]);
        assert_eq!(criteria("lit or oneway"), vec![r#"[lit="yes"]"#, r#"[oneway="yes"]"#]);
    }

    #[test]
    fn comparisons_use_tag_values() {
        assert_eq!(criteria("lanes >= 2"), vec![r#"(if:t["lanes"]>=2)"#]);
        assert_eq!(criteria("not (lanes >= 2)"), vec![r#"(if:t["lanes"]<2)"#]);
        assert_eq!(
            criteria("lanes > 1 or width < 2.5"),
            vec![r#"(if:t["lanes"]>1||t["width"]<2.5)"#]
        );
    }

    #[test]
    fn mixed_conjunction_wraps_evaluated_side() {
        assert_eq!(
            criteria("lanes >= 2 and highway == 'primary'"),
            vec![r#"(if:t["lanes"]>=2)[highway="primary"]"#]
        );
    }

    #[test]
    fn mixed_disjunction_keeps_both_sides() {
        assert_eq!(
            criteria("lanes >= 2 or highway == 'primary'"),
            vec![r#"(if:t["lanes"]>=2)"#, r#"[highway="primary"]"#]
        );
    }

    #[test]
    fn range_membership() {
        assert_eq!(
            criteria("lanes in 2..4"),
            vec![r#"(if:t["lanes"]>=2&&t["lanes"]<=4)"#]
        );
        assert_eq!(criteria("lanes in 2..2"), vec!["[lanes=2]"]);
    }

    #[test]
    fn equality_normalizes_operand_order() {
        assert_eq!(
            criteria("'primary' == highway"),
            vec![r#"[highway="primary"]"#]
        );
    }

    #[test]
    fn empty_string_comparison_becomes_regex() {
        assert_eq!(criteria("name == ''"), vec![r#"[name~"^$"]"#]);
        assert_eq!(criteria("name != ''"), vec![r#"[name!~"^$"]"#]);
    }

    #[test]
    fn string_predicates_become_regex() {
        assert_eq!(criteria("name contains 'St.'"), vec![r#"[name~"St\."]"#]);
        assert_eq!(criteria("name startsWith 'Rue'"), vec![r#"[name~"^Rue"]"#]);
        assert_eq!(criteria("name endsWith 'Rd'"), vec![r#"[name~"Rd$"]"#]);
        assert_eq!(
            criteria("not (name contains 'x')"),
            vec![r#"[name!~"x"]"#]
        );
    }

    #[test]
    fn explicit_regex() {
        assert_eq!(criteria("name matches '^A'"), vec![r#"[name~"^A"]"#]);
        assert_eq!(criteria("not (name matches '^A')"), vec![r#"[name!~"^A"]"#]);
    }

    #[test]
    fn function_operand_forces_evaluated_filter() {
        assert_eq!(criteria("f(x) == 1"), vec!["(if:f(x)==1)"]);
        assert_eq!(criteria("max(a, b) == 'c'"), vec![r#"(if:max(a,b)=="c")"#]);
    }

    #[test]
    fn nested_expressions() {
        assert_eq!(criteria("f(a and b)"), vec!["(if:f(a&&b))"]);
        assert_eq!(criteria("f(not a)"), vec!["(if:f(not(a)))"]);
        assert_eq!(criteria("oneway ? 1 : 2"), vec!["(if:oneway?1:2)"]);
    }

    #[test]
    fn quoted_tag_names() {
        assert_eq!(
            criteria("is_tag(highway) and addr_street == 'x'"),
            vec![r#"[highway]["addr_street"="x"]"#]
        );
    }

    #[test]
    fn disjunctions_are_distributed() {
        assert_eq!(
            criteria("(highway == 'a' or highway == 'b') and lit"),
            vec![
                r#"[highway="a"][lit="yes"]"#,
                r#"[highway="b"][lit="yes"]"#,
            ]
        );
    }

    #[test]
    fn unsupported_nodes() {
        assert_eq!(
            try_criteria("not 5"),
            Err(CompileError::UnsupportedInversion("integer"))
        );
        assert_eq!(
            try_criteria("not 'a' and b"),
            Err(CompileError::UnsupportedInversion("string"))
        );
        assert_eq!(
            try_criteria("f([1])"),
            Err(CompileError::UnsupportedNode("array".into()))
        );
        assert_eq!(
            try_criteria("x in y"),
            Err(CompileError::UnsupportedNode("in operator".into()))
        );
        assert_eq!(
            try_criteria("x == nil"),
            Err(CompileError::UnsupportedNode("nil".into()))
        );
        assert_eq!(
            try_criteria("f(1..2)").unwrap_err().to_string(),
            "range not supported"
        );
    }

    #[test]
    fn negated_conditional_keeps_its_negation() {
        assert_eq!(
            criteria("oneway ? lit : bridge"),
            vec!["(if:oneway?lit:bridge)"]
        );
        assert_eq!(
            criteria("not (oneway ? lit : bridge)"),
            vec!["(if:!(oneway?lit:bridge))"]
        );
    }

    #[test]
    fn string_predicates_escape_only_regex_metacharacters() {
        assert_eq!(
            criteria("name contains 'Saint-Denis'"),
            vec![r#"[name~"Saint-Denis"]"#]
        );
        assert_eq!(
            criteria("name startsWith 'A&B #1 (old)'"),
            vec![r#"[name~"^A&B #1 \(old\)"]"#]
        );
        assert_eq!(quote_meta(r"a.b+c|d~e-f"), r"a\.b\+c\|d~e-f");
    }

    #[test]
    fn float_literals_use_exponents_when_extreme() {
        assert_eq!(criteria("width < 2.5"), vec![r#"(if:t["width"]<2.5)"#]);
        assert_eq!(
            criteria("width < 1000000000000000000000.0"),
            vec![r#"(if:t["width"]<1e+21)"#]
        );
    }
}
