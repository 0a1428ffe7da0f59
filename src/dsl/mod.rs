//! Filter expression language.
//!
//! Syntax:
//!   highway                         - tag is "yes"
//!   is_tag(highway)                 - tag exists
//!   highway == 'primary'            - exact match (also !=)
//!   lanes >= 2                      - comparison (also >, <, <=)
//!   highway in ['primary', 'trunk'] - match any value (also not in)
//!   lanes in 1..3                   - inclusive range
//!   name contains 'Rue'             - substring (also startsWith, endsWith)
//!   name matches '^Rue'             - regex
//!   expr1 and expr2, expr1 && expr2 - AND
//!   expr1 or expr2, expr1 || expr2  - OR (lower precedence than and)
//!   not expr, !expr                 - NOT
//!   cond ? a : b                    - conditional
//!   (expr)                          - grouping

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::*;
pub use eval::{Value, evaluate, evaluate_filter};
pub use parser::parse_expr;
