//! Compilation of filter expressions into Overpass QL.
//!
//! A filter is parsed, normalized (see [`crate::rewrite`]) and walked into a
//! list of criteria, one per top level disjunct. The query unions one `way`
//! statement per criterion around a circular region.

mod criteria;
mod error;
mod query;

pub use criteria::build_criteria;
pub use error::CompileError;
pub use query::{assemble_query, build_query};

use crate::dsl::parse_expr;
use crate::rewrite::normalize;

/// Parse and normalize `filter`, then build its criteria.
pub fn compile_criteria(filter: &str) -> Result<Vec<String>, CompileError> {
    let mut ast = parse_expr(filter).map_err(CompileError::Parse)?;
    normalize(&mut ast);
    build_criteria(&ast)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_the_default_road_filter() {
        let criteria = compile_criteria(crate::config::DEFAULT_FILTER).unwrap();
        assert_eq!(criteria.len(), 1);
        assert!(criteria[0].starts_with("[highway][highway!=\"proposed\"]"));
        assert!(criteria[0].ends_with("[service!=\"parking_aisle\"][area!=\"yes\"]"));
    }

    #[test]
    fn parse_errors_keep_the_parser_message() {
        let err = compile_criteria("").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert!(err.to_string().starts_with("parse error: "));
    }

    #[test]
    fn unsupported_inversion_is_reported() {
        assert_eq!(
            compile_criteria("not 5").unwrap_err(),
            CompileError::UnsupportedInversion("integer")
        );
        assert_eq!(
            compile_criteria("not 5").unwrap_err().to_string(),
            "inverted integer not supported"
        );
    }
}
