use super::{CompileError, compile_criteria};
use crate::region::Circle;
use crate::utils::format_float;

const HEADER: &str = "[out:json];(";
const FOOTER: &str = ");out tags geom qt;";

/// Join criteria into a single Overpass QL query for ways around `region`.
pub fn assemble_query(region: &Circle, criteria: &[String]) -> String {
    let around = format!(
        "way(around:{},{},{})",
        format_float(region.radius),
        format_float(region.lat()),
        format_float(region.lon())
    );

    let mut query = String::from(HEADER);
    for criterion in criteria {
        query.push_str(&around);
        query.push_str(criterion);
        query.push(';');
    }
    query.push_str(FOOTER);
    query
}

/// Compile `filter` and assemble the query for `region`.
pub fn build_query(region: &Circle, filter: &str) -> Result<String, CompileError> {
    let criteria = compile_criteria(filter)?;
    Ok(assemble_query(region, &criteria))
}
