//! Sorting of fetched ways into primary and secondary roads.

use std::collections::HashMap;
use std::fmt;

use crate::config::QueryProfile;
use crate::dsl::{Expr, evaluate_filter, parse_expr};
use crate::overpass::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadClass {
    /// Not matched by the query filter.
    Excluded,
    Primary,
    Secondary,
}

impl RoadClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Excluded => "excluded",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Classifier {
    filter: Expr,
    primary: Expr,
}

impl Classifier {
    pub fn new(filter: &str, primary: &str) -> Result<Self, CompileError> {
        Ok(Self {
            filter: parse_expr(filter).map_err(CompileError::Parse)?,
            primary: parse_expr(primary).map_err(CompileError::Parse)?,
        })
    }

    pub fn from_profile(profile: &QueryProfile) -> Result<Self, CompileError> {
        Self::new(&profile.filter, &profile.primary_filter)
    }

    pub fn classify(&self, tags: &HashMap<String, String>) -> RoadClass {
        if !evaluate_filter(&self.filter, tags) {
            RoadClass::Excluded
        } else if evaluate_filter(&self.primary, tags) {
            RoadClass::Primary
        } else {
            RoadClass::Secondary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::build_tag_map;

    fn classify(pairs: &[(&str, &str)]) -> RoadClass {
        let classifier = Classifier::from_profile(&QueryProfile::default()).unwrap();
        classifier.classify(&build_tag_map(pairs.iter().copied()))
    }

    #[test]
    fn default_profile_classes() {
        assert_eq!(classify(&[("highway", "residential")]), RoadClass::Primary);
        assert_eq!(
            classify(&[("highway", "residential"), ("surface", "sett")]),
            RoadClass::Secondary
        );
        assert_eq!(
            classify(&[("highway", "primary"), ("access", "private")]),
            RoadClass::Secondary
        );
        assert_eq!(classify(&[("highway", "track")]), RoadClass::Secondary);
        assert_eq!(classify(&[("highway", "footway")]), RoadClass::Excluded);
        assert_eq!(classify(&[("building", "yes")]), RoadClass::Excluded);
    }

    #[test]
    fn invalid_filters_are_parse_errors() {
        assert!(matches!(
            Classifier::new("highway ==", "true"),
            Err(CompileError::Parse(_))
        ));
        assert!(matches!(
            Classifier::new("true", ""),
            Err(CompileError::Parse(_))
        ));
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(RoadClass::Secondary.to_string(), "secondary");
    }
}
