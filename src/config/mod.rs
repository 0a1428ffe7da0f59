use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::region::Circle;

/// Roads worth drawing: anything tagged `highway` except ways that are not
/// (yet) roads, private service ways and areas.
pub const DEFAULT_FILTER: &str = "is_tag(highway) \
    and highway not in ['proposed','corridor','construction','footway','steps','busway','elevator','services'] \
    and service not in ['driveway','parking_aisle'] \
    and area != 'yes'";

/// Ways matched by the query filter that are drawn as primary roads.
pub const DEFAULT_PRIMARY_FILTER: &str = "highway in ['cycleway','primary','residential','secondary','tertiary','trunk','living_street','unclassified'] \
    and access not in ['private','customers','no'] \
    and surface not in ['cobblestone','sett']";

/// The query region is enlarged by this factor so ways crossing the edge of
/// the requested area are still returned.
pub const DEFAULT_GROW: f64 = 1.0 / 0.9;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryProfile {
    #[serde(default)]
    pub region: Option<Circle>,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_primary_filter")]
    pub primary_filter: String,
    #[serde(default = "default_grow")]
    pub grow: f64,
}

impl QueryProfile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// The region actually queried, if one is set.
    pub fn query_region(&self) -> Option<Circle> {
        self.region.map(|region| region.grow(self.grow))
    }
}

impl Default for QueryProfile {
    fn default() -> Self {
        Self {
            region: None,
            filter: default_filter(),
            primary_filter: default_primary_filter(),
            grow: DEFAULT_GROW,
        }
    }
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

fn default_primary_filter() -> String {
    DEFAULT_PRIMARY_FILTER.to_string()
}

fn default_grow() -> f64 {
    DEFAULT_GROW
}
