//! Compile boolean tag filters into Overpass QL queries for OpenStreetMap
//! ways.
//!
//! ```
//! use wayquery::overpass::build_query;
//! use wayquery::region::Circle;
//!
//! let region = Circle::new(-37.8, 144.9, 100.0);
//! let query = build_query(&region, "highway == 'primary'").unwrap();
//! assert_eq!(
//!     query,
//!     "[out:json];(way(around:100,-37.8,144.9)[highway=\"primary\"];);out tags geom qt;"
//! );
//! ```

pub mod classify;
pub mod config;
pub mod dsl;
pub mod overpass;
pub mod region;
pub mod rewrite;
pub mod utils;
