//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to size the catalog
//! pipeline, reach the remote service and drive logging, plus helpers to load
//! it from disk and the environment.

mod load;
mod schema;

pub use load::default_cache_dir;
pub use schema::*;

#[cfg(test)]
mod tests;
