//! Catalog item types and the helpers used to render them as listing rows.
//!
//! A `Track` is produced by a `TrackSource` and never mutated afterwards; the
//! listing only keeps its rendered columns plus the `TrackUri` needed to act
//! on the row later.

mod display;
mod model;

pub use display::*;
pub use model::*;
