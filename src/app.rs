//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the shared listing, the
//! page being shown and the loading state.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
