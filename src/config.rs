//! Configuration loader and schema types.
//!
//! `schema`/`load` cover the static configuration (file + environment);
//! `saved` is the small state file the player rewrites on every
//! volume/shuffle/repeat change.

mod load;
mod schema;

pub mod saved;

pub use schema::*;
