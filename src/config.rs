//! Configuration loader and schema types.
//!
//! This module exposes the settings schema that drives the scanner, the
//! permission gate and the audio channel, plus helpers to load it from disk.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
