//! Media library enumeration: the track model, the inclusion rules, and the
//! scanner that applies them to media index rows.

mod filter;
mod model;
mod scan;

pub use filter::{Rejection, TrackFilter};
pub use model::Track;
pub use scan::MediaLibraryScanner;

#[cfg(test)]
mod tests;
