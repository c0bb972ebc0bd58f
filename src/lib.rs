//! Platform shim for the musify player: enumerates playable audio from the
//! shared media index, filters out recordings, and answers the UI layer over
//! the `<namespace>/audio` bridge channel.

pub mod bridge;
pub mod config;
pub mod error;
pub mod index;
pub mod library;
pub mod permission;
pub mod runtime;
