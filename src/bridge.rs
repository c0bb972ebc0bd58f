//! Request/response bridge between the native layer and the UI layer.
//!
//! - `codec`: method calls, results, and the single-assignment [`Reply`].
//! - `looper`: the foreground context that completions are marshaled onto.
//! - `channel`: the audio channel that answers `getSongs` / `retryFetchSongs`.

mod channel;
mod codec;
mod looper;

pub use channel::{AudioChannel, BinaryMessenger, GET_SONGS, RETRY_FETCH_SONGS};
pub use codec::{MethodCall, MethodResult, Reply};
pub use looper::{Looper, UiHandle};
