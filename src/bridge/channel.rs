use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::ScanError;
use crate::library::{MediaLibraryScanner, Track};
use crate::permission::GrantResult;

use super::codec::{MethodCall, MethodResult, Reply};
use super::looper::UiHandle;

pub const GET_SONGS: &str = "getSongs";
pub const RETRY_FETCH_SONGS: &str = "retryFetchSongs";

/// Outgoing calls from the native side to the UI layer.
pub trait BinaryMessenger: Send + Sync {
    fn invoke_method(&self, channel: &str, method: &str, arguments: Value);
}

/// The `<namespace>/audio` channel.
///
/// Permission checks and replies happen on the foreground context; the scan
/// itself runs on a worker thread spawned per request, and its result is
/// posted back to the foreground before the reply fires. Concurrent requests
/// are not serialized here.
pub struct AudioChannel {
    name: String,
    scanner: Arc<MediaLibraryScanner>,
    ui: UiHandle,
    messenger: Arc<dyn BinaryMessenger>,
}

impl AudioChannel {
    pub fn new(
        namespace: &str,
        scanner: Arc<MediaLibraryScanner>,
        ui: UiHandle,
        messenger: Arc<dyn BinaryMessenger>,
    ) -> Self {
        Self {
            name: format!("{}/audio", namespace.trim_end_matches('/')),
            scanner,
            ui,
            messenger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self, call: MethodCall, reply: Reply) {
        debug!(channel = %self.name, method = %call.method, "method call");
        match call.method.as_str() {
            GET_SONGS => {
                if self.scanner.gate().check() {
                    self.fetch(reply, "Failed to fetch songs");
                } else {
                    self.scanner.gate().request();
                    reply.error("PERMISSION_DENIED", "Storage permission not granted");
                }
            }
            RETRY_FETCH_SONGS => {
                if self.scanner.gate().check() {
                    self.fetch(reply, "Failed to retry fetch");
                } else {
                    reply.error("PERMISSION_DENIED", "Storage permission still not granted");
                }
            }
            _ => reply.not_implemented(),
        }
    }

    /// Host callback for the permission dialog. A grant asks the UI layer to
    /// retry the fetch.
    pub fn on_request_permissions_result(&self, request_code: i32, results: &[GrantResult]) {
        if self
            .scanner
            .gate()
            .on_request_result(request_code, results)
            .is_some()
        {
            self.messenger
                .invoke_method(&self.name, RETRY_FETCH_SONGS, Value::Null);
        }
    }

    fn fetch(&self, reply: Reply, failure_prefix: &'static str) {
        let scanner = self.scanner.clone();
        let ui = self.ui.clone();
        let worker_reply = reply.clone();

        let spawned = thread::Builder::new()
            .name("media-scan".into())
            .spawn(move || {
                let scanned = panic::catch_unwind(AssertUnwindSafe(|| scanner.scan()))
                    .unwrap_or_else(|payload| Err(ScanError::Fetch(panic_message(payload))));
                let result = scan_result(scanned, failure_prefix);
                if !ui.post(move || worker_reply.send(result)) {
                    warn!("foreground looper gone; dropping scan result");
                }
            });

        if let Err(e) = spawned {
            error!(error = %e, "could not start media scan worker");
            reply.error("FETCH_ERROR", format!("{failure_prefix}: {e}"));
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "media scan panicked".to_string())
}

fn scan_result(scanned: Result<Vec<Track>, ScanError>, prefix: &str) -> MethodResult {
    match scanned {
        Ok(tracks) => MethodResult::Success(Value::Array(
            tracks
                .iter()
                .map(|t| Value::Object(t.to_record()))
                .collect(),
        )),
        // The index could not be queried: report an empty library.
        Err(ScanError::QueryFailed(_)) => MethodResult::Success(Value::Array(Vec::new())),
        Err(e @ ScanError::PermissionDenied) => MethodResult::error(e.code(), e.to_string()),
        Err(e @ ScanError::Fetch(_)) => {
            error!(error = %e, "error fetching songs");
            MethodResult::error(e.code(), format!("{prefix}: {e}"))
        }
    }
}
