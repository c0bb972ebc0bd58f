use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use serde_json::Value;
use tracing::{debug, warn};

use crate::bridge::{BinaryMessenger, MethodCall};
use crate::permission::{GrantResult, Permission, PermissionHost};

/// Things the host platform does asynchronously, delivered to the runtime loop.
#[derive(Debug)]
pub enum HostEvent {
    PermissionResult {
        request_code: i32,
        results: Vec<GrantResult>,
    },
    Invoke {
        channel: String,
        call: MethodCall,
    },
}

/// Permission host for running outside a device.
///
/// Starts granted unless `deny` is set. With `grant_on_request`, a request
/// flips the grant and answers like a user accepting the dialog.
pub struct CliPermissionHost {
    granted: AtomicBool,
    grant_on_request: bool,
    events: Sender<HostEvent>,
}

impl CliPermissionHost {
    pub fn new(deny: bool, grant_on_request: bool, events: Sender<HostEvent>) -> Self {
        Self {
            granted: AtomicBool::new(!deny),
            grant_on_request,
            events,
        }
    }
}

impl PermissionHost for CliPermissionHost {
    fn is_granted(&self, _permission: Permission) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request(&self, permission: Permission, request_code: i32) {
        let answer = if self.grant_on_request {
            self.granted.store(true, Ordering::SeqCst);
            GrantResult::Granted
        } else {
            GrantResult::Denied
        };
        debug!(%permission, ?answer, "answering permission request");
        let sent = self.events.send(HostEvent::PermissionResult {
            request_code,
            results: vec![answer],
        });
        if sent.is_err() {
            warn!(%permission, "runtime loop gone; dropping permission result");
        }
    }
}

/// Messenger that loops outgoing calls back into the runtime as if the UI
/// layer had received them.
pub struct LoopbackMessenger {
    events: Sender<HostEvent>,
}

impl LoopbackMessenger {
    pub fn new(events: Sender<HostEvent>) -> Self {
        Self { events }
    }
}

impl BinaryMessenger for LoopbackMessenger {
    fn invoke_method(&self, channel: &str, method: &str, arguments: Value) {
        let sent = self.events.send(HostEvent::Invoke {
            channel: channel.to_string(),
            call: MethodCall {
                method: method.to_string(),
                arguments,
            },
        });
        if sent.is_err() {
            warn!(%channel, %method, "runtime loop gone; dropping outgoing call");
        }
    }
}
