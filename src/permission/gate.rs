use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::{GrantResult, Permission, PermissionHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Emitted once per grant event; the receiver re-runs the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySignal;

pub struct PermissionGate {
    host: Arc<dyn PermissionHost>,
    permission: Permission,
    request_code: i32,
    state: Mutex<PermissionState>,
}

impl PermissionGate {
    pub fn new(host: Arc<dyn PermissionHost>, api_level: u32, request_code: i32) -> Self {
        Self {
            host,
            permission: Permission::for_api_level(api_level),
            request_code,
            state: Mutex::new(PermissionState::Unknown),
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    fn set_state(&self, next: PermissionState) {
        if let Ok(mut s) = self.state.lock() {
            let prev = *s;
            if prev != next {
                debug!(permission = %self.permission, from = ?prev, to = ?next, "permission state changed");
                *s = next;
            }
        }
    }

    /// Ask the host for the current grant state and record it.
    ///
    /// Always re-evaluates, so a revoked permission shows up on the next call.
    pub fn check(&self) -> bool {
        let granted = self.host.is_granted(self.permission);
        self.set_state(if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        });
        granted
    }

    pub fn request(&self) {
        info!(permission = %self.permission, "requesting permission");
        self.host.request(self.permission, self.request_code);
    }

    /// Feed back the host's answer to a request.
    ///
    /// Returns a [`RetrySignal`] when the answer is for our request code and
    /// the first result is a grant. Unrelated request codes leave the state
    /// untouched.
    pub fn on_request_result(
        &self,
        request_code: i32,
        results: &[GrantResult],
    ) -> Option<RetrySignal> {
        if request_code != self.request_code {
            return None;
        }
        match results.first() {
            Some(GrantResult::Granted) => {
                self.set_state(PermissionState::Granted);
                info!(permission = %self.permission, "permission granted");
                Some(RetrySignal)
            }
            Some(GrantResult::Denied) => {
                self.set_state(PermissionState::Denied);
                info!(permission = %self.permission, "permission denied by user");
                None
            }
            // Request interrupted; the dialog was dismissed without an answer.
            None => None,
        }
    }
}
