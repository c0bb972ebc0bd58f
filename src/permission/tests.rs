use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::*;

#[derive(Default)]
struct FakeHost {
    granted: AtomicBool,
    requests: Mutex<Vec<(Permission, i32)>>,
}

impl PermissionHost for FakeHost {
    fn is_granted(&self, _permission: Permission) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request(&self, permission: Permission, request_code: i32) {
        self.requests.lock().unwrap().push((permission, request_code));
    }
}

#[test]
fn permission_name_depends_on_api_level() {
    assert_eq!(Permission::for_api_level(32), Permission::ReadExternalStorage);
    assert_eq!(Permission::for_api_level(33), Permission::ReadMediaAudio);
    assert_eq!(
        Permission::for_api_level(34).as_str(),
        "android.permission.READ_MEDIA_AUDIO"
    );
    assert_eq!(
        Permission::ReadExternalStorage.to_string(),
        "android.permission.READ_EXTERNAL_STORAGE"
    );
}

#[test]
fn state_starts_unknown_and_follows_checks() {
    let host = Arc::new(FakeHost::default());
    let gate = PermissionGate::new(host.clone(), 34, 123);
    assert_eq!(gate.state(), PermissionState::Unknown);

    assert!(!gate.check());
    assert_eq!(gate.state(), PermissionState::Denied);

    host.granted.store(true, Ordering::SeqCst);
    assert!(gate.check());
    assert_eq!(gate.state(), PermissionState::Granted);

    // Revocation is only noticed by the next check.
    host.granted.store(false, Ordering::SeqCst);
    assert_eq!(gate.state(), PermissionState::Granted);
    assert!(!gate.check());
    assert_eq!(gate.state(), PermissionState::Denied);
}

#[test]
fn request_passes_permission_and_code_to_host() {
    let host = Arc::new(FakeHost::default());
    let gate = PermissionGate::new(host.clone(), 30, 77);
    gate.request();
    assert_eq!(
        *host.requests.lock().unwrap(),
        vec![(Permission::ReadExternalStorage, 77)]
    );
}

#[test]
fn grant_result_yields_exactly_one_retry() {
    let host = Arc::new(FakeHost::default());
    let gate = PermissionGate::new(host, 34, 123);
    gate.check();

    assert_eq!(
        gate.on_request_result(123, &[GrantResult::Granted]),
        Some(RetrySignal)
    );
    assert_eq!(gate.state(), PermissionState::Granted);
}

#[test]
fn denial_foreign_code_and_empty_results_yield_no_retry() {
    let host = Arc::new(FakeHost::default());
    let gate = PermissionGate::new(host, 34, 123);

    assert_eq!(gate.on_request_result(123, &[GrantResult::Denied]), None);
    assert_eq!(gate.state(), PermissionState::Denied);

    assert_eq!(gate.on_request_result(999, &[GrantResult::Granted]), None);
    assert_eq!(gate.state(), PermissionState::Denied);

    assert_eq!(gate.on_request_result(123, &[]), None);
    assert_eq!(gate.state(), PermissionState::Denied);
}
