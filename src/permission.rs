//! Runtime read permission for the shared media index.
//!
//! The host platform owns the real grant state and the request dialog; it is
//! reached through [`PermissionHost`]. [`PermissionGate`] tracks what we last
//! observed and turns a successful request result into a single retry signal.

mod gate;

pub use gate::{PermissionGate, PermissionState, RetrySignal};

/// First API level where audio reads need the media-specific permission.
pub const MEDIA_PERMISSION_API_LEVEL: u32 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ReadMediaAudio,
    ReadExternalStorage,
}

impl Permission {
    pub fn for_api_level(api_level: u32) -> Self {
        if api_level >= MEDIA_PERMISSION_API_LEVEL {
            Permission::ReadMediaAudio
        } else {
            Permission::ReadExternalStorage
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadMediaAudio => "android.permission.READ_MEDIA_AUDIO",
            Permission::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantResult {
    Granted,
    Denied,
}

/// The platform side of the permission cycle.
pub trait PermissionHost: Send + Sync {
    /// Current OS-reported grant state.
    fn is_granted(&self, permission: Permission) -> bool;

    /// Show the request dialog. The answer arrives later through
    /// [`PermissionGate::on_request_result`].
    fn request(&self, permission: Permission, request_code: i32);
}

#[cfg(test)]
mod tests;
