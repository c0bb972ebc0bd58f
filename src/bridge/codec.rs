use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A request arriving on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }
}

/// The answer to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum MethodResult {
    Success(Value),
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResult::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResult::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

type Callback = Box<dyn FnOnce(MethodResult) + Send>;

/// Single-assignment completion for one call.
///
/// Clones share one slot: whichever clone answers first delivers the result,
/// later answers are dropped with a warning.
#[derive(Clone)]
pub struct Reply {
    slot: Arc<Mutex<Option<Callback>>>,
}

impl Reply {
    pub fn new(callback: impl FnOnce(MethodResult) + Send + 'static) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(Box::new(callback)))),
        }
    }

    pub fn send(self, result: MethodResult) {
        let callback = self.slot.lock().ok().and_then(|mut slot| slot.take());
        match callback {
            Some(cb) => cb(result),
            None => warn!(?result, "reply already submitted; dropping result"),
        }
    }

    pub fn success(self, value: Value) {
        self.send(MethodResult::Success(value));
    }

    pub fn error(self, code: &str, message: impl Into<String>) {
        self.send(MethodResult::error(code, message));
    }

    pub fn not_implemented(self) {
        self.send(MethodResult::NotImplemented);
    }

    pub fn is_submitted(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("submitted", &self.is_submitted())
            .finish()
    }
}
