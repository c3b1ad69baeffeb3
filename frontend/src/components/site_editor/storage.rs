//! `localStorage` backed recovery store.

use common::editor::recovery::{RecoveryError, RecoveryStore};
use gloo_console::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage};

/// Legacy numeric code some engines still report instead of the name.
const QUOTA_EXCEEDED_CODE: u16 = 22;

/// Recovery snapshots kept in the browser's `localStorage`.
///
/// When storage is disabled (private mode, blocked cookies) every write fails
/// with `Unavailable` and reads come back empty; editing keeps working.
pub struct LocalRecoveryStore {
    storage: Option<Storage>,
}

impl LocalRecoveryStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage no disponible: no se guardarán copias de recuperación");
        }
        Self { storage }
    }
}

impl RecoveryStore for LocalRecoveryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RecoveryError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| RecoveryError::Unavailable("localStorage no disponible".to_string()))?;
        storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        let Some(storage) = &self.storage else {
            return Vec::new();
        };
        let length = storage.length().unwrap_or(0);
        (0..length)
            .filter_map(|index| storage.key(index).ok().flatten())
            .collect()
    }
}

fn storage_error(err: JsValue) -> RecoveryError {
    match err.dyn_ref::<DomException>() {
        Some(exception)
            if exception.name() == "QuotaExceededError"
                || exception.code() == QUOTA_EXCEEDED_CODE =>
        {
            RecoveryError::QuotaExceeded
        }
        Some(exception) => RecoveryError::Unavailable(exception.message()),
        None => RecoveryError::Unavailable(format!("{:?}", err)),
    }
}
