//! `wasm-bindgen` exports for the ErosionRunner.

use erosion_core::error::StoreError;
use erosion_core::traits::{Clock, KeyValueStore};
use erosion_engine::{ObservationMode, SystemClock};
use erosion_store::FallbackStore;
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use web_sys::{DomException, Storage};

use crate::host::HostSession;

fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let global = js_sys::global();
            if let Ok(console) = Reflect::get(&global, &"console".into()) {
                if let Ok(error) = Reflect::get(&console, &"error".into()) {
                    if let Ok(f) = error.dyn_into::<js_sys::Function>() {
                        let _ = f.call1(&console, &JsValue::from_str(&format!("{info}")));
                    }
                }
            }
        }));
    });
}

/// `window.localStorage` as a [`KeyValueStore`].
struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// `None` when storage is disabled or the context is sandboxed.
    fn open() -> Option<Self> {
        let window = web_sys::window()?;
        // Accessing the property itself throws in sandboxed iframes.
        let storage = window.local_storage().ok()??;
        Some(Self { storage })
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| err.dyn_ref::<DomException>().map(|e| e.message()))
        .unwrap_or_else(|| "unknown storage error".to_string())
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(describe(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| {
            let quota = e
                .dyn_ref::<DomException>()
                .is_some_and(|d| d.name() == "QuotaExceededError");
            if quota {
                StoreError::QuotaExceeded {
                    key: key.to_string(),
                    bytes: key.len() + value.len(),
                }
            } else {
                StoreError::Unavailable(describe(&e))
            }
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(describe(&e)))
    }
}

/// In-page erosion engine.
///
/// Host-driven: the page calls `frame()` from `requestAnimationFrame`,
/// forwards input with `pushEvent`, and calls `teardown` from `pagehide` /
/// `visibilitychange`.
#[wasm_bindgen]
pub struct ErosionRunner {
    inner: HostSession,
}

#[wasm_bindgen]
impl ErosionRunner {
    /// Start from the page manifest and an optional JSON config.
    ///
    /// `observe` is false when `IntersectionObserver` is unavailable; every
    /// reveal target then counts as visible from the start.
    #[wasm_bindgen(constructor)]
    pub fn new(manifest: &str, config: Option<String>, observe: bool) -> Result<ErosionRunner, JsValue> {
        install_panic_hook();
        let backend = match LocalStorageStore::open() {
            Some(store) => FallbackStore::new(Box::new(store)),
            None => FallbackStore::memory_only(),
        };
        let mode = if observe {
            ObservationMode::Observed
        } else {
            ObservationMode::AlwaysVisible
        };
        let clock = SystemClock::new();
        let now = clock.now();
        HostSession::open_with_clock(manifest, config.as_deref(), backend, mode, clock, now)
            .map(|inner| Self { inner })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Push a JSON-encoded event. Returns the effect JSON, or undefined if
    /// the event did not parse.
    #[wasm_bindgen(js_name = pushEvent)]
    pub fn push_event(&mut self, json: &str) -> Option<String> {
        let now = self.inner.now();
        self.inner.push_event(json, now)
    }

    /// Advance one animation frame and return it as JSON.
    pub fn frame(&mut self) -> String {
        let now = self.inner.now();
        self.inner.frame_json(now)
    }

    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, target_id: &str, visible: bool) {
        let now = self.inner.now();
        self.inner.set_visible(target_id, visible, now);
    }

    /// Force the pending write. `reason` is `"hidden"` or `"unload"`.
    pub fn teardown(&mut self, reason: &str) {
        let now = self.inner.now();
        self.inner.teardown(reason, now);
    }

    #[wasm_bindgen(js_name = copyPayload)]
    pub fn copy_payload(&self) -> String {
        self.inner.copy_payload().to_string()
    }

    /// `"copied"`, `"copiedViaFallback"` or `"failed"`.
    #[wasm_bindgen(js_name = reportCopy)]
    pub fn report_copy(&mut self, status: &str) {
        let now = self.inner.now();
        self.inner.report_copy(status, now);
    }

    /// Deadline of the pending write, in ms since the runner started.
    #[wasm_bindgen(js_name = flushDeadline)]
    pub fn flush_deadline(&self) -> Option<f64> {
        self.inner.flush_deadline()
    }

    #[wasm_bindgen(js_name = storageDegraded)]
    pub fn storage_degraded(&self) -> bool {
        self.inner.engine().is_storage_degraded()
    }
}
