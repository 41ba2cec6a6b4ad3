//! Backing stores for sessions.
//!
//! A [`Store`] is the key/value map a session writes into. It has its own
//! activation lifecycle; sessions only activate a store that is not yet
//! active and never tear it down.

use crate::SessionError;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Helper to build session keys with namespacing.
///
/// # Example
///
/// ```rust
/// let key = turbo_session::session_key!("cart", "abc123");
/// assert_eq!(key, "cart:abc123");
/// ```
#[macro_export]
macro_rules! session_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

/// A namespaced key/value store holding serialized session values.
pub trait Store {
    /// Whether the store has been activated.
    fn is_active(&self) -> bool;

    /// Activate the store. Calling this on an active store is a no-op.
    fn activate(&self) -> Result<(), SessionError>;

    /// Read the raw value stored under `namespace`/`key`.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, SessionError>;

    /// Write a raw value under `namespace`/`key`, replacing any previous value.
    fn set(&self, namespace: &str, key: &str, value: String) -> Result<(), SessionError>;

    /// Remove `namespace`/`key`. Returns whether a value was removed.
    fn remove(&self, namespace: &str, key: &str) -> Result<bool, SessionError>;

    /// Remove every key under `namespace`.
    fn clear(&self, namespace: &str) -> Result<(), SessionError>;

    /// List the keys stored under `namespace`.
    fn keys(&self, namespace: &str) -> Result<Vec<String>, SessionError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    active: bool,
    namespaces: HashMap<String, BTreeMap<String, String>>,
}

/// In-process store.
///
/// Cloning yields another handle to the same map, so several sessions can
/// share one store the way requests share a process's session state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create a new, inactive store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store used by default sessions.
    pub fn ambient() -> Self {
        static AMBIENT: OnceLock<MemoryStore> = OnceLock::new();
        AMBIENT.get_or_init(MemoryStore::new).clone()
    }

    /// Deactivate the store and drop everything it holds.
    pub fn deactivate(&self) -> Result<(), SessionError> {
        let mut state = self.lock()?;
        state.active = false;
        state.namespaces.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, SessionError> {
        self.inner
            .lock()
            .map_err(|_| SessionError::StoreError("memory store lock poisoned".to_string()))
    }

    fn active_lock(&self) -> Result<MutexGuard<'_, MemoryState>, SessionError> {
        let state = self.lock()?;
        if !state.active {
            return Err(SessionError::Inactive);
        }
        Ok(state)
    }
}

impl Store for MemoryStore {
    fn is_active(&self) -> bool {
        self.lock().map(|s| s.active).unwrap_or(false)
    }

    fn activate(&self) -> Result<(), SessionError> {
        let mut state = self.lock()?;
        if !state.active {
            tracing::trace!("activating memory store");
            state.active = true;
        }
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, SessionError> {
        let state = self.active_lock()?;
        Ok(state
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: String) -> Result<(), SessionError> {
        let mut state = self.active_lock()?;
        state
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<bool, SessionError> {
        let mut state = self.active_lock()?;
        Ok(state
            .namespaces
            .get_mut(namespace)
            .and_then(|ns| ns.remove(key))
            .is_some())
    }

    fn clear(&self, namespace: &str) -> Result<(), SessionError> {
        let mut state = self.active_lock()?;
        state.namespaces.remove(namespace);
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>, SessionError> {
        let state = self.active_lock()?;
        Ok(state
            .namespaces
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// Store backed by Spin's Key-Value Store.
///
/// Spin has no namespaces, so keys are flattened to `namespace:key`.
#[cfg(target_arch = "wasm32")]
pub struct SpinStore {
    store: spin_sdk::key_value::Store,
}

#[cfg(target_arch = "wasm32")]
impl SpinStore {
    /// Open the default Key-Value store.
    pub fn open_default() -> Result<Self, SessionError> {
        let store = spin_sdk::key_value::Store::open_default()
            .map_err(|e| SessionError::ActivationError(e.to_string()))?;
        Ok(Self { store })
    }

    /// Open a named Key-Value store.
    pub fn open(name: &str) -> Result<Self, SessionError> {
        let store = spin_sdk::key_value::Store::open(name)
            .map_err(|e| SessionError::ActivationError(e.to_string()))?;
        Ok(Self { store })
    }

    fn scoped_keys(&self, namespace: &str) -> Result<Vec<String>, SessionError> {
        let prefix = session_key!(namespace, "");
        let keys = self
            .store
            .get_keys()
            .map_err(|e| SessionError::StoreError(e.to_string()))?;
        Ok(keys.into_iter().filter(|k| k.starts_with(&prefix)).collect())
    }
}

#[cfg(target_arch = "wasm32")]
impl Store for SpinStore {
    // An opened Spin store is always usable.
    fn is_active(&self) -> bool {
        true
    }

    fn activate(&self) -> Result<(), SessionError> {
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, SessionError> {
        match self.store.get(session_key!(namespace, key)) {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| SessionError::StoreError(e.to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(SessionError::StoreError(e.to_string())),
        }
    }

    fn set(&self, namespace: &str, key: &str, value: String) -> Result<(), SessionError> {
        self.store
            .set(session_key!(namespace, key), value.as_bytes())
            .map_err(|e| SessionError::StoreError(e.to_string()))
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<bool, SessionError> {
        let key = session_key!(namespace, key);
        let existed = self
            .store
            .exists(&key)
            .map_err(|e| SessionError::StoreError(e.to_string()))?;
        if existed {
            self.store
                .delete(&key)
                .map_err(|e| SessionError::StoreError(e.to_string()))?;
        }
        Ok(existed)
    }

    fn clear(&self, namespace: &str) -> Result<(), SessionError> {
        for key in self.scoped_keys(namespace)? {
            self.store
                .delete(&key)
                .map_err(|e| SessionError::StoreError(e.to_string()))?;
        }
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>, SessionError> {
        let prefix = session_key!(namespace, "");
        Ok(self
            .scoped_keys(namespace)?
            .into_iter()
            .map(|k| k[prefix.len()..].to_string())
            .collect())
    }
}
