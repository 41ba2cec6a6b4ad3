//! Session capability and its store-backed implementation.

use crate::{MemoryStore, SessionError, Store};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "_cart";

/// Persistence capability handed to a cart.
///
/// Values cross this boundary as JSON. Absence is `Ok(None)`, so a stored
/// `false` or `null` is never confused with a missing key.
pub trait Session {
    /// Store `value` under `key` and return the serialized form that was written.
    fn put(&mut self, key: &str, value: &Value) -> Result<String, SessionError>;

    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;

    /// Whether `key` holds a value.
    fn has(&self, key: &str) -> Result<bool, SessionError>;

    /// Remove `key`. Returns whether anything was removed.
    fn forget(&mut self, key: &str) -> Result<bool, SessionError>;

    /// Remove every key in this session's namespace.
    fn flush(&mut self) -> Result<(), SessionError>;

    /// The namespace isolating this session's keys in the backing store.
    fn namespace(&self) -> &str;
}

/// Typed helpers over any [`Session`].
pub trait SessionExt: Session {
    /// Serialize `value` and store it under `key`.
    fn put_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<String, SessionError> {
        let value = serde_json::to_value(value)?;
        self.put(key, &value)
    }

    /// Read and deserialize the value stored under `key`.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

impl<S: Session + ?Sized> SessionExt for S {}

/// Session that writes into a [`Store`] under a fixed namespace.
///
/// # Example
///
/// ```rust
/// use turbo_session::{MemoryStore, Session, StoreSession};
///
/// let mut session = StoreSession::new(MemoryStore::new())?;
/// session.put("greeting", &serde_json::json!("hello"))?;
/// assert!(session.has("greeting")?);
/// # Ok::<(), turbo_session::SessionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StoreSession<S = MemoryStore> {
    store: S,
    namespace: String,
}

impl StoreSession<MemoryStore> {
    /// Session over the process-wide ambient store.
    pub fn ambient() -> Result<Self, SessionError> {
        Self::new(MemoryStore::ambient())
    }
}

impl<S: Store> StoreSession<S> {
    /// Create a session in the default namespace, activating the store if needed.
    pub fn new(store: S) -> Result<Self, SessionError> {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    /// Create a session in a custom namespace, activating the store if needed.
    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Result<Self, SessionError> {
        if !store.is_active() {
            store.activate()?;
        }
        Ok(Self {
            store,
            namespace: namespace.into(),
        })
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keys currently held in this session's namespace.
    pub fn keys(&self) -> Result<Vec<String>, SessionError> {
        self.store.keys(&self.namespace)
    }
}

impl<S: Store> Session for StoreSession<S> {
    fn put(&mut self, key: &str, value: &Value) -> Result<String, SessionError> {
        let serialized = serde_json::to_string(value)?;
        self.store.set(&self.namespace, key, serialized.clone())?;
        tracing::trace!(namespace = %self.namespace, key, bytes = serialized.len(), "session put");
        Ok(serialized)
    }

    fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        match self.store.get(&self.namespace, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn has(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.store.get(&self.namespace, key)?.is_some())
    }

    fn forget(&mut self, key: &str) -> Result<bool, SessionError> {
        self.store.remove(&self.namespace, key)
    }

    fn flush(&mut self) -> Result<(), SessionError> {
        tracing::trace!(namespace = %self.namespace, "session flush");
        self.store.clear(&self.namespace)
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn session() -> StoreSession {
        StoreSession::new(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_new_activates_store() {
        let store = MemoryStore::new();
        assert!(!store.is_active());

        let session = StoreSession::new(store.clone()).unwrap();
        assert!(store.is_active());
        assert_eq!(session.namespace(), DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_construction_is_idempotent() {
        let store = MemoryStore::new();
        let mut first = StoreSession::new(store.clone()).unwrap();
        first.put("k", &json!(1)).unwrap();

        let second = StoreSession::new(store).unwrap();
        assert_eq!(second.get("k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_put_returns_serialized_value() {
        let mut session = session();
        let stored = session.put("k", &json!({"a": 1})).unwrap();
        assert_eq!(stored, r#"{"a":1}"#);
        assert_eq!(
            session.store().get(DEFAULT_NAMESPACE, "k").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn test_get_missing_is_none() {
        let session = session();
        assert_eq!(session.get("missing").unwrap(), None);
        assert!(!session.has("missing").unwrap());
    }

    #[test]
    fn test_stored_false_is_not_absent() {
        let mut session = session();
        session.put("flag", &json!(false)).unwrap();
        session.put("nothing", &Value::Null).unwrap();

        assert_eq!(session.get("flag").unwrap(), Some(json!(false)));
        assert_eq!(session.get("nothing").unwrap(), Some(Value::Null));
        assert!(session.has("nothing").unwrap());
    }

    #[test]
    fn test_forget() {
        let mut session = session();
        session.put("k", &json!("v")).unwrap();

        assert!(session.forget("k").unwrap());
        assert!(!session.forget("k").unwrap());
        assert!(!session.has("k").unwrap());
    }

    #[test]
    fn test_flush_only_clears_own_namespace() {
        let store = MemoryStore::new();
        let mut cart = StoreSession::new(store.clone()).unwrap();
        let mut other = StoreSession::with_namespace(store, "_other").unwrap();
        cart.put("a", &json!(1)).unwrap();
        cart.put("b", &json!(2)).unwrap();
        other.put("a", &json!(3)).unwrap();

        cart.flush().unwrap();

        assert!(cart.keys().unwrap().is_empty());
        assert_eq!(other.get("a").unwrap(), Some(json!(3)));
    }

    #[test]
    fn test_typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Visit {
            page: String,
            count: u32,
        }

        let mut session = session();
        let visit = Visit {
            page: "/cart".to_string(),
            count: 3,
        };
        session.put_as("visit", &visit).unwrap();

        let loaded: Option<Visit> = session.get_as("visit").unwrap();
        assert_eq!(loaded, Some(visit));
        assert_eq!(session.get_as::<Visit>("other").unwrap(), None);
    }

    #[test]
    fn test_typed_get_with_wrong_shape_errors() {
        let mut session = session();
        session.put("n", &json!("not a number")).unwrap();
        assert!(matches!(
            session.get_as::<u32>("n"),
            Err(SessionError::SerializeError(_))
        ));
    }

    #[test]
    fn test_session_as_trait_object() {
        let mut boxed: Box<dyn Session> = Box::new(session());
        boxed.put_as("n", &5u32).unwrap();
        assert_eq!(boxed.get_as::<u32>("n").unwrap(), Some(5));
    }
}
