//! Namespaced session storage for TurboCommerce carts.
//!
//! A [`Session`] is the persistence capability a cart writes through. The
//! bundled [`StoreSession`] serializes values to JSON and keeps them under a
//! namespace (default `_cart`) inside a [`Store`], so cart data never collides
//! with other users of the same store.
//!
//! # Example
//!
//! ```rust
//! use turbo_session::{MemoryStore, Session, SessionExt, StoreSession};
//!
//! let mut session = StoreSession::new(MemoryStore::new())?;
//!
//! // Store a value
//! session.put_as("cart:user123", &vec!["sku-1", "sku-2"])?;
//!
//! // Retrieve a value
//! let skus: Option<Vec<String>> = session.get_as("cart:user123")?;
//! assert_eq!(skus.map(|s| s.len()), Some(2));
//!
//! // Delete a value
//! session.forget("cart:user123")?;
//! # Ok::<(), turbo_session::SessionError>(())
//! ```

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{Session, SessionExt, StoreSession, DEFAULT_NAMESPACE};
pub use store::{MemoryStore, Store};

#[cfg(target_arch = "wasm32")]
pub use store::SpinStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{MemoryStore, Session, SessionError, SessionExt, Store, StoreSession};
}
