//! Session-backed shopping cart for TurboCommerce.
//!
//! A [`Cart`] keeps an ordered list of [`Item`]s, one per item id, and writes
//! the whole list through a [`Session`](turbo_session::Session) after every
//! change. Adding an id that is already present replaces that item where it
//! stands instead of appending a second one.
//!
//! # Example
//!
//! ```rust
//! use turbo_cart::prelude::*;
//! use turbo_session::{MemoryStore, StoreSession};
//!
//! let store = MemoryStore::new();
//! let session = StoreSession::new(store.clone())?;
//!
//! let mut cart = Cart::with_session("cart-42", session)?;
//! cart.add(Item::new("rust-book")?.with_attribute("title", "Rust Programming Book"))?
//!     .add(Item::new("mug")?.with_quantity(2))?;
//!
//! // A later request rehydrates the same cart from the store.
//! let restored = Cart::restore("cart-42", StoreSession::new(store)?)?;
//! assert_eq!(restored.items(), cart.items());
//! # Ok::<(), turbo_cart::CartError>(())
//! ```

pub mod cart;
pub mod config;
pub mod error;
pub mod ids;

pub use cart::{Cart, Item};
pub use config::CartConfig;
pub use error::CartError;
pub use ids::{CartId, ItemId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, Item, StoredCart, CART_KEY_PREFIX, DEFAULT_QUANTITY};
    pub use crate::config::CartConfig;
    pub use crate::error::CartError;
    pub use crate::ids::{CartId, ItemId};
}
