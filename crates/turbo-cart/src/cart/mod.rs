//! Shopping cart module.
//!
//! Contains the cart, its items, and the codec used to store them in a session.

mod cart;
pub mod codec;
mod item;

pub use cart::{Cart, CART_KEY_PREFIX};
pub use codec::{StoredCart, CODEC_VERSION};
pub use item::{Item, DEFAULT_QUANTITY};
