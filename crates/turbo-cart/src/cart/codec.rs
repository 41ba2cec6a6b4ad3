//! Versioned encoding of a cart's items for session storage.
//!
//! ```json
//! {"version": 1, "cart_id": "cart_…", "items": [{"id": "sku-1", "quantity": 2}]}
//! ```

use crate::cart::Item;
use crate::error::CartError;
use crate::ids::CartId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Current stored-cart format version.
pub const CODEC_VERSION: u64 = 1;

/// A cart as read back from a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCart {
    /// Format version.
    pub version: u64,
    /// Id of the cart that wrote the payload.
    pub cart_id: CartId,
    /// Items in cart order.
    pub items: Vec<Item>,
}

#[derive(Serialize)]
struct StoredCartRef<'a> {
    version: u64,
    cart_id: &'a CartId,
    items: &'a [Item],
}

/// Encode a cart's items.
pub fn encode(cart_id: &CartId, items: &[Item]) -> Result<Value, CartError> {
    Ok(serde_json::to_value(StoredCartRef {
        version: CODEC_VERSION,
        cart_id,
        items,
    })?)
}

/// Decode a stored payload, checking its version and the one-item-per-id invariant.
pub fn decode(value: Value) -> Result<StoredCart, CartError> {
    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| CartError::CorruptCart("missing version".to_string()))?;

    if version != CODEC_VERSION {
        tracing::warn!(version, supported = CODEC_VERSION, "unsupported stored cart version");
        return Err(CartError::UnsupportedVersion {
            found: version,
            supported: CODEC_VERSION,
        });
    }

    let stored: StoredCart = serde_json::from_value(value)?;

    let mut seen = HashSet::new();
    for item in &stored.items {
        if item.id().is_blank() {
            return Err(CartError::CorruptCart("item with blank id".to_string()));
        }
        if !seen.insert(item.id()) {
            return Err(CartError::CorruptCart(format!(
                "duplicate item id {}",
                item.id()
            )));
        }
    }

    Ok(stored)
}
