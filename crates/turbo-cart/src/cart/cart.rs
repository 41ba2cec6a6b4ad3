//! Session-backed cart.

use crate::cart::{codec, Item};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::ids::CartId;
use serde_json::{Map, Value};
use std::fmt;
use turbo_session::{session_key, MemoryStore, Session, Store, StoreSession};

/// Key prefix a cart is stored under, unless configured otherwise.
pub const CART_KEY_PREFIX: &str = "cart";

/// A shopping cart.
///
/// Holds at most one [`Item`] per item id, in the order ids were first
/// added. Every successful mutation writes the full item list through the
/// cart's [`Session`] under `cart:<cart id>`.
///
/// # Example
///
/// ```rust
/// use turbo_cart::{Cart, Item};
///
/// let mut cart = Cart::new()?;
/// cart.add(Item::new("a")?)?
///     .add(Item::new("a")?.with_quantity(5))?;
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.item("a").map(Item::quantity), Some(5));
/// # Ok::<(), turbo_cart::CartError>(())
/// ```
pub struct Cart {
    id: CartId,
    items: Vec<Item>,
    session: Box<dyn Session>,
    key_prefix: String,
}

impl Cart {
    /// Create a cart with a generated id on the ambient session store.
    pub fn new() -> Result<Self, CartError> {
        Self::with_id(CartId::generate())
    }

    /// Create a cart with the given id on the ambient session store.
    pub fn with_id(id: impl Into<CartId>) -> Result<Self, CartError> {
        Self::with_session(id, StoreSession::ambient()?)
    }

    /// Create a cart that persists through `session`.
    ///
    /// Nothing is read from the session; use [`Cart::restore`] to load.
    /// Fails with [`CartError::MissingCartId`] when `id` is blank.
    pub fn with_session(
        id: impl Into<CartId>,
        session: impl Session + 'static,
    ) -> Result<Self, CartError> {
        let id = id.into();
        if id.is_blank() {
            return Err(CartError::MissingCartId);
        }
        Ok(Self {
            id,
            items: Vec::new(),
            session: Box::new(session),
            key_prefix: CART_KEY_PREFIX.to_string(),
        })
    }

    /// Create a cart and load whatever `session` holds for it.
    pub fn restore(
        id: impl Into<CartId>,
        session: impl Session + 'static,
    ) -> Result<Self, CartError> {
        let mut cart = Self::with_session(id, session)?;
        cart.reload()?;
        Ok(cart)
    }

    /// Create a cart on the ambient store using `config`.
    pub fn from_config(id: Option<CartId>, config: &CartConfig) -> Result<Self, CartError> {
        Self::from_config_with_store(id, config, MemoryStore::ambient())
    }

    /// Create a cart on `store` using `config`.
    ///
    /// The cart is loaded from the store when `config.restore` is set.
    pub fn from_config_with_store<S>(
        id: Option<CartId>,
        config: &CartConfig,
        store: S,
    ) -> Result<Self, CartError>
    where
        S: Store + 'static,
    {
        let session = config.session(store)?;
        let mut cart = Self::with_session(id.unwrap_or_else(CartId::generate), session)?;
        cart.key_prefix = config.key_prefix.clone();
        if config.restore {
            cart.reload()?;
        }
        Ok(cart)
    }

    /// Get the cart id.
    pub fn id(&self) -> &CartId {
        &self.id
    }

    /// Reassign the cart id.
    ///
    /// Later writes go to the new id's key; data stored under the old key is left alone.
    /// A blank id is rejected and the current id kept.
    pub fn set_id(&mut self, id: impl Into<CartId>) -> Result<&mut Self, CartError> {
        let id = id.into();
        if id.is_blank() {
            return Err(CartError::MissingCartId);
        }
        self.id = id;
        Ok(self)
    }

    /// Session key this cart is stored under.
    pub fn storage_key(&self) -> String {
        session_key!(self.key_prefix.as_str(), self.id)
    }

    /// The session this cart persists through.
    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    /// Mutable access to the session.
    pub fn session_mut(&mut self) -> &mut dyn Session {
        self.session.as_mut()
    }

    /// Replace the session, returning the previous one.
    pub fn set_session(&mut self, session: impl Session + 'static) -> Box<dyn Session> {
        std::mem::replace(&mut self.session, Box::new(session))
    }

    /// Items in cart order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get an item by id.
    pub fn item(&self, id: impl AsRef<str>) -> Option<&Item> {
        let id = id.as_ref();
        self.items.iter().find(|i| i.id().as_str() == id)
    }

    /// Check whether an item with this id is in the cart.
    pub fn has(&self, id: impl AsRef<str>) -> bool {
        self.position(id.as_ref()).is_some()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item quantities, saturating at the `i64` bounds.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .map(Item::quantity)
            .fold(0, i64::saturating_add)
    }

    /// Add an item, replacing in place any item with the same id.
    pub fn add(&mut self, item: Item) -> Result<&mut Self, CartError> {
        self.upsert(item);
        self.save()?;
        Ok(self)
    }

    /// Add several items in order, with the same replacement rule as [`Cart::add`].
    ///
    /// The cart is saved once, after all items are in place.
    pub fn add_all(&mut self, items: impl IntoIterator<Item = Item>) -> Result<&mut Self, CartError> {
        for item in items {
            self.upsert(item);
        }
        self.save()?;
        Ok(self)
    }

    /// Update the item with the same id as `item`.
    ///
    /// Quantity is replaced and the attributes `item` carries overwrite the
    /// existing ones; other attributes are kept. An id not in the cart is a
    /// no-op and nothing is saved.
    pub fn update(&mut self, item: Item) -> Result<&mut Self, CartError> {
        match self.position(item.id().as_str()) {
            Some(index) => {
                self.items[index].merge_from(item);
                self.save()?;
            }
            None => {
                tracing::warn!(cart_id = %self.id, item_id = %item.id(), "update ignored: item not in cart");
            }
        }
        Ok(self)
    }

    /// Remove an item, returning it if it was present.
    pub fn forget(&mut self, id: impl AsRef<str>) -> Result<Option<Item>, CartError> {
        match self.position(id.as_ref()) {
            Some(index) => {
                let item = self.items.remove(index);
                self.save()?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    /// Remove all items and the cart's stored entry.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        let key = self.storage_key();
        self.session.forget(&key)?;
        tracing::debug!(cart_id = %self.id, "cart cleared");
        Ok(())
    }

    /// Write the item list through the session.
    pub fn save(&mut self) -> Result<(), CartError> {
        let payload = codec::encode(&self.id, &self.items)?;
        let key = self.storage_key();
        self.session.put(&key, &payload)?;
        tracing::debug!(cart_id = %self.id, key = %key, items = self.items.len(), "cart saved");
        Ok(())
    }

    /// Replace the in-memory items with what the session holds for this cart.
    ///
    /// Returns `false`, leaving the items untouched, when nothing is stored.
    pub fn reload(&mut self) -> Result<bool, CartError> {
        let key = self.storage_key();
        let Some(payload) = self.session.get(&key)? else {
            return Ok(false);
        };

        let stored = codec::decode(payload)?;
        if stored.cart_id != self.id {
            tracing::warn!(cart_id = %self.id, stored_id = %stored.cart_id, "stored cart id differs");
        }
        self.items = stored.items;
        tracing::debug!(cart_id = %self.id, items = self.items.len(), "cart restored");
        Ok(true)
    }

    /// Plain mapping view of the cart: `id`, `items`, `count` and `quantity`.
    pub fn properties(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        map.insert(
            "items".to_string(),
            Value::Array(
                self.items
                    .iter()
                    .map(|i| Value::Object(i.to_properties()))
                    .collect(),
            ),
        );
        map.insert("count".to_string(), Value::from(self.items.len()));
        map.insert("quantity".to_string(), Value::from(self.total_quantity()));
        map
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id().as_str() == id)
    }

    fn upsert(&mut self, item: Item) {
        match self.position(item.id().as_str()) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("id", &self.id)
            .field("items", &self.items)
            .field("namespace", &self.session.namespace())
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cart() -> Cart {
        let session = StoreSession::new(MemoryStore::new()).unwrap();
        Cart::with_session("cart-1", session).unwrap()
    }

    fn item(id: &str) -> Item {
        Item::new(id).unwrap()
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new().unwrap();
        assert!(cart.is_empty());
        assert!(!cart.id().is_blank());
        assert_eq!(cart.session().namespace(), "_cart");
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = Cart::new().unwrap();
        let b = Cart::new().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_custom_and_changed_id() {
        let mut cart = Cart::with_id("custom").unwrap();
        assert_eq!(cart.id().as_str(), "custom");

        cart.set_id("other").unwrap();
        assert_eq!(cart.id().as_str(), "other");
        assert_eq!(cart.storage_key(), "cart:other");
    }

    #[test]
    fn test_add_item() {
        let mut cart = cart();
        cart.add(item("a")).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id().as_str(), "a");
        assert!(cart.has("a"));
        assert!(!cart.has("b"));
    }

    #[test]
    fn test_add_existing_id_replaces_in_place() {
        let mut cart = cart();
        cart.add_all([item("a"), item("b"), item("c")]).unwrap();
        cart.add(item("b").with_quantity(9).with_attribute("foo", "bar"))
            .unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let b = cart.item("b").unwrap();
        assert_eq!(b.quantity(), 9);
        assert_eq!(b.attribute("foo"), Some(&json!("bar")));
    }

    #[test]
    fn test_add_replaces_wholesale() {
        let mut cart = cart();
        cart.add(item("a").with_attribute("color", "red")).unwrap();
        cart.add(item("a")).unwrap();

        assert_eq!(cart.item("a").unwrap().attribute("color"), None);
    }

    #[test]
    fn test_update_merges() {
        let mut cart = cart();
        cart.add(item("a").with_attribute("name", "Mug")).unwrap();
        cart.update(item("a").with_quantity(4).with_attribute("color", "blue"))
            .unwrap();

        let a = cart.item("a").unwrap();
        assert_eq!(a.quantity(), 4);
        assert_eq!(a.attribute("name"), Some(&json!("Mug")));
        assert_eq!(a.attribute("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut cart = cart();
        cart.add(item("a")).unwrap();
        cart.update(item("zzz").with_quantity(3)).unwrap();

        assert_eq!(cart.len(), 1);
        assert!(!cart.has("zzz"));
    }

    #[test]
    fn test_forget() {
        let mut cart = cart();
        cart.add_all([item("a"), item("b")]).unwrap();

        let removed = cart.forget("a").unwrap();
        assert_eq!(removed.map(|i| i.id().to_string()), Some("a".to_string()));
        assert_eq!(cart.forget("a").unwrap(), None);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = cart();
        cart.add_all([item("a").with_quantity(2), item("b").with_quantity(3)])
            .unwrap();
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_saves_through_session() {
        let mut cart = cart();
        cart.add(item("a")).unwrap();

        let stored = cart.session().get("cart:cart-1").unwrap().unwrap();
        assert_eq!(stored["items"][0]["id"], json!("a"));
    }

    #[test]
    fn test_clear_forgets_stored_entry() {
        let mut cart = cart();
        cart.add(item("a")).unwrap();
        cart.clear().unwrap();

        assert!(cart.is_empty());
        assert!(!cart.session().has("cart:cart-1").unwrap());
    }

    #[test]
    fn test_reload_without_stored_data() {
        let mut cart = cart();
        assert!(!cart.reload().unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_properties_of_empty_cart() {
        let cart = cart();
        let props = cart.properties();

        assert_eq!(props.get("id"), Some(&json!("cart-1")));
        assert_eq!(props.get("items"), Some(&json!([])));
        assert_eq!(props.get("count"), Some(&json!(0)));
    }

    #[test]
    fn test_properties_lists_items() {
        let mut cart = cart();
        cart.add(item("a").with_quantity(2)).unwrap();

        let props = cart.properties();
        assert_eq!(props.get("items"), Some(&json!([{"id": "a", "quantity": 2}])));
        assert_eq!(props.get("quantity"), Some(&json!(2)));
    }

    #[test]
    fn test_blank_cart_id_is_rejected() {
        assert!(matches!(Cart::with_id(""), Err(CartError::MissingCartId)));

        let session = StoreSession::new(MemoryStore::new()).unwrap();
        assert!(matches!(
            Cart::with_session("  ", session),
            Err(CartError::MissingCartId)
        ));

        let mut cart = cart();
        assert!(matches!(cart.set_id(""), Err(CartError::MissingCartId)));
        assert_eq!(cart.id().as_str(), "cart-1");
        assert_eq!(cart.storage_key(), "cart:cart-1");
    }

    #[test]
    fn test_total_quantity_saturates() {
        let mut cart = cart();
        cart.add_all([item("a").with_quantity(i64::MAX), item("b")])
            .unwrap();
        assert_eq!(cart.total_quantity(), i64::MAX);

        cart.add_all([item("c").with_quantity(i64::MIN), item("d").with_quantity(i64::MIN)])
            .unwrap();
        assert_eq!(cart.total_quantity(), i64::MIN);
    }

    #[test]
    fn test_properties_with_huge_quantities() {
        let mut cart = cart();
        cart.add(item("a").with_quantity(i64::MAX))
            .unwrap()
            .add(item("b"))
            .unwrap();

        let props = cart.properties();
        assert_eq!(props.get("quantity"), Some(&json!(i64::MAX)));
        assert_eq!(props.get("count"), Some(&json!(2)));
        assert_eq!(props["items"][0]["quantity"], json!(i64::MAX));
    }

    #[test]
    fn test_debug_omits_session_internals() {
        let cart = cart();
        let debug = format!("{:?}", cart);
        assert!(debug.contains("cart-1"));
        assert!(debug.contains("_cart"));
    }
}
