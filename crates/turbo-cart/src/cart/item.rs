//! Cart item type.

use crate::error::CartError;
use crate::ids::ItemId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Quantity of an item whose quantity was never set.
pub const DEFAULT_QUANTITY: i64 = 1;

fn default_quantity() -> i64 {
    DEFAULT_QUANTITY
}

/// A line entry in a cart.
///
/// Two items are the same cart entry when their ids match
/// ([`Item::same_identity`]); `==` compares every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    #[serde(default = "default_quantity")]
    quantity: i64,
    /// Free-form attributes (e.g. name, size, gift note).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, Value>,
}

impl Item {
    /// Create an item with the default quantity.
    ///
    /// Fails with [`CartError::MissingItemId`] when `id` is blank.
    pub fn new(id: impl Into<ItemId>) -> Result<Self, CartError> {
        let id = id.into();
        if id.is_blank() {
            return Err(CartError::MissingItemId);
        }
        Ok(Self {
            id,
            quantity: DEFAULT_QUANTITY,
            attributes: BTreeMap::new(),
        })
    }

    /// Create an item from a configuration mapping.
    ///
    /// `id` (string or integer) is required and `quantity` (integer) is
    /// optional. Every other key becomes an attribute.
    ///
    /// ```rust
    /// use turbo_cart::Item;
    ///
    /// let config = serde_json::json!({"id": "sku-1", "quantity": 3, "size": "L"});
    /// let item = Item::try_from(config)?;
    /// assert_eq!(item.quantity(), 3);
    /// assert_eq!(item.attribute("size"), Some(&serde_json::json!("L")));
    /// # Ok::<(), turbo_cart::CartError>(())
    /// ```
    pub fn from_config(mut config: Map<String, Value>) -> Result<Self, CartError> {
        let id = match config.remove("id") {
            Some(Value::String(id)) => id,
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(Value::Null) | None => return Err(CartError::MissingItemId),
            Some(other) => {
                return Err(CartError::InvalidItemConfig(format!(
                    "id must be a string or integer, got {}",
                    other
                )))
            }
        };

        let mut item = Self::new(id)?;

        if let Some(quantity) = config.remove("quantity") {
            item.quantity = quantity.as_i64().ok_or_else(|| {
                CartError::InvalidItemConfig(format!(
                    "quantity must be an integer, got {}",
                    quantity
                ))
            })?;
        }

        item.attributes.extend(config);
        Ok(item)
    }

    /// Get the item id.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Reassign the item id.
    pub fn set_id(&mut self, id: impl Into<ItemId>) -> Result<&mut Self, CartError> {
        let id = id.into();
        if id.is_blank() {
            return Err(CartError::MissingItemId);
        }
        self.id = id;
        Ok(self)
    }

    /// Get the quantity.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Set the quantity.
    pub fn set_quantity(&mut self, quantity: i64) -> &mut Self {
        self.quantity = quantity;
        self
    }

    /// Builder form of [`Item::set_quantity`].
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Get an attribute, or `None` if it was never set.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder form of [`Item::set_attribute`].
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// All attributes, ordered by name.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Whether `other` refers to the same cart entry.
    pub fn same_identity(&self, other: &Item) -> bool {
        self.id == other.id
    }

    /// Flat mapping of the item: attributes plus `id` and `quantity`.
    ///
    /// `id` and `quantity` win over attributes of the same name.
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        map.insert("id".to_string(), Value::String(self.id.to_string()));
        map.insert("quantity".to_string(), Value::from(self.quantity));
        map
    }

    /// Take quantity and attributes from `other`, keeping attributes it does not carry.
    pub(crate) fn merge_from(&mut self, other: Item) {
        self.quantity = other.quantity;
        self.attributes.extend(other.attributes);
    }
}

impl TryFrom<Value> for Item {
    type Error = CartError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(config) => Self::from_config(config),
            Value::String(id) => Self::new(id),
            other => Err(CartError::InvalidItemConfig(format!(
                "expected an id or a mapping, got {}",
                other
            ))),
        }
    }
}
