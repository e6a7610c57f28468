//! Persistence contract for the cart storage slot.
//!
//! The cart lives in a single named slot of a string key-value store. Readers
//! must survive a missing slot and a slot holding garbage; both load as an
//! empty cart. Writes serialize the whole cart and replace the slot.
//!
//! # Slot format
//!
//! ```json
//! [{"id":"sku-1","name":"Mug","price":"12.50","image":"/img/mug.jpg","quantity":2}]
//! ```

use std::collections::HashMap;
use std::convert::Infallible;

use thiserror::Error;

use crate::cart::Cart;

/// Name of the slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "shoppingCart";

/// A string key-value store that can hold the cart slot.
///
/// Implementations are synchronous; async backends stage the value and flush
/// it themselves once the cart operation has finished.
pub trait CartStorage {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a slot. Returns `Ok(None)` if the slot was never written.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the slot cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the write is rejected (e.g. quota).
    fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// Errors returned when saving a cart.
#[derive(Debug, Error)]
pub enum StorageError<E>
where
    E: std::error::Error + 'static,
{
    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// The backend rejected the write.
    #[error("failed to write cart slot: {0}")]
    Write(#[source] E),
}

/// Load the cart from its slot.
///
/// Never fails: a missing slot is an empty cart, and an unreadable or
/// malformed slot is logged and treated as empty.
pub fn load<S: CartStorage>(storage: &S) -> Cart {
    let raw = match storage.read(CART_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            tracing::error!(error = %e, key = CART_STORAGE_KEY, "Error reading cart slot");
            return Cart::new();
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!(error = %e, key = CART_STORAGE_KEY, "Error loading cart");
            Cart::new()
        }
    }
}

/// Serialize the cart and write it to its slot.
///
/// # Errors
///
/// Returns [`StorageError`] if serialization or the backend write fails.
pub fn save<S: CartStorage>(storage: &mut S, cart: &Cart) -> Result<(), StorageError<S::Error>> {
    let raw = serde_json::to_string(cart).map_err(StorageError::Encode)?;
    storage
        .write(CART_STORAGE_KEY, &raw)
        .map_err(StorageError::Write)
}

/// In-process storage backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot already populated.
    #[must_use]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_owned(), value.to_owned());
        Self { slots }
    }

    /// Raw contents of a slot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl CartStorage for MemoryStorage {
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Price, Product, ProductId};

    #[derive(Debug, Error)]
    #[error("slot unavailable")]
    struct Unavailable;

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        type Error = Unavailable;

        fn read(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(Unavailable)
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(Unavailable)
        }
    }

    #[test]
    fn test_load_missing_slot_is_empty() {
        assert!(load(&MemoryStorage::new()).is_empty());
    }

    #[test]
    fn test_load_malformed_slot_is_empty() {
        for raw in ["{not json", "42", r#"{"id":"a"}"#, r#"[{"id":"a"}]"#, ""] {
            let storage = MemoryStorage::with_slot(CART_STORAGE_KEY, raw);
            assert!(load(&storage).is_empty(), "slot {raw:?} should load empty");
        }
    }

    #[test]
    fn test_load_rejects_oversized_price() {
        let raw = r#"[{"id":"a","name":"A","price":"79228162514264337593543950335","quantity":1}]"#;
        let storage = MemoryStorage::with_slot(CART_STORAGE_KEY, raw);
        assert!(load(&storage).is_empty());
    }

    #[test]
    fn test_load_read_error_is_empty() {
        assert!(load(&BrokenStorage).is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut cart = Cart::new();
        for (id, price, adds) in [("x", "19.99", 3), ("y", "0.10", 1), ("z", "5", 2)] {
            for _ in 0..adds {
                cart.add_item(Product {
                    id: ProductId::from(id),
                    name: format!("Item {id}"),
                    price: Price::parse(price).unwrap(),
                    image: None,
                });
            }
        }

        let mut storage = MemoryStorage::new();
        save(&mut storage, &cart).unwrap();
        let restored = load(&storage);

        assert_eq!(restored, cart);
        assert!(storage.get(CART_STORAGE_KEY).unwrap().starts_with('['));
    }

    #[test]
    fn test_save_surfaces_write_error() {
        let err = save(&mut BrokenStorage, &Cart::new()).unwrap_err();
        assert!(matches!(err, StorageError::Write(Unavailable)));
        assert_eq!(err.to_string(), "failed to write cart slot: slot unavailable");
    }
}
