//! The persisted cart state machine.
//!
//! [`CartStore`] pairs the in-memory [`Cart`] with the storage slot it was
//! loaded from. Every mutation writes the slot before returning; if the write
//! fails the in-memory cart is restored, so the two never disagree after an
//! operation completes.

use thiserror::Error;

use crate::cart::{Cart, Product, QuantityChange};
use crate::storage::{self, CartStorage, StorageError};
use crate::types::ProductId;

/// Why a checkout could not start.
#[derive(Debug, Error)]
pub enum CheckoutError<E>
where
    E: std::error::Error + 'static,
{
    /// There is nothing to check out.
    #[error("Your cart is empty!")]
    EmptyCart,

    /// The cart could not be saved before leaving the page.
    #[error(transparent)]
    Storage(#[from] StorageError<E>),
}

/// A cart mirrored to a storage slot.
#[derive(Debug)]
pub struct CartStore<S: CartStorage> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Restore the cart from `storage`.
    ///
    /// A missing or malformed slot yields an empty cart.
    pub fn load(storage: S) -> Self {
        let cart = storage::load(&storage);
        Self { cart, storage }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage backend, e.g. to flush a staged write.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Add one unit of `product` and persist. Returns the new badge count.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the cart cannot be saved; the cart is left
    /// as it was before the call.
    pub fn add_item(&mut self, product: Product) -> Result<u64, StorageError<S::Error>> {
        let id = product.id.clone();
        let quantity = self.mutate(|cart| cart.add_item(product))?;
        tracing::debug!(product_id = %id, quantity, "Added item to cart");
        Ok(self.cart.item_count())
    }

    /// Set a line's quantity and persist. Quantities below one remove the line.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the cart cannot be saved; the cart is left
    /// as it was before the call.
    pub fn set_quantity(
        &mut self,
        id: &ProductId,
        quantity: i64,
    ) -> Result<QuantityChange, StorageError<S::Error>> {
        let change = self.mutate(|cart| cart.set_quantity(id, quantity))?;
        tracing::debug!(product_id = %id, quantity, ?change, "Set cart quantity");
        Ok(change)
    }

    /// Remove a line and persist. Removing an absent id is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the cart cannot be saved; the cart is left
    /// as it was before the call.
    pub fn remove_item(&mut self, id: &ProductId) -> Result<bool, StorageError<S::Error>> {
        let removed = self.mutate(|cart| cart.remove_item(id))?;
        tracing::debug!(product_id = %id, removed, "Removed item from cart");
        Ok(removed)
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), StorageError<S::Error>> {
        self.mutate(Cart::clear)
    }

    /// Persist the cart ahead of leaving for the checkout page.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] without touching storage when the
    /// cart is empty, or [`CheckoutError::Storage`] if the save fails.
    pub fn checkout(&mut self) -> Result<(), CheckoutError<S::Error>> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        storage::save(&mut self.storage, &self.cart)?;
        tracing::debug!(lines = self.cart.len(), "Cart saved for checkout");
        Ok(())
    }

    /// Apply `f` to the cart and save, rolling back if the save fails.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Cart) -> T) -> Result<T, StorageError<S::Error>> {
        let previous = self.cart.clone();
        let out = f(&mut self.cart);
        if let Err(e) = storage::save(&mut self.storage, &self.cart) {
            tracing::error!(error = %e, "Failed to save cart, keeping previous contents");
            self.cart = previous;
            return Err(e);
        }
        Ok(out)
    }
}
