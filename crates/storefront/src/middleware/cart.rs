//! Session-backed cart extractor.
//!
//! The cart slot is a string entry in the visitor's session. tower-sessions
//! is async while [`CartStore`] is not, so the slot is read once into a
//! [`SessionSlot`], mutated synchronously, then flushed back and saved with
//! [`SessionCart::commit`] before the response is built.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use cartstore_core::{
    Cart, CartStorage, CartStore, CheckoutError, Product, ProductId, QuantityChange,
};
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::models::session_keys;

/// Staged copy of the session's cart slot.
#[derive(Debug, Default)]
pub struct SessionSlot {
    raw: Option<String>,
    original: Option<String>,
    dirty: bool,
}

impl SessionSlot {
    /// Read the slot from the session.
    ///
    /// # Errors
    ///
    /// Returns the session error if the session record cannot be loaded.
    pub async fn fetch(session: &Session) -> Result<Self> {
        let raw = session.get::<String>(session_keys::CART).await?;
        Ok(Self {
            original: raw.clone(),
            raw,
            dirty: false,
        })
    }

    /// Write the slot back to the session and save it, if it changed.
    ///
    /// When the store rejects the save, the previous slot value is put back
    /// so the session never holds a cart the visitor was told failed.
    ///
    /// # Errors
    ///
    /// Returns the session error if the value cannot be stored.
    pub async fn flush(self, session: &Session) -> Result<()> {
        let (true, Some(raw)) = (self.dirty, self.raw) else {
            return Ok(());
        };
        session.insert(session_keys::CART, raw).await?;

        if let Err(e) = session.save().await {
            tracing::error!(error = %e, "Failed to save session, restoring previous cart");
            match self.original {
                Some(original) => session.insert(session_keys::CART, original).await?,
                None => {
                    session.remove_value(session_keys::CART).await?;
                }
            }
            return Err(e.into());
        }
        Ok(())
    }
}

impl CartStorage for SessionSlot {
    type Error = Infallible;

    fn read(&self, key: &str) -> std::result::Result<Option<String>, Self::Error> {
        Ok((key == session_keys::CART).then(|| self.raw.clone()).flatten())
    }

    fn write(&mut self, key: &str, value: &str) -> std::result::Result<(), Self::Error> {
        if key == session_keys::CART {
            self.raw = Some(value.to_owned());
            self.dirty = true;
        } else {
            tracing::warn!(key, "Ignoring write to unknown session slot");
        }
        Ok(())
    }
}

/// The visitor's cart, loaded from their session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(mut cart: SessionCart) -> Result<impl IntoResponse> {
///     cart.remove_item(&id)?;
///     let cart = cart.commit().await?;
///     Ok(render(&cart))
/// }
/// ```
pub struct SessionCart {
    session: Session,
    store: CartStore<SessionSlot>,
}

impl SessionCart {
    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Add one unit of a product. Returns the new badge count.
    ///
    /// # Errors
    ///
    /// Returns `AppError::CartStorage` if the cart cannot be encoded.
    pub fn add_item(&mut self, product: Product) -> Result<u64> {
        Ok(self.store.add_item(product)?)
    }

    /// Set a line's quantity; below one removes it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::CartStorage` if the cart cannot be encoded.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<QuantityChange> {
        Ok(self.store.set_quantity(id, quantity)?)
    }

    /// Remove a line. Absent ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::CartStorage` if the cart cannot be encoded.
    pub fn remove_item(&mut self, id: &ProductId) -> Result<bool> {
        Ok(self.store.remove_item(id)?)
    }

    /// Save the cart ahead of navigating to checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to buy.
    pub fn checkout(&mut self) -> std::result::Result<(), CheckoutError<Infallible>> {
        self.store.checkout()
    }

    /// Flush staged writes to the session and hand back the final cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session rejects the write.
    pub async fn commit(self) -> Result<Cart> {
        let Self { session, store } = self;
        let cart = store.cart().clone();
        store.into_storage().flush(&session).await?;
        Ok(cart)
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;

        // Renders fall back to an empty cart; a mutation on top of an
        // unreadable slot would overwrite the stored cart, so it fails instead.
        let slot = match SessionSlot::fetch(&session).await {
            Ok(slot) => slot,
            Err(e) if parts.method.is_safe() => {
                tracing::error!(error = %e, "Error reading cart slot from session");
                SessionSlot::default()
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            session,
            store: CartStore::load(slot),
        })
    }
}
