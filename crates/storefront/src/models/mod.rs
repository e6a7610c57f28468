//! Types stored in the visitor session.

/// Session keys.
pub mod session_keys {
    /// Slot holding the serialized cart (a JSON array of line items).
    pub const CART: &str = cartstore_core::CART_STORAGE_KEY;
}
