//! cartstore core - cart domain library.
//!
//! This crate holds everything about a shopping cart that does not depend on
//! HTTP: the line item model, the merge-on-add state machine, the persistence
//! contract for the storage slot, and the page routing enum.
//!
//! - `storefront` - Web binary that keeps the slot in a visitor session
//! - `integration-tests` - Drives the storefront router in-process
//!
//! # Architecture
//!
//! The only I/O seam is the [`CartStorage`] trait. Callers construct a
//! [`CartStore`] from a storage backend, mutate it, and every mutation writes
//! the cart back before returning.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices
//! - [`cart`] - `LineItem`, `Cart` and the order summary
//! - [`storage`] - The storage slot contract and in-memory backend
//! - [`store`] - `CartStore`, the persisted cart state machine
//! - [`view`] - Which page view is active

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod store;
pub mod types;
pub mod view;

pub use cart::{Cart, CartState, LineItem, OrderSummary, Product, QuantityChange, parse_quantity};
pub use storage::{CART_STORAGE_KEY, CartStorage, MemoryStorage, StorageError};
pub use store::{CartStore, CheckoutError};
pub use types::*;
pub use view::View;
