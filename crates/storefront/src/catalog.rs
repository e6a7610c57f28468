//! Product catalog for the home page.
//!
//! The catalog is a JSON array loaded once at startup:
//!
//! ```json
//! [{"id": "mug-01", "name": "Stoneware Mug", "price": "14.00", "image": "/static/img/mug.jpg"}]
//! ```
//!
//! It only feeds the add-to-cart controls. Prices posted back by the browser
//! are not checked against it.

use std::path::Path;

use cartstore_core::{Price, ProductId};
use serde::Deserialize;
use thiserror::Error;

/// Errors loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A product offered on the home page.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

/// All products, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
}

impl Catalog {
    #[must_use]
    pub const fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    /// Load the catalog from a JSON file.
    ///
    /// A missing file yields an empty catalog so a fresh checkout still boots.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Catalog file not found, starting with no products");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let products: Vec<CatalogProduct> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self::new(products))
    }

    #[must_use]
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
