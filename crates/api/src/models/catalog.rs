//! Product catalog model.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use storelens_core::ProductId;

/// A catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub brand: Option<String>,
    pub rating: Option<f64>,
    pub stock_quantity: i32,
    pub description: Option<String>,
}

impl Product {
    /// Unit price as a float for ratio arithmetic.
    #[must_use]
    pub fn price_f64(&self) -> f64 {
        self.price.to_f64().unwrap_or_default()
    }
}

/// Optional catalog search filters.
///
/// `name` is a case-insensitive substring match; `category` and `brand` are
/// exact matches. Price bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}
