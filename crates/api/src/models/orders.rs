//! Purchases and the reviews that follow them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use storelens_core::{PaymentMethod, ProductId, PurchaseId, ReviewId, UserId};

/// A completed order line.
#[derive(Debug, Clone, Serialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub purchase_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    /// Fraction of list price taken off, `0.0..=1.0`.
    pub discount_applied: f64,
}

impl Purchase {
    /// Order total as a float for ratio arithmetic.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.total_amount.to_f64().unwrap_or_default()
    }

    /// Whether any discount was applied.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount_applied > 0.0
    }
}

/// A star rating left by a shopper.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: i32,
    pub review_text: Option<String>,
    pub review_date: DateTime<Utc>,
    pub helpful_votes: i32,
}
