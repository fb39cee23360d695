//! Shopper account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storelens_core::UserId;

/// A registered shopper with basic demographics.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub registration_date: DateTime<Utc>,
    pub is_premium: bool,
}
