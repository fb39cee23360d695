//! Browsing activity: sessions and the page views inside them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storelens_core::{DeviceType, PageType, PageViewId, ProductId, SessionId, UserId};

/// One visit by a user, from landing to leaving.
#[derive(Debug, Clone, Serialize)]
pub struct UserSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub session_start: DateTime<Utc>,
    pub session_end: Option<DateTime<Utc>>,
    pub session_duration_minutes: Option<f64>,
    pub pages_viewed: i32,
    pub device_type: DeviceType,
    pub browser: String,
}

impl UserSession {
    /// Duration in minutes, treating an open session as zero.
    #[must_use]
    pub fn duration_or_zero(&self) -> f64 {
        self.session_duration_minutes.unwrap_or(0.0)
    }
}

/// A single page hit within a session.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub id: PageViewId,
    pub session_id: SessionId,
    pub product_id: Option<ProductId>,
    pub page_type: PageType,
    pub timestamp: DateTime<Utc>,
    pub time_spent_seconds: i32,
}
