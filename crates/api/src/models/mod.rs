//! Domain models for the analytics dataset.
//!
//! These are the shapes returned by the repositories and serialized by the
//! REST routes. Aggregate read models live in [`analytics`].

pub mod activity;
pub mod analytics;
pub mod catalog;
pub mod orders;
pub mod user;

pub use activity::{PageView, UserSession};
pub use analytics::{DeviceUsage, ProductAnalytics, TopProductMetric, UserBehaviorSummary};
pub use catalog::{Product, ProductFilter};
pub use orders::{Purchase, Review};
pub use user::User;
