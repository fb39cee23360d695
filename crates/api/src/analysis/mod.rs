//! Pure analytics over in-memory rows.
//!
//! The agents load rows through the repositories and hand them to these
//! functions, which never touch the database. Every report is a typed
//! `Serialize` struct whose JSON shape is what the agent tools return.
//!
//! Shared conventions:
//! - Money and rates are rounded to two decimals with [`round2`].
//! - Divisions use [`ratio`], which divides by `max(denominator, 1)`.
//! - "Top" insights use [`arg_max`]: the first entry wins a tie, so keyed
//!   breakdowns resolve ties in key order.

pub mod behavior;
pub mod financial;

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use storelens_core::ProductId;

use crate::models::Product;

/// Products by ID, for resolving names and categories of purchases and views.
pub type Catalog = HashMap<ProductId, Product>;

/// Index a product list by ID.
#[must_use]
pub fn catalog(products: Vec<Product>) -> Catalog {
    products.into_iter().map(|p| (p.id, p)).collect()
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / max(denominator, 1)`.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(1.0)
}

/// `numerator / max(denominator, 1) * 100`.
#[must_use]
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Lossy count conversion for averages and rates.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn count(n: usize) -> f64 {
    n as f64
}

/// Key with the highest score; `None` when empty. Earlier keys win ties.
pub fn arg_max<K>(scored: impl IntoIterator<Item = (K, f64)>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;
    for (key, score) in scored {
        if best.as_ref().is_none_or(|(_, top)| score > *top) {
            best = Some((key, score));
        }
    }
    best.map(|(key, _)| key)
}

/// Start of a trailing window of `days` days ending at `now`.
///
/// Absurdly large windows saturate at the earliest representable instant.
#[must_use]
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert!((round2(33.333_333) - 33.33).abs() < f64::EPSILON);
        assert!((round2(2.675_1) - 2.68).abs() < f64::EPSILON);
        assert!(round2(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_guards_small_denominators() {
        assert!((ratio(10.0, 0.0) - 10.0).abs() < f64::EPSILON);
        assert!((ratio(10.0, 0.5) - 10.0).abs() < f64::EPSILON);
        assert!((ratio(10.0, 4.0) - 2.5).abs() < f64::EPSILON);
        assert!((percent(1.0, 4.0) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_arg_max_first_wins_ties() {
        let winner = arg_max([("a", 1.0), ("b", 3.0), ("c", 3.0)]);
        assert_eq!(winner, Some("b"));
    }

    #[test]
    fn test_arg_max_empty() {
        assert_eq!(arg_max(Vec::<(&str, f64)>::new()), None);
    }

    #[test]
    fn test_window_start_saturates() {
        let now = Utc::now();
        assert_eq!(window_start(now, 1), now - TimeDelta::days(1));
        assert_eq!(window_start(now, i64::MAX), DateTime::<Utc>::MIN_UTC);
    }
}
