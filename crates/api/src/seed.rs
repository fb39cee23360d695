//! Sample dataset generator.
//!
//! Produces a plausible shop history relative to a fixed "now": a hundred
//! shoppers, a fifty-item catalog, a month of browsing sessions with their
//! page views, scattered purchases, and reviews for roughly half of them.
//! Generation is pure and seedable; [`crate::db::seed`] writes the result.
//!
//! Rows reference each other by index into the sibling vectors because the
//! database assigns the real IDs on insert.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use storelens_core::{DeviceType, PageType, PaymentMethod};

const FIRST_NAMES: &[&str] = &[
    "Alice Johnson",
    "Bob Smith",
    "Carol Davis",
    "David Wilson",
    "Eva Brown",
    "Frank Miller",
    "Grace Taylor",
    "Henry Anderson",
    "Ivy Chen",
    "Jack Williams",
];

const CITIES: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
    "San Antonio",
    "San Diego",
    "Dallas",
    "San Jose",
];

const GENDERS: &[&str] = &["M", "F", "Other"];

const CATEGORIES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Books",
    "Home & Garden",
    "Sports",
    "Beauty",
    "Toys",
    "Automotive",
    "Health",
    "Food",
];

const BRANDS: &[&str] = &[
    "Apple", "Samsung", "Nike", "Adidas", "Sony", "LG", "HP", "Dell", "Amazon", "Google",
];

const BROWSERS: &[&str] = &["Chrome", "Firefox", "Safari", "Edge"];

/// How much data to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    /// Number of shoppers.
    pub users: usize,
    /// Number of catalog entries.
    pub products: usize,
    /// RNG seed; the same seed and `now` always produce the same data.
    pub seed: u64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            users: 100,
            products: 50,
            seed: 42,
        }
    }
}

/// A shopper to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub age: i32,
    pub gender: &'static str,
    pub location: &'static str,
    pub registration_date: DateTime<Utc>,
    pub is_premium: bool,
}

/// A catalog entry to insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: &'static str,
    pub price: Decimal,
    pub brand: &'static str,
    pub rating: f64,
    pub stock_quantity: i32,
    pub description: String,
}

/// A browsing session; `user` indexes [`SampleData::users`].
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user: usize,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub duration_minutes: i64,
    pub pages_viewed: i32,
    pub device_type: DeviceType,
    pub browser: &'static str,
}

/// A page view; `session` and `product` index their sibling vectors.
#[derive(Debug, Clone)]
pub struct NewPageView {
    pub session: usize,
    pub product: Option<usize>,
    pub page_type: PageType,
    pub timestamp: DateTime<Utc>,
    pub time_spent_seconds: i32,
}

/// An order line; `user` and `product` index their sibling vectors.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub user: usize,
    pub product: usize,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub purchase_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub discount_applied: f64,
}

/// A review left after a purchase.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user: usize,
    pub product: usize,
    pub rating: i32,
    pub review_text: String,
    pub review_date: DateTime<Utc>,
    pub helpful_votes: i32,
}

/// A complete generated dataset.
#[derive(Debug, Clone, Default)]
pub struct SampleData {
    pub users: Vec<NewUser>,
    pub products: Vec<NewProduct>,
    pub sessions: Vec<NewSession>,
    pub page_views: Vec<NewPageView>,
    pub purchases: Vec<NewPurchase>,
    pub reviews: Vec<NewReview>,
}

/// Pick one element of a non-empty constant table.
fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    *items.choose(rng).expect("constant tables are non-empty")
}

/// Generate a dataset for `plan`, with every timestamp at or before `now`.
#[must_use]
pub fn generate(plan: SeedPlan, now: DateTime<Utc>) -> SampleData {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut data = SampleData::default();

    for i in 1..=plan.users {
        data.users.push(NewUser {
            email: format!("user{i}@example.com"),
            name: format!("{} {i}", pick(&mut rng, FIRST_NAMES)),
            age: rng.random_range(18..=70),
            gender: pick(&mut rng, GENDERS),
            location: pick(&mut rng, CITIES),
            registration_date: now - Duration::days(rng.random_range(1..=365)),
            is_premium: rng.random_bool(0.5),
        });
    }

    for i in 1..=plan.products {
        let price_cents: i64 = rng.random_range(1_000..=100_000);
        let rating_tenths: i32 = rng.random_range(10..=50);
        data.products.push(NewProduct {
            name: format!("Product {i}"),
            category: pick(&mut rng, CATEGORIES),
            price: Decimal::new(price_cents, 2),
            brand: pick(&mut rng, BRANDS),
            rating: f64::from(rating_tenths) / 10.0,
            stock_quantity: rng.random_range(0..=1000),
            description: format!(
                "This is a great {} product with excellent features.",
                pick(&mut rng, CATEGORIES).to_lowercase()
            ),
        });
    }

    for user in 0..data.users.len() {
        for _ in 0..rng.random_range(1..=10) {
            let session_start = now
                - Duration::days(rng.random_range(0..=30))
                - Duration::hours(rng.random_range(0..=23))
                - Duration::minutes(rng.random_range(0..=59));
            let duration_minutes = rng.random_range(1..=120);
            data.sessions.push(NewSession {
                user,
                session_start,
                session_end: session_start + Duration::minutes(duration_minutes),
                duration_minutes,
                pages_viewed: rng.random_range(1..=20),
                device_type: pick(&mut rng, DeviceType::ALL),
                browser: pick(&mut rng, BROWSERS),
            });
        }
    }

    for (index, session) in data.sessions.iter().enumerate() {
        for _ in 0..session.pages_viewed {
            let product = (rng.random_bool(0.5) && !data.products.is_empty())
                .then(|| rng.random_range(0..data.products.len()));
            data.page_views.push(NewPageView {
                session: index,
                product,
                page_type: pick(&mut rng, PageType::ALL),
                timestamp: session.session_start
                    + Duration::minutes(rng.random_range(0..=session.duration_minutes)),
                time_spent_seconds: rng.random_range(10..=300),
            });
        }
    }

    if !data.products.is_empty() {
        for user in 0..data.users.len() {
            for _ in 0..rng.random_range(0..=5) {
                let product = rng.random_range(0..data.products.len());
                let quantity: i32 = rng.random_range(1..=3);
                let discount = if rng.random_bool(0.5) {
                    rng.random_range(0.0..0.3)
                } else {
                    0.0
                };
                let unit_price = data.products.get(product).map_or(Decimal::ZERO, |p| p.price);
                let kept = Decimal::from_f64_retain(1.0 - discount).unwrap_or(Decimal::ONE);
                data.purchases.push(NewPurchase {
                    user,
                    product,
                    quantity,
                    total_amount: (unit_price * Decimal::from(quantity) * kept).round_dp(2),
                    purchase_date: now - Duration::days(rng.random_range(0..=30)),
                    payment_method: pick(&mut rng, PaymentMethod::ALL),
                    discount_applied: discount,
                });
            }
        }
    }

    for purchase in &data.purchases {
        if !rng.random_bool(0.5) {
            continue;
        }
        let verdict = if rng.random_bool(0.5) { "great" } else { "okay" };
        let certainty = if rng.random_bool(0.5) {
            "definitely"
        } else {
            "maybe"
        };
        // May land after `now` for purchases in the last two weeks.
        data.reviews.push(NewReview {
            user: purchase.user,
            product: purchase.product,
            rating: rng.random_range(1..=5),
            review_text: format!(
                "This product is {verdict}. Would {certainty} recommend to others."
            ),
            review_date: purchase.purchase_date + Duration::days(rng.random_range(1..=14)),
            helpful_votes: rng.random_range(0..=50),
        });
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_generate_is_deterministic_for_seed() {
        let a = generate(SeedPlan::default(), fixed_now());
        let b = generate(SeedPlan::default(), fixed_now());
        assert_eq!(a.sessions.len(), b.sessions.len());
        assert_eq!(a.purchases.len(), b.purchases.len());
        assert_eq!(
            a.users.first().map(|u| u.name.clone()),
            b.users.first().map(|u| u.name.clone())
        );
    }

    #[test]
    fn test_generate_respects_plan_sizes() {
        let data = generate(
            SeedPlan {
                users: 20,
                products: 5,
                seed: 7,
            },
            fixed_now(),
        );
        assert_eq!(data.users.len(), 20);
        assert_eq!(data.products.len(), 5);
        assert!(data.sessions.len() >= 20 && data.sessions.len() <= 200);
        assert!(data.purchases.len() <= 100);
        assert!(data.reviews.len() <= data.purchases.len());
    }

    #[test]
    fn test_page_views_match_session_page_counts() {
        let data = generate(SeedPlan::default(), fixed_now());
        let expected: i64 = data.sessions.iter().map(|s| i64::from(s.pages_viewed)).sum();
        assert_eq!(data.page_views.len() as i64, expected);

        for view in &data.page_views {
            let session = data.sessions.get(view.session).expect("session index");
            assert!(view.timestamp >= session.session_start);
            assert!(view.timestamp <= session.session_end);
        }
    }

    #[test]
    fn test_purchase_totals_apply_discount() {
        let data = generate(SeedPlan::default(), fixed_now());
        for purchase in &data.purchases {
            assert!((0.0..0.3).contains(&purchase.discount_applied));
            let product = data.products.get(purchase.product).expect("product index");
            let list_total = product.price * Decimal::from(purchase.quantity);
            assert!(purchase.total_amount <= list_total);
            assert!(purchase.purchase_date <= fixed_now());
        }
    }

    #[test]
    fn test_reviews_follow_their_purchase() {
        let data = generate(SeedPlan::default(), fixed_now());
        for review in &data.reviews {
            assert!((1..=5).contains(&review.rating));
            assert!(
                data.purchases
                    .iter()
                    .any(|p| p.user == review.user
                        && p.product == review.product
                        && review.review_date > p.purchase_date)
            );
        }
    }

    #[test]
    fn test_emails_are_unique() {
        let data = generate(SeedPlan::default(), fixed_now());
        let mut emails: Vec<&str> = data.users.iter().map(|u| u.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), data.users.len());
    }
}
