//! Behavior analytics: engagement, journeys, sessions, segments, retention.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use storelens_core::{DeviceType, PageType, ProductId, SessionId, UserId};

use super::{Catalog, arg_max, count, percent, ratio, round2};
use crate::models::{PageView, Purchase, User, UserSession};

/// Coarse activity tier of a single user over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
    Inactive,
}

impl EngagementLevel {
    /// Tier for the given activity: sessions weigh 1, page views 0.5 and
    /// purchases 3. Above 50 is high, above 15 medium, anything else low;
    /// no activity at all is inactive.
    #[must_use]
    pub fn from_activity(sessions: usize, page_views: usize, purchases: usize) -> Self {
        let score = count(sessions) + count(page_views) * 0.5 + count(purchases) * 3.0;
        if score > 50.0 {
            Self::High
        } else if score > 15.0 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::Inactive
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Inactive => "inactive",
        }
    }
}

// =============================================================================
// Single user
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub is_premium: bool,
    pub registration_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorSummary {
    pub analysis_period_days: i64,
    pub total_sessions: usize,
    pub avg_session_duration_minutes: f64,
    pub total_page_views: usize,
    pub pages_per_session: f64,
    pub total_purchases: usize,
    pub total_spent: f64,
    pub avg_order_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<f64>,
    pub pages_viewed: i32,
    pub device_type: DeviceType,
    pub browser: String,
}

/// One user's activity over a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct UserBehaviorReport {
    pub user_profile: UserProfile,
    pub behavior_summary: BehaviorSummary,
    pub device_preferences: BTreeMap<DeviceType, usize>,
    pub engagement_level: EngagementLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_sessions: Option<Vec<SessionDetail>>,
}

/// Summarize one user's sessions, page views and purchases.
///
/// `sessions` should be in start order; the details list keeps the last ten.
#[must_use]
pub fn user_behavior(
    user: &User,
    sessions: &[UserSession],
    page_views: &[PageView],
    purchases: &[Purchase],
    days: i64,
    include_details: bool,
) -> UserBehaviorReport {
    let total_duration: f64 = sessions.iter().map(UserSession::duration_or_zero).sum();
    let total_spent: f64 = purchases.iter().map(Purchase::amount).sum();

    let mut device_preferences = BTreeMap::new();
    for session in sessions {
        *device_preferences.entry(session.device_type).or_insert(0) += 1;
    }

    let detailed_sessions = include_details.then(|| {
        sessions
            .iter()
            .skip(sessions.len().saturating_sub(10))
            .map(|s| SessionDetail {
                session_id: s.id,
                start_time: s.session_start,
                duration_minutes: s.session_duration_minutes,
                pages_viewed: s.pages_viewed,
                device_type: s.device_type,
                browser: s.browser.clone(),
            })
            .collect()
    });

    UserBehaviorReport {
        user_profile: UserProfile {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_premium: user.is_premium,
            registration_date: user.registration_date,
        },
        behavior_summary: BehaviorSummary {
            analysis_period_days: days,
            total_sessions: sessions.len(),
            avg_session_duration_minutes: round2(ratio(total_duration, count(sessions.len()))),
            total_page_views: page_views.len(),
            pages_per_session: round2(ratio(count(page_views.len()), count(sessions.len()))),
            total_purchases: purchases.len(),
            total_spent: round2(total_spent),
            avg_order_value: round2(ratio(total_spent, count(purchases.len()))),
        },
        device_preferences,
        engagement_level: EngagementLevel::from_activity(
            sessions.len(),
            page_views.len(),
            purchases.len(),
        ),
        detailed_sessions,
    }
}

// =============================================================================
// Journeys
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub device_type: DeviceType,
    pub browser: String,
    pub total_duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyStep {
    pub step: usize,
    pub page_type: PageType,
    pub product_id: Option<ProductId>,
    pub timestamp: DateTime<Utc>,
    pub time_spent_seconds: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneySummary {
    pub total_steps: usize,
    pub total_time_seconds: i64,
    pub avg_time_per_step: f64,
}

/// The ordered page path through one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionJourney {
    pub session_info: SessionInfo,
    pub journey_steps: Vec<JourneyStep>,
    pub journey_summary: JourneySummary,
}

/// Walk the page views of `session` in the order given.
///
/// `views` may hold other sessions' views; they are skipped. Steps that hit
/// a product known to `catalog` carry its name and category.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn session_journey(
    session: &UserSession,
    views: &[PageView],
    catalog: &Catalog,
) -> SessionJourney {
    let journey_steps: Vec<JourneyStep> = views
        .iter()
        .filter(|v| v.session_id == session.id)
        .enumerate()
        .map(|(i, v)| {
            let product = v.product_id.and_then(|id| catalog.get(&id));
            JourneyStep {
                step: i + 1,
                page_type: v.page_type,
                product_id: v.product_id,
                timestamp: v.timestamp,
                time_spent_seconds: v.time_spent_seconds,
                product_name: product.map(|p| p.name.clone()),
                product_category: product.map(|p| p.category.clone()),
            }
        })
        .collect();

    let total_time: i64 = journey_steps
        .iter()
        .map(|s| i64::from(s.time_spent_seconds))
        .sum();

    SessionJourney {
        session_info: SessionInfo {
            session_id: session.id,
            user_id: session.user_id,
            device_type: session.device_type,
            browser: session.browser.clone(),
            total_duration_minutes: session.session_duration_minutes,
        },
        journey_summary: JourneySummary {
            total_steps: journey_steps.len(),
            total_time_seconds: total_time,
            avg_time_per_step: ratio(total_time as f64, count(journey_steps.len())),
        },
        journey_steps,
    }
}

/// How often each page path ("home -> product -> cart") recurs for a user.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyPatterns {
    pub user_id: UserId,
    pub journey_patterns: BTreeMap<String, usize>,
    pub most_common_pattern: Option<(String, usize)>,
}

/// Count the page-type paths of `sessions`.
///
/// `views` must be in visit order within each session. A session without
/// page views contributes the empty path.
#[must_use]
pub fn journey_patterns(
    user_id: UserId,
    sessions: &[UserSession],
    views: &[PageView],
) -> JourneyPatterns {
    let mut patterns: BTreeMap<String, usize> = BTreeMap::new();
    for session in sessions {
        let path = views
            .iter()
            .filter(|v| v.session_id == session.id)
            .map(|v| v.page_type.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        *patterns.entry(path).or_insert(0) += 1;
    }

    let most_common_pattern = arg_max(
        patterns
            .iter()
            .map(|(path, &n)| ((path.clone(), n), count(n))),
    );

    JourneyPatterns {
        user_id,
        journey_patterns: patterns,
        most_common_pattern,
    }
}

/// Journeys of the most recent sessions, used when no user is named.
#[derive(Debug, Clone, Serialize)]
pub struct SampleJourneys {
    pub query_analysis: &'static str,
    pub sample_journeys: Vec<SessionJourney>,
}

#[must_use]
pub fn sample_journeys(
    sessions: &[UserSession],
    views: &[PageView],
    catalog: &Catalog,
) -> SampleJourneys {
    SampleJourneys {
        query_analysis: "General user journey patterns",
        sample_journeys: sessions
            .iter()
            .map(|s| session_journey(s, views, catalog))
            .collect(),
    }
}

// =============================================================================
// Session patterns
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DurationBuckets {
    /// Under 5 minutes.
    pub short: usize,
    /// 5 to 30 minutes.
    pub medium: usize,
    /// 30 minutes or more.
    pub long: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDistributions {
    pub hourly_distribution: BTreeMap<u32, usize>,
    pub daily_distribution: BTreeMap<String, usize>,
    pub device_distribution: BTreeMap<DeviceType, usize>,
    pub duration_distribution: DurationBuckets,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInsights {
    pub peak_hour: Option<u32>,
    pub peak_day: Option<String>,
    pub preferred_device: Option<DeviceType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionPatterns {
    pub analysis_period_days: i64,
    pub total_sessions_analyzed: usize,
    pub average_session_duration: f64,
    pub patterns: SessionDistributions,
    pub insights: SessionInsights,
}

/// Hour-of-day, weekday, device and duration distributions of `sessions`.
#[must_use]
pub fn session_patterns(sessions: &[UserSession], days: i64) -> SessionPatterns {
    let mut hourly: BTreeMap<u32, usize> = BTreeMap::new();
    let mut daily: BTreeMap<String, usize> = BTreeMap::new();
    let mut devices: BTreeMap<DeviceType, usize> = BTreeMap::new();
    let mut durations = DurationBuckets::default();

    for session in sessions {
        *hourly.entry(session.session_start.hour()).or_insert(0) += 1;
        *daily
            .entry(session.session_start.format("%A").to_string())
            .or_insert(0) += 1;
        *devices.entry(session.device_type).or_insert(0) += 1;

        let minutes = session.duration_or_zero();
        if minutes < 5.0 {
            durations.short += 1;
        } else if minutes < 30.0 {
            durations.medium += 1;
        } else {
            durations.long += 1;
        }
    }

    let total_duration: f64 = sessions.iter().map(UserSession::duration_or_zero).sum();

    SessionPatterns {
        analysis_period_days: days,
        total_sessions_analyzed: sessions.len(),
        average_session_duration: round2(ratio(total_duration, count(sessions.len()))),
        insights: SessionInsights {
            peak_hour: arg_max(hourly.iter().map(|(&h, &n)| (h, count(n)))),
            peak_day: arg_max(daily.iter().map(|(d, &n)| (d.clone(), count(n)))),
            preferred_device: arg_max(devices.iter().map(|(&d, &n)| (d, count(n)))),
        },
        patterns: SessionDistributions {
            hourly_distribution: hourly,
            daily_distribution: daily,
            device_distribution: devices,
            duration_distribution: durations,
        },
    }
}

// =============================================================================
// Segmentation
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SegmentMember {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub is_premium: bool,
    pub engagement_score: f64,
    pub sessions_count: usize,
    pub purchases_count: usize,
    pub total_spent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Segments {
    pub high_engagement: Vec<SegmentMember>,
    pub medium_engagement: Vec<SegmentMember>,
    pub low_engagement: Vec<SegmentMember>,
    pub inactive: Vec<SegmentMember>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SegmentSummary {
    pub high_engagement: usize,
    pub medium_engagement: usize,
    pub low_engagement: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Segmentation {
    pub segmentation_criteria: String,
    pub segments: Segments,
    pub segment_summary: SegmentSummary,
}

/// Bucket every user by lifetime engagement score.
///
/// Score = sessions + 2 × purchases + spent / 100. Zero is inactive, under 5
/// low, under 20 medium, the rest high.
#[must_use]
pub fn segmentation(
    users: &[User],
    sessions: &[UserSession],
    purchases: &[Purchase],
    criteria: &str,
) -> Segmentation {
    let mut session_counts: HashMap<UserId, usize> = HashMap::new();
    for session in sessions {
        *session_counts.entry(session.user_id).or_insert(0) += 1;
    }
    let mut spend: HashMap<UserId, (usize, f64)> = HashMap::new();
    for purchase in purchases {
        let entry = spend.entry(purchase.user_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += purchase.amount();
    }

    let mut segments = Segments::default();
    for user in users {
        let sessions_count = session_counts.get(&user.id).copied().unwrap_or(0);
        let (purchases_count, total_spent) = spend.get(&user.id).copied().unwrap_or((0, 0.0));
        let score = count(sessions_count) + count(purchases_count) * 2.0 + total_spent / 100.0;

        let member = SegmentMember {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_premium: user.is_premium,
            engagement_score: round2(score),
            sessions_count,
            purchases_count,
            total_spent: round2(total_spent),
        };

        let bucket = if score == 0.0 {
            &mut segments.inactive
        } else if score < 5.0 {
            &mut segments.low_engagement
        } else if score < 20.0 {
            &mut segments.medium_engagement
        } else {
            &mut segments.high_engagement
        };
        bucket.push(member);
    }

    Segmentation {
        segmentation_criteria: criteria.to_string(),
        segment_summary: SegmentSummary {
            high_engagement: segments.high_engagement.len(),
            medium_engagement: segments.medium_engagement.len(),
            low_engagement: segments.low_engagement.len(),
            inactive: segments.inactive.len(),
        },
        segments,
    }
}

// =============================================================================
// Engagement
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngagementRates {
    pub user_activity_rate: f64,
    pub sessions_per_user: f64,
    pub pages_per_session: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngagementCounts {
    pub total_users: usize,
    pub active_users: usize,
    pub total_sessions: usize,
    pub total_page_views: usize,
    pub purchasing_users: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementReport {
    pub metric_type: String,
    pub time_period_days: i64,
    pub engagement_metrics: EngagementRates,
    pub raw_numbers: EngagementCounts,
}

/// Site-wide engagement over a window.
///
/// `sessions`, `page_view_count` and `purchases` cover the window only;
/// `total_users` is the whole registered base.
#[must_use]
pub fn engagement_metrics(
    total_users: usize,
    sessions: &[UserSession],
    page_view_count: usize,
    purchases: &[Purchase],
    metric_type: &str,
    days: i64,
) -> EngagementReport {
    let active_users = sessions.iter().map(|s| s.user_id).collect::<HashSet<_>>().len();
    let purchasing_users = purchases.iter().map(|p| p.user_id).collect::<HashSet<_>>().len();

    EngagementReport {
        metric_type: metric_type.to_string(),
        time_period_days: days,
        engagement_metrics: EngagementRates {
            user_activity_rate: round2(percent(count(active_users), count(total_users))),
            sessions_per_user: round2(ratio(count(sessions.len()), count(active_users))),
            pages_per_session: round2(ratio(count(page_view_count), count(sessions.len()))),
            conversion_rate: round2(percent(count(purchasing_users), count(active_users))),
        },
        raw_numbers: EngagementCounts {
            total_users,
            active_users,
            total_sessions: sessions.len(),
            total_page_views: page_view_count,
            purchasing_users,
        },
    }
}

// =============================================================================
// Retention
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionTrend {
    Improving,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

impl ChurnRisk {
    /// Low above 70 % retention, medium above 50 %, otherwise high.
    #[must_use]
    pub fn from_retention(rate: f64) -> Self {
        if rate > 70.0 {
            Self::Low
        } else if rate > 50.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CohortRetention {
    pub total_users: usize,
    pub active_users: usize,
    pub retention_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetentionCohorts {
    pub recent_cohort: CohortRetention,
    pub older_cohort: CohortRetention,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetentionInsights {
    pub overall_retention_trend: RetentionTrend,
    pub churn_risk: ChurnRisk,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetentionReport {
    pub analysis_period_days: i64,
    pub retention_metric: String,
    pub cohort_analysis: RetentionCohorts,
    pub insights: RetentionInsights,
}

/// Compare how many recently registered users were active in the window
/// against users registered before it.
///
/// `sessions` must hold only sessions started at or after `cutoff`.
#[must_use]
pub fn retention(
    users: &[User],
    sessions: &[UserSession],
    cutoff: DateTime<Utc>,
    days: i64,
    metric: &str,
) -> RetentionReport {
    let active: HashSet<UserId> = sessions.iter().map(|s| s.user_id).collect();

    let cohort = |recent: bool| {
        let members: Vec<&User> = users
            .iter()
            .filter(|u| (u.registration_date >= cutoff) == recent)
            .collect();
        let active_users = members.iter().filter(|u| active.contains(&u.id)).count();
        CohortRetention {
            total_users: members.len(),
            active_users,
            retention_rate: round2(percent(count(active_users), count(members.len()))),
        }
    };
    let recent_cohort = cohort(true);
    let older_cohort = cohort(false);

    RetentionReport {
        analysis_period_days: days,
        retention_metric: metric.to_string(),
        insights: RetentionInsights {
            overall_retention_trend: if recent_cohort.retention_rate > older_cohort.retention_rate
            {
                RetentionTrend::Improving
            } else {
                RetentionTrend::Declining
            },
            churn_risk: ChurnRisk::from_retention(recent_cohort.retention_rate),
        },
        cohort_analysis: RetentionCohorts {
            recent_cohort,
            older_cohort,
        },
    }
}

// =============================================================================
// Page interactions
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageStats {
    pub total_views: usize,
    pub total_time_spent: i64,
    pub avg_time_spent: f64,
    pub unique_sessions: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageInsights {
    pub most_engaging_page: Option<PageType>,
    pub most_viewed_page: Option<PageType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInteractionReport {
    pub analysis_period_days: i64,
    pub interaction_metric: String,
    pub page_interactions: BTreeMap<PageType, PageStats>,
    pub insights: PageInsights,
}

/// Views, dwell time and reach per page type.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn page_interactions(views: &[PageView], days: i64, metric: &str) -> PageInteractionReport {
    let mut grouped: BTreeMap<PageType, (usize, i64, HashSet<SessionId>)> = BTreeMap::new();
    for view in views {
        let entry = grouped
            .entry(view.page_type)
            .or_insert_with(|| (0, 0, HashSet::new()));
        entry.0 += 1;
        entry.1 += i64::from(view.time_spent_seconds);
        entry.2.insert(view.session_id);
    }

    let stats: BTreeMap<PageType, PageStats> = grouped
        .into_iter()
        .map(|(page, (views, seconds, sessions))| {
            (
                page,
                PageStats {
                    total_views: views,
                    total_time_spent: seconds,
                    avg_time_spent: round2(ratio(seconds as f64, count(views))),
                    unique_sessions: sessions.len(),
                },
            )
        })
        .collect();

    PageInteractionReport {
        analysis_period_days: days,
        interaction_metric: metric.to_string(),
        insights: PageInsights {
            most_engaging_page: arg_max(stats.iter().map(|(&p, s)| (p, s.avg_time_spent))),
            most_viewed_page: arg_max(stats.iter().map(|(&p, s)| (p, count(s.total_views)))),
        },
        page_interactions: stats,
    }
}

// =============================================================================
// Devices
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeviceStats {
    pub total_sessions: usize,
    pub total_duration: f64,
    pub total_pages: i64,
    pub avg_duration: f64,
    pub avg_pages_per_session: f64,
    pub unique_users: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeviceInsights {
    pub most_used_device: Option<DeviceType>,
    pub highest_engagement_device: Option<DeviceType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceBehaviorReport {
    pub device_comparison: String,
    pub behavior_metric: String,
    pub device_analysis: BTreeMap<DeviceType, DeviceStats>,
    pub insights: DeviceInsights,
}

/// Session volume, duration and depth per device class.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn device_behavior(
    sessions: &[UserSession],
    comparison: &str,
    metric: &str,
) -> DeviceBehaviorReport {
    let mut grouped: BTreeMap<DeviceType, (usize, f64, i64, HashSet<UserId>)> = BTreeMap::new();
    for session in sessions {
        let entry = grouped
            .entry(session.device_type)
            .or_insert_with(|| (0, 0.0, 0, HashSet::new()));
        entry.0 += 1;
        entry.1 += session.duration_or_zero();
        entry.2 += i64::from(session.pages_viewed);
        entry.3.insert(session.user_id);
    }

    let analysis: BTreeMap<DeviceType, DeviceStats> = grouped
        .into_iter()
        .map(|(device, (n, minutes, pages, users))| {
            (
                device,
                DeviceStats {
                    total_sessions: n,
                    total_duration: round2(minutes),
                    total_pages: pages,
                    avg_duration: round2(ratio(minutes, count(n))),
                    avg_pages_per_session: round2(ratio(pages as f64, count(n))),
                    unique_users: users.len(),
                },
            )
        })
        .collect();

    DeviceBehaviorReport {
        device_comparison: comparison.to_string(),
        behavior_metric: metric.to_string(),
        insights: DeviceInsights {
            most_used_device: arg_max(analysis.iter().map(|(&d, s)| (d, count(s.total_sessions)))),
            highest_engagement_device: arg_max(analysis.iter().map(|(&d, s)| (d, s.avg_duration))),
        },
        device_analysis: analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::catalog;
    use crate::analysis::fixtures::{days_ago, now, product, purchase, session, user, view};
    use storelens_core::PaymentMethod;

    #[test]
    fn test_engagement_level_thresholds() {
        assert_eq!(EngagementLevel::from_activity(0, 0, 0), EngagementLevel::Inactive);
        assert_eq!(EngagementLevel::from_activity(1, 0, 0), EngagementLevel::Low);
        // 10 + 4 * 0.5 + 1 * 3 = 15, not above 15
        assert_eq!(EngagementLevel::from_activity(10, 4, 1), EngagementLevel::Low);
        assert_eq!(EngagementLevel::from_activity(10, 6, 1), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_activity(40, 10, 2), EngagementLevel::High);
    }

    #[test]
    fn test_user_behavior_summary() {
        let shopper = user(1, 100);
        let sessions = vec![
            session(1, 1, days_ago(3), 10.0, 4, DeviceType::Mobile),
            session(2, 1, days_ago(2), 20.0, 2, DeviceType::Mobile),
            session(3, 1, days_ago(1), 30.0, 3, DeviceType::Desktop),
        ];
        let views = vec![
            view(1, 1, PageType::Home, None, 30),
            view(2, 1, PageType::Product, Some(1), 60),
            view(3, 2, PageType::Cart, None, 10),
        ];
        let purchases = vec![
            purchase(1, 1, 1, 100, days_ago(2), PaymentMethod::Paypal, 0.0),
            purchase(2, 1, 1, 50, days_ago(1), PaymentMethod::Paypal, 0.0),
        ];

        let report = user_behavior(&shopper, &sessions, &views, &purchases, 30, true);
        let summary = &report.behavior_summary;
        assert_eq!(summary.total_sessions, 3);
        assert!((summary.avg_session_duration_minutes - 20.0).abs() < f64::EPSILON);
        assert!((summary.pages_per_session - 1.0).abs() < f64::EPSILON);
        assert!((summary.total_spent - 150.0).abs() < f64::EPSILON);
        assert!((summary.avg_order_value - 75.0).abs() < f64::EPSILON);
        assert_eq!(report.device_preferences.get(&DeviceType::Mobile), Some(&2));
        assert_eq!(report.engagement_level, EngagementLevel::Low);
        assert_eq!(report.detailed_sessions.map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_user_behavior_without_details_omits_sessions() {
        let report = user_behavior(&user(1, 10), &[], &[], &[], 7, false);
        let json = serde_json::to_value(&report).expect("serializable");
        assert!(json.get("detailed_sessions").is_none());
        assert_eq!(json["engagement_level"], "inactive");
        assert_eq!(json["behavior_summary"]["avg_order_value"], 0.0);
    }

    #[test]
    fn test_detailed_sessions_keep_last_ten() {
        let sessions: Vec<UserSession> = (1..=12)
            .map(|i| session(i, 1, days_ago(20 - i64::from(i)), 5.0, 1, DeviceType::Tablet))
            .collect();
        let report = user_behavior(&user(1, 50), &sessions, &[], &[], 30, true);
        let details = report.detailed_sessions.expect("details requested");
        assert_eq!(details.len(), 10);
        assert_eq!(details.first().map(|d| d.session_id), Some(SessionId::new(3)));
    }

    #[test]
    fn test_session_journey_attaches_products() {
        let products = catalog(vec![product(7, "Books", 12)]);
        let visit = session(1, 1, days_ago(1), 12.0, 3, DeviceType::Desktop);
        let views = vec![
            view(1, 1, PageType::Home, None, 20),
            view(2, 2, PageType::Cart, None, 99),
            view(3, 1, PageType::Product, Some(7), 40),
        ];

        let journey = session_journey(&visit, &views, &products);
        assert_eq!(journey.journey_steps.len(), 2);
        assert_eq!(journey.journey_summary.total_time_seconds, 60);
        assert!((journey.journey_summary.avg_time_per_step - 30.0).abs() < f64::EPSILON);

        let step = journey.journey_steps.get(1).expect("second step");
        assert_eq!(step.step, 2);
        assert_eq!(step.product_category.as_deref(), Some("Books"));
    }

    #[test]
    fn test_journey_patterns_most_common() {
        let sessions = vec![
            session(1, 4, days_ago(1), 5.0, 2, DeviceType::Mobile),
            session(2, 4, days_ago(2), 5.0, 2, DeviceType::Mobile),
            session(3, 4, days_ago(3), 5.0, 1, DeviceType::Mobile),
        ];
        let views = vec![
            view(1, 1, PageType::Home, None, 5),
            view(2, 1, PageType::Product, Some(1), 5),
            view(3, 2, PageType::Home, None, 5),
            view(4, 2, PageType::Product, Some(1), 5),
            view(5, 3, PageType::Checkout, None, 5),
        ];

        let patterns = journey_patterns(UserId::new(4), &sessions, &views);
        assert_eq!(patterns.journey_patterns.get("home -> product"), Some(&2));
        assert_eq!(
            patterns.most_common_pattern,
            Some(("home -> product".to_string(), 2))
        );
    }

    #[test]
    fn test_journey_patterns_empty() {
        let patterns = journey_patterns(UserId::new(4), &[], &[]);
        let json = serde_json::to_value(&patterns).expect("serializable");
        assert!(json["most_common_pattern"].is_null());
    }

    #[test]
    fn test_session_patterns_buckets_and_peaks() {
        let monday_9am = DateTime::parse_from_rfc3339("2025-06-09T09:15:00Z")
            .expect("valid")
            .with_timezone(&Utc);
        let sessions = vec![
            session(1, 1, monday_9am, 3.0, 1, DeviceType::Mobile),
            session(2, 2, monday_9am, 10.0, 1, DeviceType::Mobile),
            session(3, 3, days_ago(1), 45.0, 1, DeviceType::Desktop),
        ];

        let report = session_patterns(&sessions, 30);
        let durations = report.patterns.duration_distribution;
        assert_eq!((durations.short, durations.medium, durations.long), (1, 1, 1));
        assert_eq!(report.insights.peak_hour, Some(9));
        assert_eq!(report.insights.peak_day.as_deref(), Some("Monday"));
        assert_eq!(report.insights.preferred_device, Some(DeviceType::Mobile));
        assert!((report.average_session_duration - 19.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_patterns_empty_insights_are_null() {
        let json = serde_json::to_value(session_patterns(&[], 30)).expect("serializable");
        assert!(json["insights"]["peak_hour"].is_null());
        assert_eq!(json["total_sessions_analyzed"], 0);
    }

    #[test]
    fn test_segmentation_scores() {
        let users = vec![user(1, 10), user(2, 10), user(3, 10), user(4, 10)];
        let mut sessions = vec![session(1, 2, days_ago(1), 1.0, 1, DeviceType::Mobile)];
        sessions.extend(
            (10..16).map(|i| session(i, 3, days_ago(1), 1.0, 1, DeviceType::Mobile)),
        );
        let purchases = vec![
            purchase(1, 4, 1, 1500, days_ago(1), PaymentMethod::CreditCard, 0.0),
            purchase(2, 4, 1, 500, days_ago(1), PaymentMethod::CreditCard, 0.0),
        ];

        let result = segmentation(&users, &sessions, &purchases, "engagement");
        assert_eq!(result.segment_summary.inactive, 1);
        assert_eq!(result.segment_summary.low_engagement, 1);
        assert_eq!(result.segment_summary.medium_engagement, 1);
        assert_eq!(result.segment_summary.high_engagement, 1);

        let high = result.segments.high_engagement.first().expect("one high user");
        assert_eq!(high.user_id, UserId::new(4));
        // 0 sessions + 2 purchases * 2 + 2000 / 100
        assert!((high.engagement_score - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engagement_metrics_rates() {
        let sessions = vec![
            session(1, 1, days_ago(1), 1.0, 1, DeviceType::Mobile),
            session(2, 1, days_ago(2), 1.0, 1, DeviceType::Mobile),
            session(3, 2, days_ago(3), 1.0, 1, DeviceType::Mobile),
        ];
        let purchases = vec![purchase(1, 1, 1, 10, days_ago(1), PaymentMethod::Paypal, 0.0)];

        let report = engagement_metrics(4, &sessions, 9, &purchases, "overall", 30);
        let rates = report.engagement_metrics;
        assert!((rates.user_activity_rate - 50.0).abs() < f64::EPSILON);
        assert!((rates.sessions_per_user - 1.5).abs() < f64::EPSILON);
        assert!((rates.pages_per_session - 3.0).abs() < f64::EPSILON);
        assert!((rates.conversion_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.raw_numbers.active_users, 2);
    }

    #[test]
    fn test_engagement_metrics_empty_dataset() {
        let report = engagement_metrics(0, &[], 0, &[], "overall", 30);
        assert!(report.engagement_metrics.user_activity_rate.abs() < f64::EPSILON);
        assert!(report.engagement_metrics.conversion_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_retention_cohorts() {
        let cutoff = days_ago(30);
        let users = vec![user(1, 5), user(2, 10), user(3, 100), user(4, 200)];
        let sessions = vec![
            session(1, 1, days_ago(1), 1.0, 1, DeviceType::Mobile),
            session(2, 2, days_ago(2), 1.0, 1, DeviceType::Mobile),
            session(3, 3, days_ago(3), 1.0, 1, DeviceType::Mobile),
        ];

        let report = retention(&users, &sessions, cutoff, 30, "login");
        let recent = report.cohort_analysis.recent_cohort;
        let older = report.cohort_analysis.older_cohort;
        assert_eq!((recent.total_users, recent.active_users), (2, 2));
        assert_eq!((older.total_users, older.active_users), (2, 1));
        assert!((recent.retention_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.insights.overall_retention_trend, RetentionTrend::Improving);
        assert_eq!(report.insights.churn_risk, ChurnRisk::Low);
    }

    #[test]
    fn test_churn_risk_thresholds() {
        assert_eq!(ChurnRisk::from_retention(70.0), ChurnRisk::Medium);
        assert_eq!(ChurnRisk::from_retention(70.01), ChurnRisk::Low);
        assert_eq!(ChurnRisk::from_retention(50.0), ChurnRisk::High);
    }

    #[test]
    fn test_page_interactions() {
        let views = vec![
            view(1, 1, PageType::Home, None, 10),
            view(2, 1, PageType::Home, None, 20),
            view(3, 2, PageType::Home, None, 30),
            view(4, 2, PageType::Checkout, None, 200),
        ];

        let report = page_interactions(&views, 30, "time_spent");
        let home = report.page_interactions.get(&PageType::Home).expect("home stats");
        assert_eq!(home.total_views, 3);
        assert_eq!(home.total_time_spent, 60);
        assert!((home.avg_time_spent - 20.0).abs() < f64::EPSILON);
        assert_eq!(home.unique_sessions, 2);
        assert_eq!(report.insights.most_viewed_page, Some(PageType::Home));
        assert_eq!(report.insights.most_engaging_page, Some(PageType::Checkout));
    }

    #[test]
    fn test_device_behavior() {
        let sessions = vec![
            session(1, 1, now(), 10.0, 4, DeviceType::Mobile),
            session(2, 2, now(), 20.0, 2, DeviceType::Mobile),
            session(3, 1, now(), 60.0, 9, DeviceType::Desktop),
        ];

        let report = device_behavior(&sessions, "all", "session_duration");
        let mobile = report.device_analysis.get(&DeviceType::Mobile).expect("mobile stats");
        assert_eq!(mobile.total_sessions, 2);
        assert_eq!(mobile.total_pages, 6);
        assert!((mobile.avg_duration - 15.0).abs() < f64::EPSILON);
        assert_eq!(mobile.unique_users, 2);
        assert_eq!(report.insights.most_used_device, Some(DeviceType::Mobile));
        assert_eq!(report.insights.highest_engagement_device, Some(DeviceType::Desktop));
    }
}
