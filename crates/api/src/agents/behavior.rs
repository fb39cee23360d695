//! User behavior agent.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, instrument};

use storelens_core::{DeviceType, PageType, SessionId, UserId};

use super::capability::mentions_any;
use super::{Agent, Capability, ToolError, ToolParams, ToolSpec, pretty};
use crate::analysis::{self, behavior, window_start};
use crate::db::{
    PageViewRepository, ProductRepository, PurchaseRepository, SessionRepository, UserRepository,
};

/// Matches "user 42" anywhere in a lowercased query.
static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"user\s+(\d+)").expect("Invalid regex"));

const KEYWORDS: &[&str] = &[
    "user",
    "customer",
    "behavior",
    "session",
    "engagement",
    "activity",
    "interaction",
    "browsing",
    "page view",
    "journey",
    "retention",
    "segmentation",
    "device",
    "usage pattern",
];

const CAPABILITIES: &[Capability] = &[
    Capability::UserBehavior,
    Capability::SessionAnalysis,
    Capability::ProductAnalytics,
];

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "analyze_user_behavior",
        description: "Comprehensive analysis of specific user's behavior patterns",
        parameters: &["user_id", "days_back", "include_details"],
    },
    ToolSpec {
        name: "get_user_journey",
        description: "Track user journey and interaction flow",
        parameters: &["user_id", "session_id"],
    },
    ToolSpec {
        name: "analyze_session_patterns",
        description: "Analyze session patterns across users or specific segments",
        parameters: &["time_period", "device_filter"],
    },
    ToolSpec {
        name: "get_user_segmentation",
        description: "Segment users based on behavior patterns",
        parameters: &["segmentation_criteria"],
    },
    ToolSpec {
        name: "analyze_engagement_metrics",
        description: "Calculate and analyze user engagement metrics",
        parameters: &["metric_type", "time_period"],
    },
    ToolSpec {
        name: "get_user_retention",
        description: "Analyze user retention and churn patterns",
        parameters: &["cohort_period", "retention_metric"],
    },
    ToolSpec {
        name: "analyze_page_interactions",
        description: "Analyze how users interact with different pages",
        parameters: &["page_type", "interaction_metric", "time_period"],
    },
    ToolSpec {
        name: "get_device_behavior",
        description: "Analyze user behavior across different devices",
        parameters: &["device_comparison", "behavior_metric"],
    },
];

/// Default trailing window, in days.
const DEFAULT_DAYS: i64 = 30;

/// What a free-text query asks the behavior agent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Journey(Option<UserId>),
    Sessions,
    Engagement,
    Retention,
    Devices,
    Segmentation,
    User(UserId),
}

impl Intent {
    /// First matching keyword wins: journey, session, engagement, retention,
    /// device, segment. Otherwise a named user, else site-wide engagement.
    fn parse(query: &str) -> Self {
        let query = query.to_lowercase();
        let user = USER_RE
            .captures(&query)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .map(UserId::new);

        if query.contains("journey") {
            Self::Journey(user)
        } else if query.contains("session") {
            Self::Sessions
        } else if query.contains("engagement") {
            Self::Engagement
        } else if query.contains("retention") {
            Self::Retention
        } else if query.contains("device") {
            Self::Devices
        } else if query.contains("segment") {
            Self::Segmentation
        } else {
            user.map_or(Self::Engagement, Self::User)
        }
    }
}

/// Agent for sessions, journeys, engagement and segmentation.
pub struct BehaviorAgent {
    pool: PgPool,
}

impl BehaviorAgent {
    pub const ID: &'static str = "user_behavior_agent";

    /// Create a behavior agent reading from `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    async fn user_behavior(
        &self,
        user_id: UserId,
        days: i64,
        include_details: bool,
    ) -> Result<Value, ToolError> {
        let user = UserRepository::new(&self.pool)
            .get(user_id)
            .await?
            .ok_or_else(|| ToolError::NotFound(format!("User {user_id}")))?;

        let since = window_start(Utc::now(), days);
        let sessions = SessionRepository::new(&self.pool)
            .started_since(since, Some(user_id), None)
            .await?;
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(since, None, Some(user_id))
            .await?;
        let views = PageViewRepository::new(&self.pool)
            .recorded_since(since, Some(user_id), None)
            .await?;

        let report =
            behavior::user_behavior(&user, &sessions, &views, &purchases, days, include_details);
        Ok(serde_json::to_value(report)?)
    }

    #[instrument(skip(self))]
    async fn session_journey(&self, session_id: SessionId) -> Result<Value, ToolError> {
        let session = SessionRepository::new(&self.pool)
            .get(session_id)
            .await?
            .ok_or_else(|| ToolError::NotFound(format!("Session {session_id}")))?;
        let views = PageViewRepository::new(&self.pool)
            .for_sessions(&[session_id])
            .await?;
        let catalog = analysis::catalog(ProductRepository::new(&self.pool).all().await?);

        Ok(serde_json::to_value(behavior::session_journey(
            &session, &views, &catalog,
        ))?)
    }

    #[instrument(skip(self))]
    async fn journey_patterns(&self, user_id: UserId) -> Result<Value, ToolError> {
        let sessions = SessionRepository::new(&self.pool)
            .most_recent(Some(user_id), 10)
            .await?;
        let ids: Vec<SessionId> = sessions.iter().map(|s| s.id).collect();
        let views = PageViewRepository::new(&self.pool).for_sessions(&ids).await?;

        Ok(serde_json::to_value(behavior::journey_patterns(
            user_id, &sessions, &views,
        ))?)
    }

    #[instrument(skip(self))]
    async fn sample_journeys(&self) -> Result<Value, ToolError> {
        let sessions = SessionRepository::new(&self.pool).most_recent(None, 5).await?;
        let ids: Vec<SessionId> = sessions.iter().map(|s| s.id).collect();
        let views = PageViewRepository::new(&self.pool).for_sessions(&ids).await?;
        let catalog = analysis::catalog(ProductRepository::new(&self.pool).all().await?);

        Ok(serde_json::to_value(behavior::sample_journeys(
            &sessions, &views, &catalog,
        ))?)
    }

    #[instrument(skip(self))]
    async fn session_patterns(
        &self,
        days: i64,
        device: Option<DeviceType>,
    ) -> Result<Value, ToolError> {
        let since = window_start(Utc::now(), days);
        let sessions = SessionRepository::new(&self.pool)
            .started_since(since, None, device)
            .await?;
        Ok(serde_json::to_value(behavior::session_patterns(&sessions, days))?)
    }

    #[instrument(skip(self))]
    async fn segmentation(&self, criteria: &str) -> Result<Value, ToolError> {
        let users = UserRepository::new(&self.pool).all().await?;
        let sessions = SessionRepository::new(&self.pool).all().await?;
        let purchases = PurchaseRepository::new(&self.pool).all().await?;
        Ok(serde_json::to_value(behavior::segmentation(
            &users, &sessions, &purchases, criteria,
        ))?)
    }

    #[instrument(skip(self))]
    async fn engagement(&self, metric_type: &str, days: i64) -> Result<Value, ToolError> {
        let since = window_start(Utc::now(), days);
        let total_users = UserRepository::new(&self.pool).count().await?;
        let sessions = SessionRepository::new(&self.pool)
            .started_since(since, None, None)
            .await?;
        let views = PageViewRepository::new(&self.pool)
            .recorded_since(since, None, None)
            .await?;
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(since, None, None)
            .await?;

        Ok(serde_json::to_value(behavior::engagement_metrics(
            usize::try_from(total_users).unwrap_or(0),
            &sessions,
            views.len(),
            &purchases,
            metric_type,
            days,
        ))?)
    }

    #[instrument(skip(self))]
    async fn retention(&self, days: i64, metric: &str) -> Result<Value, ToolError> {
        let cutoff = window_start(Utc::now(), days);
        let users = UserRepository::new(&self.pool).all().await?;
        let sessions = SessionRepository::new(&self.pool)
            .started_since(cutoff, None, None)
            .await?;
        Ok(serde_json::to_value(behavior::retention(
            &users, &sessions, cutoff, days, metric,
        ))?)
    }

    #[instrument(skip(self))]
    async fn page_interactions(
        &self,
        page_type: Option<PageType>,
        metric: &str,
        days: i64,
    ) -> Result<Value, ToolError> {
        let since = window_start(Utc::now(), days);
        let views = PageViewRepository::new(&self.pool)
            .recorded_since(since, None, page_type)
            .await?;
        Ok(serde_json::to_value(behavior::page_interactions(
            &views, days, metric,
        ))?)
    }

    #[instrument(skip(self))]
    async fn device_behavior(&self, comparison: &str, metric: &str) -> Result<Value, ToolError> {
        let sessions = SessionRepository::new(&self.pool).all().await?;
        Ok(serde_json::to_value(behavior::device_behavior(
            &sessions, comparison, metric,
        ))?)
    }
}

#[async_trait]
impl Agent for BehaviorAgent {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "User Behavior Analyst"
    }

    fn description(&self) -> &'static str {
        "Specializes in analyzing user behavior patterns, customer engagement, session analysis, and user journey insights"
    }

    fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    fn tool_prefix(&self) -> &'static str {
        "behavior_"
    }

    fn tools(&self) -> &'static [ToolSpec] {
        TOOLS
    }

    fn can_handle(&self, query: &str) -> bool {
        mentions_any(query, KEYWORDS)
    }

    async fn process_query(&self, query: &str) -> Result<Value, ToolError> {
        let intent = Intent::parse(query);
        debug!(?intent, "Behavior query dispatched");

        match intent {
            Intent::Journey(Some(user_id)) => self.journey_patterns(user_id).await,
            Intent::Journey(None) => self.sample_journeys().await,
            Intent::Sessions => self.session_patterns(DEFAULT_DAYS, None).await,
            Intent::Engagement => self.engagement("overall", DEFAULT_DAYS).await,
            Intent::Retention => self.retention(DEFAULT_DAYS, "login").await,
            Intent::Devices => self.device_behavior("all", "session_duration").await,
            Intent::Segmentation => self.segmentation("engagement").await,
            Intent::User(user_id) => self.user_behavior(user_id, DEFAULT_DAYS, true).await,
        }
    }

    #[instrument(skip(self, params), fields(agent = Self::ID))]
    async fn call_tool(&self, name: &str, params: &ToolParams) -> Result<Value, ToolError> {
        match name {
            "analyze_user_behavior" => {
                let user_id = params
                    .opt_id("user_id")?
                    .ok_or(ToolError::MissingParameter("user_id"))?;
                self.user_behavior(
                    UserId::new(user_id),
                    params.days_or("days_back", DEFAULT_DAYS)?,
                    params.bool_or("include_details", true)?,
                )
                .await
            }
            "get_user_journey" => {
                if let Some(session_id) = params.opt_id("session_id")? {
                    self.session_journey(SessionId::new(session_id)).await
                } else if let Some(user_id) = params.opt_id("user_id")? {
                    self.journey_patterns(UserId::new(user_id)).await
                } else {
                    Err(ToolError::MissingParameter("Either user_id or session_id"))
                }
            }
            "analyze_session_patterns" => {
                self.session_patterns(
                    params.days_or("time_period", DEFAULT_DAYS)?,
                    params.opt_parse("device_filter")?,
                )
                .await
            }
            "get_user_segmentation" => {
                self.segmentation(params.str_or("segmentation_criteria", "engagement")?)
                    .await
            }
            "analyze_engagement_metrics" => {
                self.engagement(
                    params.str_or("metric_type", "overall")?,
                    params.days_or("time_period", DEFAULT_DAYS)?,
                )
                .await
            }
            "get_user_retention" => {
                self.retention(
                    params.days_or("cohort_period", DEFAULT_DAYS)?,
                    params.str_or("retention_metric", "login")?,
                )
                .await
            }
            "analyze_page_interactions" => {
                self.page_interactions(
                    params.opt_parse("page_type")?,
                    params.str_or("interaction_metric", "time_spent")?,
                    params.days_or("time_period", DEFAULT_DAYS)?,
                )
                .await
            }
            "get_device_behavior" => {
                self.device_behavior(
                    params.str_or("device_comparison", "all")?,
                    params.str_or("behavior_metric", "session_duration")?,
                )
                .await
            }
            other => Err(ToolError::UnknownTool {
                tool: other.to_string(),
                agent: self.name(),
            }),
        }
    }

    fn summarize(&self, data: &Value) -> String {
        summarize(data)
            .unwrap_or_else(|| format!("User Behavior Agent processed: {}", pretty(data)))
    }
}

/// Templated summary of an `analyze_user_behavior` report.
fn summarize(data: &Value) -> Option<String> {
    let summary = data.get("behavior_summary")?;
    let int = |key: &str| summary.get(key).and_then(Value::as_u64).unwrap_or(0);
    let float = |key: &str| summary.get(key).and_then(Value::as_f64).unwrap_or(0.0);

    let name = data
        .pointer("/user_profile/name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown User");
    let devices = data
        .get("device_preferences")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    let level = data
        .get("engagement_level")
        .and_then(Value::as_str)
        .map_or_else(|| "Unknown".to_string(), title_case);

    Some(format!(
        "User Behavior Analysis for {name}:\n\
         \n\
         📊 Activity Summary:\n\
         • Sessions: {} over {} days\n\
         • Average session duration: {:.1} minutes\n\
         • Page views: {} ({:.1} per session)\n\
         \n\
         💰 Purchase Behavior:\n\
         • Total purchases: {}\n\
         • Total spent: ${:.2}\n\
         • Average order value: ${:.2}\n\
         \n\
         📱 Device Preferences: {devices}\n\
         🎯 Engagement Level: {level}",
        int("total_sessions"),
        int("analysis_period_days"),
        float("avg_session_duration_minutes"),
        int("total_page_views"),
        float("pages_per_session"),
        int("total_purchases"),
        float("total_spent"),
        float("avg_order_value"),
    ))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn agent() -> BehaviorAgent {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/storelens_test")
            .expect("valid url");
        BehaviorAgent::new(pool)
    }

    #[test]
    fn test_intent_dispatch_order() {
        assert_eq!(
            Intent::parse("Show the journey of user 12"),
            Intent::Journey(Some(UserId::new(12)))
        );
        assert_eq!(Intent::parse("typical journeys"), Intent::Journey(None));
        assert_eq!(Intent::parse("session engagement"), Intent::Sessions);
        assert_eq!(Intent::parse("engagement by device"), Intent::Engagement);
        assert_eq!(Intent::parse("retention of customers"), Intent::Retention);
        assert_eq!(Intent::parse("device mix"), Intent::Devices);
        assert_eq!(Intent::parse("customer segments"), Intent::Segmentation);
        assert_eq!(Intent::parse("What is USER 7 doing?"), Intent::User(UserId::new(7)));
        assert_eq!(Intent::parse("customer activity"), Intent::Engagement);
    }

    #[test]
    fn test_intent_ignores_overflowing_user_id() {
        assert_eq!(Intent::parse("user 99999999999"), Intent::Engagement);
    }

    #[tokio::test]
    async fn test_can_handle_keywords() {
        let agent = agent();
        assert!(agent.can_handle("Usage pattern by hour"));
        assert!(agent.can_handle("Which DEVICE converts?"));
        assert!(!agent.can_handle("quarterly revenue"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = agent()
            .call_tool("predict_churn", &ToolParams::new())
            .await
            .expect_err("not a behavior tool");
        assert_eq!(
            err.to_string(),
            "Tool predict_churn not available for agent User Behavior Analyst"
        );
    }

    #[tokio::test]
    async fn test_required_parameters_checked_before_io() {
        let agent = agent();
        let err = agent
            .call_tool("analyze_user_behavior", &ToolParams::new())
            .await
            .expect_err("user_id missing");
        assert_eq!(err.to_string(), "user_id is required");

        let err = agent
            .call_tool("get_user_journey", &ToolParams::new())
            .await
            .expect_err("ids missing");
        assert_eq!(err.to_string(), "Either user_id or session_id is required");

        let err = agent
            .call_tool(
                "analyze_session_patterns",
                &ToolParams::new().with("device_filter", "watch"),
            )
            .await
            .expect_err("bad device");
        assert!(matches!(err, ToolError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_tool_catalogue() {
        let agent = agent();
        assert_eq!(agent.tools().len(), 8);
        assert_eq!(agent.tool_prefix(), "behavior_");
        assert!(agent.capabilities().contains(&Capability::SessionAnalysis));
    }

    #[tokio::test]
    async fn test_summary_template() {
        let data = json!({
            "user_profile": {"name": "Ivy Chen 3"},
            "behavior_summary": {
                "analysis_period_days": 30,
                "total_sessions": 4,
                "avg_session_duration_minutes": 12.345,
                "total_page_views": 10,
                "pages_per_session": 2.5,
                "total_purchases": 2,
                "total_spent": 150.0,
                "avg_order_value": 75.0
            },
            "device_preferences": {"desktop": 1, "mobile": 3},
            "engagement_level": "low"
        });
        let text = agent().summarize(&data);
        assert!(text.starts_with("User Behavior Analysis for Ivy Chen 3:"));
        assert!(text.contains("• Sessions: 4 over 30 days"));
        assert!(text.contains("• Average session duration: 12.3 minutes"));
        assert!(text.contains("• Page views: 10 (2.5 per session)"));
        assert!(text.contains("• Total spent: $150.00"));
        assert!(text.contains("📱 Device Preferences: desktop: 1, mobile: 3"));
        assert!(text.ends_with("🎯 Engagement Level: Low"));
    }

    #[tokio::test]
    async fn test_summary_fallback() {
        let text = agent().summarize(&json!({"segment_summary": {}}));
        assert!(text.starts_with("User Behavior Agent processed: {"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("inactive"), "Inactive");
        assert_eq!(title_case(""), "");
    }
}
