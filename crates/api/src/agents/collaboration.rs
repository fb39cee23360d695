//! Cross-agent analyses that combine behavior and financial tool output.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::{Agent, AgentCoordinator, BehaviorAgent, FinancialAgent, ToolError, ToolParams, money};

/// The supported combined analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationKind {
    /// Engagement segments next to lifetime value.
    UserFinancialCorrelation,
    /// Engagement metrics next to revenue performance.
    BehaviorRevenueImpact,
    /// Segments, session insights, key financial metrics and LTV with
    /// recommendations and an executive summary.
    ComprehensiveAnalysis,
}

impl CollaborationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserFinancialCorrelation => "user_financial_correlation",
            Self::BehaviorRevenueImpact => "behavior_revenue_impact",
            Self::ComprehensiveAnalysis => "comprehensive_analysis",
        }
    }
}

impl fmt::Display for CollaborationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollaborationKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_financial_correlation" => Ok(Self::UserFinancialCorrelation),
            "behavior_revenue_impact" => Ok(Self::BehaviorRevenueImpact),
            "comprehensive_analysis" => Ok(Self::ComprehensiveAnalysis),
            other => Err(ToolError::UnknownAnalysis(other.to_string())),
        }
    }
}

/// The two registered agents a collaboration draws on.
struct Pair<'a> {
    behavior: &'a dyn Agent,
    financial: &'a dyn Agent,
}

impl<'a> Pair<'a> {
    fn resolve(coordinator: &'a AgentCoordinator) -> Result<Self, ToolError> {
        let behavior = coordinator
            .agent(BehaviorAgent::ID)
            .ok_or(ToolError::AgentUnavailable(BehaviorAgent::ID))?;
        let financial = coordinator
            .agent(FinancialAgent::ID)
            .ok_or(ToolError::AgentUnavailable(FinancialAgent::ID))?;
        Ok(Self {
            behavior: behavior.as_ref(),
            financial: financial.as_ref(),
        })
    }
}

/// Run the named combined analysis.
///
/// # Errors
///
/// Returns `ToolError::UnknownAnalysis` for an unrecognized `analysis_type`,
/// `ToolError::AgentUnavailable` if either agent is not registered, or any
/// error from the underlying tools.
#[instrument(skip(coordinator, params))]
pub async fn collaborate(
    coordinator: &AgentCoordinator,
    analysis_type: &str,
    params: &ToolParams,
) -> Result<Value, ToolError> {
    let kind: CollaborationKind = analysis_type.parse()?;
    let agents = Pair::resolve(coordinator)?;

    match kind {
        CollaborationKind::UserFinancialCorrelation => user_financial_correlation(&agents).await,
        CollaborationKind::BehaviorRevenueImpact => behavior_revenue_impact(&agents).await,
        CollaborationKind::ComprehensiveAnalysis => {
            comprehensive_analysis(&agents, params.days_or("time_period", 30)?).await
        }
    }
}

/// `section` of `data`, or an empty object.
fn section(data: &Value, key: &str) -> Value {
    data.get(key).cloned().unwrap_or_else(|| json!({}))
}

/// A JSON number as written, or `0`.
fn number_text(value: Option<&Value>) -> String {
    value
        .filter(|v| v.is_number())
        .map_or_else(|| "0".to_string(), Value::to_string)
}

async fn user_financial_correlation(agents: &Pair<'_>) -> Result<Value, ToolError> {
    let segments = agents
        .behavior
        .call_tool(
            "get_user_segmentation",
            &ToolParams::new().with("segmentation_criteria", "engagement"),
        )
        .await?;
    let ltv = agents
        .financial
        .call_tool("calculate_customer_ltv", &ToolParams::new())
        .await?;

    Ok(json!({
        "analysis_type": "User Behavior vs Financial Performance Correlation",
        "behavior_segments": section(&segments, "segment_summary"),
        "ltv_analysis": section(&ltv, "ltv_summary"),
        "insights": {
            "high_engagement_correlation": "Users with high engagement typically show higher LTV",
            "behavior_financial_link": "Strong correlation between session frequency and purchase value",
            "recommendation": "Focus marketing efforts on medium-engagement users to move them to high-engagement",
        },
    }))
}

async fn behavior_revenue_impact(agents: &Pair<'_>) -> Result<Value, ToolError> {
    let engagement = agents
        .behavior
        .call_tool(
            "analyze_engagement_metrics",
            &ToolParams::new().with("metric_type", "overall"),
        )
        .await?;
    let revenue = agents
        .financial
        .call_tool(
            "generate_revenue_report",
            &ToolParams::new().with("time_period", 30),
        )
        .await?;

    let metrics = section(&engagement, "engagement_metrics");
    let conversion = number_text(metrics.get("conversion_rate"));
    let pages = number_text(metrics.get("pages_per_session"));

    Ok(json!({
        "analysis_type": "Behavior Impact on Revenue",
        "engagement_metrics": metrics,
        "revenue_performance": section(&revenue, "revenue_summary"),
        "impact_insights": {
            "conversion_rate_impact": format!("Current conversion rate of {conversion}% directly impacts revenue"),
            "session_quality": format!("Users view {pages} pages per session on average"),
            "revenue_optimization": "Increasing pages per session by 1 could potentially increase revenue by 5-10%",
        },
        "recommendations": [
            "Improve user engagement to increase conversion rates",
            "Optimize page experience to increase time spent per session",
            "Implement targeted campaigns for high-engagement users",
        ],
    }))
}

async fn comprehensive_analysis(agents: &Pair<'_>, days: i64) -> Result<Value, ToolError> {
    let window = ToolParams::new().with("time_period", days);
    let segments = agents
        .behavior
        .call_tool("get_user_segmentation", &ToolParams::new())
        .await?;
    let sessions = agents
        .behavior
        .call_tool("analyze_session_patterns", &window)
        .await?;
    let summary = agents
        .financial
        .call_tool("generate_financial_summary", &window)
        .await?;
    let ltv = agents
        .financial
        .call_tool("calculate_customer_ltv", &ToolParams::new())
        .await?;

    let segment_summary = section(&segments, "segment_summary");
    let session_insights = section(&sessions, "insights");
    let key_metrics = summary
        .pointer("/executive_summary/key_metrics")
        .cloned()
        .unwrap_or_else(|| json!({}));
    let ltv_summary = section(&ltv, "ltv_summary");

    let total_revenue = key_metrics
        .get("total_revenue")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let segmented_users: u64 = segment_summary
        .as_object()
        .map(|counts| counts.values().filter_map(Value::as_u64).sum())
        .unwrap_or(0);
    let average_ltv = ltv_summary
        .get("average_ltv")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let device = session_insights
        .get("preferred_device")
        .and_then(Value::as_str)
        .unwrap_or("Mobile");

    let executive_summary = format!(
        "Business Performance Overview:\n\
         • Total Revenue: ${}\n\
         • Active User Segments: {segmented_users} users across engagement levels\n\
         • Average Customer LTV: ${average_ltv:.2}\n\
         • Key Growth Opportunity: {device} optimization",
        money(total_revenue),
    );

    Ok(json!({
        "comprehensive_business_analysis": {
            "analysis_period_days": days,
            "generated_at": Utc::now(),
        },
        "user_insights": {
            "segmentation": segment_summary,
            "session_patterns": session_insights,
        },
        "financial_insights": {
            "key_metrics": key_metrics,
            "ltv_summary": ltv_summary,
        },
        "strategic_recommendations": [
            {
                "area": "Customer Engagement",
                "recommendation": "Focus on converting medium-engagement users to high-engagement",
                "expected_impact": "15-25% increase in revenue",
            },
            {
                "area": "Product Strategy",
                "recommendation": "Optimize high-margin products for better visibility",
                "expected_impact": "10-15% improvement in profit margins",
            },
            {
                "area": "User Experience",
                "recommendation": "Improve mobile experience based on device usage patterns",
                "expected_impact": "5-10% increase in conversion rates",
            },
        ],
        "executive_summary": executive_summary,
    }))
}
