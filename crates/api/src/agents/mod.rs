//! Keyword-routed analysis agents.
//!
//! An [`Agent`] bundles a set of named tools over the analytics schema under
//! a domain label. The [`AgentCoordinator`] matches a free-text query against
//! the [`Capability`] keyword lists and hands it to every agent that claims a
//! matching capability.
//!
//! ## Agents
//!
//! - [`BehaviorAgent`] (`user_behavior_agent`) - sessions, journeys,
//!   engagement, segmentation, retention, page and device behavior
//! - [`FinancialAgent`] (`financial_reporting_agent`) - revenue, profit,
//!   KPIs, payment methods, lifetime value, forecasts, cohorts, discounts
//!
//! Tools are also reachable directly by prefixed name (`behavior_*`,
//! `financial_*`) and combined by [`collaboration`].

pub mod behavior;
pub mod capability;
pub mod collaboration;
pub mod coordinator;
mod error;
pub mod financial;
mod params;
pub mod report;
pub mod routing;

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use behavior::BehaviorAgent;
pub use capability::Capability;
pub use coordinator::AgentCoordinator;
pub use error::ToolError;
pub use financial::FinancialAgent;
pub use params::ToolParams;

/// Catalogue entry for one agent tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    /// Unprefixed tool name.
    pub name: &'static str,
    /// What the tool reports.
    pub description: &'static str,
    /// Parameter names the tool understands.
    pub parameters: &'static [&'static str],
}

/// How agent output is rendered as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Human-readable templated summary.
    Summary,
    /// Compact JSON.
    Raw,
}

impl FromStr for ResponseFormat {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "summary" => Ok(Self::Summary),
            "raw" => Ok(Self::Raw),
            other => Err(ToolError::invalid(
                "format",
                format!("expected json, summary or raw, got {other}"),
            )),
        }
    }
}

/// A domain agent: a named bundle of analysis tools with keyword dispatch.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier, e.g. `user_behavior_agent`.
    fn id(&self) -> &'static str;

    /// Display name.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Capabilities used by the coordinator for routing.
    fn capabilities(&self) -> &'static [Capability];

    /// Prefix of this agent's tools in the flat tool catalogue.
    fn tool_prefix(&self) -> &'static str;

    /// Tool catalogue.
    fn tools(&self) -> &'static [ToolSpec];

    /// Whether the query mentions any of this agent's own keywords.
    fn can_handle(&self, query: &str) -> bool;

    /// Pick a tool from the query text and run it with default parameters.
    async fn process_query(&self, query: &str) -> Result<Value, ToolError>;

    /// Run a tool by unprefixed name.
    async fn call_tool(&self, name: &str, params: &ToolParams) -> Result<Value, ToolError>;

    /// Human-readable rendering of one of this agent's reports.
    fn summarize(&self, data: &Value) -> String;

    /// Render `data` in the requested format.
    fn format_response(&self, data: &Value, format: ResponseFormat) -> String {
        match format {
            ResponseFormat::Json => pretty(data),
            ResponseFormat::Summary => self.summarize(data),
            ResponseFormat::Raw => data.to_string(),
        }
    }
}

/// Pretty-printed JSON, falling back to the compact form.
#[must_use]
pub fn pretty(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

/// Format a number with two decimals and thousands separators.
#[must_use]
pub fn money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{cents}", group_thousands(whole))
}

/// Insert commas every three digits of an unsigned digit string.
#[must_use]
pub fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_money_groups_thousands() {
        assert_eq!(money(0.0), "0.00");
        assert_eq!(money(999.5), "999.50");
        assert_eq!(money(1_234_567.891), "1,234,567.89");
        assert_eq!(money(-1500.0), "-1,500.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("12"), "12");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234"), "1,234");
    }

    #[test]
    fn test_response_format_parsing() {
        assert_eq!("summary".parse::<ResponseFormat>().ok(), Some(ResponseFormat::Summary));
        assert!("yaml".parse::<ResponseFormat>().is_err());
        assert_eq!(ResponseFormat::default(), ResponseFormat::Json);
    }

    #[test]
    fn test_pretty_is_indented() {
        assert_eq!(pretty(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }
}
