//! Explain how a query would be routed, without running anything.

use serde::Serialize;

use super::{BehaviorAgent, FinancialAgent};

const BEHAVIOR_KEYWORDS: &[&str] = &[
    "user",
    "customer",
    "behavior",
    "session",
    "engagement",
    "activity",
    "interaction",
    "browsing",
    "journey",
    "retention",
    "device",
    "usage",
];

const FINANCIAL_KEYWORDS: &[&str] = &[
    "revenue",
    "profit",
    "financial",
    "earnings",
    "income",
    "sales",
    "money",
    "cost",
    "expense",
    "margin",
    "roi",
    "ltv",
    "forecast",
];

const COLLABORATION_KEYWORDS: &[&str] = &[
    "comprehensive",
    "overall",
    "business",
    "correlation",
    "impact",
    "analysis",
    "summary",
    "report",
    "dashboard",
    "insights",
];

/// Pseudo-agent suggested for queries that span both domains.
pub const MULTI_AGENT: &str = "multi_agent_collaboration";

/// Suggestion when no keyword list matches.
pub const AUTO_ROUTING: &str = "auto_routing";

/// How many agents a query would involve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Keywords found in a query and the agents they point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingAnalysis {
    pub query: String,
    /// `"<group>:<keyword>"` entries, e.g. `behavior:user`.
    pub detected_keywords: Vec<String>,
    pub suggested_agents: Vec<&'static str>,
    pub complexity: Complexity,
}

/// Classify `query` against the behavior, financial and collaboration
/// keyword lists.
#[must_use]
pub fn analyze_routing(query: &str) -> RoutingAnalysis {
    let lowered = query.to_lowercase();
    let groups: [(&str, &[&str], &'static str); 3] = [
        ("behavior", BEHAVIOR_KEYWORDS, BehaviorAgent::ID),
        ("financial", FINANCIAL_KEYWORDS, FinancialAgent::ID),
        ("collaboration", COLLABORATION_KEYWORDS, MULTI_AGENT),
    ];

    let mut detected_keywords = Vec::new();
    let mut suggested_agents = Vec::new();
    for (group, keywords, agent) in groups {
        let hits: Vec<String> = keywords
            .iter()
            .filter(|k| lowered.contains(*k))
            .map(|k| format!("{group}:{k}"))
            .collect();
        if !hits.is_empty() {
            suggested_agents.push(agent);
            detected_keywords.extend(hits);
        }
    }

    let complexity = match suggested_agents.len() {
        0 => Complexity::Low,
        1 => Complexity::Medium,
        _ => Complexity::High,
    };
    if suggested_agents.is_empty() {
        suggested_agents.push(AUTO_ROUTING);
    }

    RoutingAnalysis {
        query: query.to_string(),
        detected_keywords,
        suggested_agents,
        complexity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_domain_is_medium() {
        let analysis = analyze_routing("Which device do customers use?");
        assert_eq!(analysis.suggested_agents, vec![BehaviorAgent::ID]);
        assert_eq!(
            analysis.detected_keywords,
            vec!["behavior:customer", "behavior:device"]
        );
        assert_eq!(analysis.complexity, Complexity::Medium);
    }

    #[test]
    fn test_cross_domain_is_high() {
        let analysis = analyze_routing("Overall revenue impact of user engagement");
        assert_eq!(
            analysis.suggested_agents,
            vec![BehaviorAgent::ID, FinancialAgent::ID, MULTI_AGENT]
        );
        assert_eq!(analysis.complexity, Complexity::High);
    }

    #[test]
    fn test_no_keywords_suggests_auto_routing() {
        let analysis = analyze_routing("hello");
        assert!(analysis.detected_keywords.is_empty());
        assert_eq!(analysis.suggested_agents, vec![AUTO_ROUTING]);
        assert_eq!(analysis.complexity, Complexity::Low);
    }

    #[test]
    fn test_serializes_lowercase_complexity() {
        let json = serde_json::to_value(analyze_routing("ltv")).expect("serializable");
        assert_eq!(json["complexity"], "medium");
        assert_eq!(json["detected_keywords"][0], "financial:ltv");
    }
}
