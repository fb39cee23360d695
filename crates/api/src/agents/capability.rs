//! Capability vocabulary used to route queries to agents.

use std::fmt;

use serde::Serialize;

/// An area of analysis an agent can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    UserBehavior,
    FinancialAnalysis,
    ProductAnalytics,
    SessionAnalysis,
    PurchasePatterns,
    RevenueReporting,
    ProfitAnalysis,
    CostAnalysis,
}

impl Capability {
    pub const ALL: &'static [Self] = &[
        Self::UserBehavior,
        Self::FinancialAnalysis,
        Self::ProductAnalytics,
        Self::SessionAnalysis,
        Self::PurchasePatterns,
        Self::RevenueReporting,
        Self::ProfitAnalysis,
        Self::CostAnalysis,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserBehavior => "user_behavior",
            Self::FinancialAnalysis => "financial_analysis",
            Self::ProductAnalytics => "product_analytics",
            Self::SessionAnalysis => "session_analysis",
            Self::PurchasePatterns => "purchase_patterns",
            Self::RevenueReporting => "revenue_reporting",
            Self::ProfitAnalysis => "profit_analysis",
            Self::CostAnalysis => "cost_analysis",
        }
    }

    /// Lowercase substrings that signal this capability in a query.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::UserBehavior => &[
                "user",
                "customer",
                "behavior",
                "activity",
                "engagement",
                "session",
                "page view",
                "interaction",
                "browsing",
            ],
            Self::FinancialAnalysis => &[
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
                "financial report",
            ],
            Self::ProductAnalytics => &["product", "conversion", "performance", "analytics", "metrics"],
            Self::SessionAnalysis => &["session", "duration", "device", "browser", "time spent"],
            Self::PurchasePatterns => &["purchase", "buy", "order", "transaction", "payment"],
            Self::RevenueReporting => &[
                "revenue",
                "sales report",
                "income",
                "earnings",
                "financial performance",
            ],
            Self::ProfitAnalysis => &["profit", "margin", "profitability", "cost analysis", "roi"],
            Self::CostAnalysis => &[],
        }
    }

    /// Capabilities whose keywords occur in `query`, in declaration order.
    #[must_use]
    pub fn match_query(query: &str) -> Vec<Self> {
        let query = query.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .filter(|cap| cap.keywords().iter().any(|k| query.contains(k)))
            .collect()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether any of `keywords` occurs in `query` (case-insensitive).
#[must_use]
pub fn mentions_any(query: &str, keywords: &[&str]) -> bool {
    let query = query.to_lowercase();
    keywords.iter().any(|k| query.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query_is_case_insensitive_and_ordered() {
        let caps = Capability::match_query("Show REVENUE by Device");
        assert_eq!(
            caps,
            vec![
                Capability::FinancialAnalysis,
                Capability::SessionAnalysis,
                Capability::RevenueReporting,
            ]
        );
    }

    #[test]
    fn test_match_query_without_keywords() {
        assert!(Capability::match_query("hello there").is_empty());
    }

    #[test]
    fn test_cost_analysis_never_matches() {
        assert!(!Capability::match_query("cost analysis").contains(&Capability::CostAnalysis));
        assert!(Capability::match_query("cost analysis").contains(&Capability::ProfitAnalysis));
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_value(Capability::PurchasePatterns).expect("serializable");
        assert_eq!(json, "purchase_patterns");
        assert_eq!(Capability::UserBehavior.to_string(), "user_behavior");
    }
}
