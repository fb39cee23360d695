//! Plain-text rendering of coordinator output.

use std::fmt::Write;

use super::coordinator::{CoordinatorResponse, DirectResponse};
use super::{AgentCoordinator, pretty};

/// Multi-agent report: the query, how many agents were consulted, then each
/// agent's templated summary or error.
#[must_use]
pub fn render(coordinator: &AgentCoordinator, response: &CoordinatorResponse) -> String {
    let mut out = String::from("🤖 Multi-Agent Analysis Results\n");
    let _ = writeln!(out, "Query: {}", response.query);
    let _ = writeln!(out, "Agents Consulted: {}\n", response.agents_consulted);

    for entry in &response.results {
        let _ = writeln!(out, "🔍 {} Analysis:", entry.agent_name);
        if let Some(result) = &entry.result {
            let summary = coordinator
                .agent(entry.agent_id)
                .map_or_else(|| pretty(result), |agent| agent.summarize(result));
            let _ = writeln!(out, "{summary}\n");
        } else if let Some(error) = &entry.error {
            let _ = writeln!(out, "❌ Error: {error}\n");
        }
    }
    out
}

/// A direct single-agent response, as pretty JSON.
#[must_use]
pub fn render_direct(response: &DirectResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::agents::coordinator::AgentResult;

    fn response(results: Vec<AgentResult>) -> CoordinatorResponse {
        CoordinatorResponse {
            query: "how are users doing".to_string(),
            agents_consulted: 2,
            results,
            processing_timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_header_without_results() {
        let text = render(&AgentCoordinator::new(), &response(Vec::new()));
        assert_eq!(
            text,
            "🤖 Multi-Agent Analysis Results\nQuery: how are users doing\nAgents Consulted: 2\n\n"
        );
    }

    #[test]
    fn test_unregistered_agent_falls_back_to_json() {
        let text = render(
            &AgentCoordinator::new(),
            &response(vec![
                AgentResult {
                    agent_id: "ghost",
                    agent_name: "Ghost",
                    result: Some(json!({"a": 1})),
                    error: None,
                    timestamp: Utc::now(),
                },
                AgentResult {
                    agent_id: "other",
                    agent_name: "Other",
                    result: None,
                    error: Some("User 9 not found".to_string()),
                    timestamp: Utc::now(),
                },
            ]),
        );
        assert!(text.contains("🔍 Ghost Analysis:\n{\n  \"a\": 1\n}\n\n"));
        assert!(text.ends_with("🔍 Other Analysis:\n❌ Error: User 9 not found\n\n"));
    }

    #[test]
    fn test_direct_is_pretty_json() {
        let text = render_direct(&DirectResponse::Declined {
            query: "q".to_string(),
            error: "Agent X cannot handle this query".to_string(),
            suggestion: "Try using auto routing or a different agent",
        });
        assert!(text.starts_with("{\n  \"query\": \"q\""));
    }
}
