//! Agent registry and keyword routing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::{Agent, BehaviorAgent, Capability, FinancialAgent, ToolError, ToolParams, ToolSpec};
use crate::config::CostAssumptions;

/// One agent's outcome within a routed query.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub agent_id: &'static str,
    pub agent_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Result of an automatically routed query.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorResponse {
    pub query: String,
    /// Number of agents the query was routed to, whether or not they
    /// accepted it.
    pub agents_consulted: usize,
    /// Outcomes of the routed agents that accepted the query, in
    /// registration order.
    pub results: Vec<AgentResult>,
    pub processing_timestamp: DateTime<Utc>,
}

/// Result of a query sent to one named agent.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DirectResponse {
    Handled {
        query: String,
        handling_agent: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    Declined {
        query: String,
        error: String,
        suggestion: &'static str,
    },
}

/// A logged routed query.
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub query: String,
    pub agents_used: Vec<&'static str>,
    pub timestamp: DateTime<Utc>,
    pub results_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub total_agents: usize,
    pub coordination_method: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [Capability],
    pub available_tools: usize,
    pub tool_list: Vec<&'static str>,
}

/// Registered agents and what they offer.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilitiesReport {
    pub multi_agent_system: SystemInfo,
    pub agents: BTreeMap<&'static str, AgentInfo>,
}

/// A tool in the flat catalogue, named with its agent's prefix.
#[derive(Debug, Clone, Serialize)]
pub struct PrefixedTool {
    pub name: String,
    pub agent_id: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
}

/// Registry of agents that routes free-text queries by capability keywords.
///
/// Registration order is significant: routed agents run, and report, in the
/// order they were registered.
#[derive(Default)]
pub struct AgentCoordinator {
    agents: Vec<Arc<dyn Agent>>,
    history: RwLock<Vec<Interaction>>,
}

impl AgentCoordinator {
    /// An empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A coordinator with the behavior and financial agents registered,
    /// in that order.
    #[must_use]
    pub fn with_defaults(pool: PgPool, costs: CostAssumptions) -> Self {
        let mut coordinator = Self::new();
        coordinator.register(Arc::new(BehaviorAgent::new(pool.clone())));
        coordinator.register(Arc::new(FinancialAgent::new(pool, costs)));
        coordinator
    }

    /// Add an agent. An agent with the same ID is replaced in place.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        if let Some(slot) = self.agents.iter_mut().find(|a| a.id() == agent.id()) {
            *slot = agent;
        } else {
            self.agents.push(agent);
        }
    }

    #[must_use]
    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    /// Look up an agent by ID.
    #[must_use]
    pub fn agent(&self, id: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Agents claiming a capability the query mentions; every agent when
    /// the query mentions none.
    #[must_use]
    pub fn route_query(&self, query: &str) -> Vec<&Arc<dyn Agent>> {
        let needed = Capability::match_query(query);
        let routed: Vec<_> = self
            .agents
            .iter()
            .filter(|agent| agent.capabilities().iter().any(|c| needed.contains(c)))
            .collect();

        if routed.is_empty() {
            self.agents.iter().collect()
        } else {
            routed
        }
    }

    /// Run the query on every routed agent that accepts it and log the
    /// interaction. Agent failures are reported per agent.
    #[instrument(skip(self))]
    pub async fn process_query(&self, query: &str) -> CoordinatorResponse {
        let routed = self.route_query(query);
        let mut results = Vec::new();

        for agent in &routed {
            if !agent.can_handle(query) {
                continue;
            }
            let (result, error) = match agent.process_query(query).await {
                Ok(value) => (Some(value), None),
                Err(e) => {
                    warn!(agent = agent.id(), error = %e, "Agent query failed");
                    (None, Some(e.to_string()))
                }
            };
            results.push(AgentResult {
                agent_id: agent.id(),
                agent_name: agent.name(),
                result,
                error,
                timestamp: Utc::now(),
            });
        }

        let agents_used: Vec<&'static str> = routed.iter().map(|a| a.id()).collect();
        info!(
            agents = ?agents_used,
            results = results.len(),
            "Query processed"
        );
        self.history.write().await.push(Interaction {
            query: query.to_string(),
            agents_used,
            timestamp: Utc::now(),
            results_count: results.len(),
        });

        CoordinatorResponse {
            query: query.to_string(),
            agents_consulted: routed.len(),
            results,
            processing_timestamp: Utc::now(),
        }
    }

    /// Send the query straight to one agent. `None` if no agent has that ID.
    ///
    /// Direct queries bypass routing and are not logged in the history.
    #[instrument(skip(self))]
    pub async fn process_with(&self, agent_id: &str, query: &str) -> Option<DirectResponse> {
        let agent = self.agent(agent_id)?;

        if !agent.can_handle(query) {
            return Some(DirectResponse::Declined {
                query: query.to_string(),
                error: format!("Agent {} cannot handle this query", agent.name()),
                suggestion: "Try using auto routing or a different agent",
            });
        }

        let (result, error) = match agent.process_query(query).await {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Some(DirectResponse::Handled {
            query: query.to_string(),
            handling_agent: agent.name(),
            result,
            error,
            timestamp: Utc::now(),
        })
    }

    #[must_use]
    pub fn capabilities(&self) -> CapabilitiesReport {
        let agents = self
            .agents
            .iter()
            .map(|agent| {
                let tools = agent.tools();
                let info = AgentInfo {
                    name: agent.name(),
                    description: agent.description(),
                    capabilities: agent.capabilities(),
                    available_tools: tools.len(),
                    tool_list: tools.iter().map(|t| t.name).collect(),
                };
                (agent.id(), info)
            })
            .collect();

        CapabilitiesReport {
            multi_agent_system: SystemInfo {
                total_agents: self.agents.len(),
                coordination_method: "Automatic query routing based on keyword matching",
            },
            agents,
        }
    }

    /// Every agent's tools under their prefixed names.
    #[must_use]
    pub fn tool_catalogue(&self) -> Vec<PrefixedTool> {
        self.agents
            .iter()
            .flat_map(|agent| {
                agent.tools().iter().map(move |tool: &ToolSpec| PrefixedTool {
                    name: format!("{}{}", agent.tool_prefix(), tool.name),
                    agent_id: agent.id(),
                    description: tool.description,
                    parameters: tool.parameters,
                })
            })
            .collect()
    }

    /// Resolve a prefixed tool name to its agent and unprefixed name.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UnroutableTool` if no agent's prefix matches.
    pub fn resolve_tool<'a>(
        &self,
        prefixed: &'a str,
    ) -> Result<(&Arc<dyn Agent>, &'a str), ToolError> {
        self.agents
            .iter()
            .find_map(|agent| {
                prefixed
                    .strip_prefix(agent.tool_prefix())
                    .map(|name| (agent, name))
            })
            .ok_or_else(|| ToolError::UnroutableTool(prefixed.to_string()))
    }

    /// Run a tool by its prefixed name, returning the owning agent with the
    /// output so callers can format it.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UnroutableTool` for an unknown prefix, or whatever
    /// the agent's tool returns.
    pub async fn call_prefixed_tool(
        &self,
        prefixed: &str,
        params: &ToolParams,
    ) -> Result<(&Arc<dyn Agent>, Value), ToolError> {
        let (agent, name) = self.resolve_tool(prefixed)?;
        let value = agent.call_tool(name, params).await?;
        Ok((agent, value))
    }

    /// Snapshot of the routed-query log, oldest first.
    pub async fn history(&self) -> Vec<Interaction> {
        self.history.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    /// Agent that echoes the query, or fails when told to.
    struct Stub {
        id: &'static str,
        capabilities: &'static [Capability],
        keyword: &'static str,
    }

    const STUB_TOOLS: &[ToolSpec] = &[ToolSpec {
        name: "echo",
        description: "Echo parameters",
        parameters: &["value"],
    }];

    #[async_trait]
    impl Agent for Stub {
        fn id(&self) -> &'static str {
            self.id
        }
        fn name(&self) -> &'static str {
            self.id
        }
        fn description(&self) -> &'static str {
            "stub"
        }
        fn capabilities(&self) -> &'static [Capability] {
            self.capabilities
        }
        fn tool_prefix(&self) -> &'static str {
            if self.id == "a" { "a_" } else { "b_" }
        }
        fn tools(&self) -> &'static [ToolSpec] {
            STUB_TOOLS
        }
        fn can_handle(&self, query: &str) -> bool {
            query.contains(self.keyword)
        }
        async fn process_query(&self, query: &str) -> Result<Value, ToolError> {
            if query.contains("fail") {
                return Err(ToolError::InsufficientData("nothing to see"));
            }
            Ok(json!({ "echo": query }))
        }
        async fn call_tool(&self, name: &str, params: &ToolParams) -> Result<Value, ToolError> {
            match name {
                "echo" => Ok(params.clone().into_value()),
                other => Err(ToolError::UnknownTool {
                    tool: other.to_string(),
                    agent: self.id,
                }),
            }
        }
        fn summarize(&self, data: &Value) -> String {
            data.to_string()
        }
    }

    fn coordinator() -> AgentCoordinator {
        let mut coordinator = AgentCoordinator::new();
        coordinator.register(Arc::new(Stub {
            id: "a",
            capabilities: &[Capability::UserBehavior, Capability::SessionAnalysis],
            keyword: "user",
        }));
        coordinator.register(Arc::new(Stub {
            id: "b",
            capabilities: &[Capability::FinancialAnalysis],
            keyword: "revenue",
        }));
        coordinator
    }

    fn ids(agents: &[&Arc<dyn Agent>]) -> Vec<&'static str> {
        agents.iter().map(|a| a.id()).collect()
    }

    #[test]
    fn test_route_by_capability() {
        let coordinator = coordinator();
        assert_eq!(ids(&coordinator.route_query("device usage")), vec!["a"]);
        assert_eq!(ids(&coordinator.route_query("REVENUE per user")), vec!["a", "b"]);
    }

    #[test]
    fn test_route_falls_back_to_all_agents() {
        assert_eq!(ids(&coordinator().route_query("good morning")), vec!["a", "b"]);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut coordinator = coordinator();
        coordinator.register(Arc::new(Stub {
            id: "a",
            capabilities: &[Capability::CostAnalysis],
            keyword: "cost",
        }));
        assert_eq!(coordinator.agents().len(), 2);
        assert_eq!(coordinator.agents()[0].capabilities(), &[Capability::CostAnalysis]);
    }

    #[tokio::test]
    async fn test_process_query_skips_agents_that_decline() {
        let coordinator = coordinator();
        // Routed to "a" by the session keyword, but "a" only accepts "user".
        let response = coordinator.process_query("session length").await;
        assert_eq!(response.agents_consulted, 1);
        assert!(response.results.is_empty());

        let history = coordinator.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].agents_used, vec!["a"]);
        assert_eq!(history[0].results_count, 0);
    }

    #[tokio::test]
    async fn test_process_query_collects_errors_per_agent() {
        let coordinator = coordinator();
        let response = coordinator.process_query("user revenue fail").await;
        assert_eq!(response.agents_consulted, 2);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].agent_id, "a");
        assert_eq!(response.results[0].error.as_deref(), Some("nothing to see"));
        assert!(response.results[1].result.is_none());
    }

    #[tokio::test]
    async fn test_process_with_named_agent() {
        let coordinator = coordinator();
        assert!(coordinator.process_with("zzz", "user").await.is_none());

        let declined = coordinator.process_with("b", "user stats").await;
        let json = serde_json::to_value(declined).expect("serializable");
        assert_eq!(json["error"], "Agent b cannot handle this query");
        assert_eq!(json["suggestion"], "Try using auto routing or a different agent");

        let handled = coordinator.process_with("a", "user stats").await;
        let json = serde_json::to_value(handled).expect("serializable");
        assert_eq!(json["handling_agent"], "a");
        assert_eq!(json["result"]["echo"], "user stats");
        assert!(coordinator.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_prefixed_tools() {
        let coordinator = coordinator();
        let names: Vec<String> = coordinator
            .tool_catalogue()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a_echo", "b_echo"]);

        let (agent, value) = coordinator
            .call_prefixed_tool("b_echo", &ToolParams::new().with("value", 3))
            .await
            .expect("routable");
        assert_eq!(agent.id(), "b");
        assert_eq!(value, json!({"value": 3}));

        let Err(err) = coordinator
            .call_prefixed_tool("c_echo", &ToolParams::new())
            .await
        else {
            panic!("c_ is not a registered prefix");
        };
        assert!(matches!(err, ToolError::UnroutableTool(_)));
    }

    #[test]
    fn test_capabilities_report() {
        let report = coordinator().capabilities();
        assert_eq!(report.multi_agent_system.total_agents, 2);
        assert_eq!(report.agents["a"].tool_list, vec!["echo"]);
        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["agents"]["b"]["capabilities"][0], "financial_analysis");
    }
}
