//! Error types for agent tools.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur when an agent runs a tool or a query.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The agent has no tool with this name.
    #[error("Tool {tool} not available for agent {agent}")]
    UnknownTool {
        /// Requested tool name.
        tool: String,
        /// Display name of the agent that was asked.
        agent: &'static str,
    },

    /// No registered agent owns this prefixed tool name.
    #[error("Unknown tool: {0}")]
    UnroutableTool(String),

    /// A required agent is not registered with the coordinator.
    #[error("Agent {0} is not registered")]
    AgentUnavailable(&'static str),

    /// The collaboration analysis type is not one of the known kinds.
    #[error("Unknown collaboration analysis type: {0}")]
    UnknownAnalysis(String),

    /// A required parameter was absent.
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// A parameter was present but unusable.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The entity named by a parameter does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// There is not enough data to produce the report.
    #[error("{0}")]
    InsufficientData(&'static str),

    /// Loading rows failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A report could not be converted to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether this error came from the caller's input rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::Serialization(_))
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_tool_payloads() {
        assert_eq!(
            ToolError::MissingParameter("user_id").to_string(),
            "user_id is required"
        );
        assert_eq!(
            ToolError::MissingParameter("Either user_id or session_id").to_string(),
            "Either user_id or session_id is required"
        );
        assert_eq!(
            ToolError::NotFound("User 7".to_string()).to_string(),
            "User 7 not found"
        );
        assert_eq!(
            ToolError::UnknownTool {
                tool: "bogus".to_string(),
                agent: "Financial Analyst",
            }
            .to_string(),
            "Tool bogus not available for agent Financial Analyst"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ToolError::NotFound("Session 1".to_string()).is_client_error());
        assert!(ToolError::InsufficientData("none").is_client_error());
        assert!(!ToolError::Repository(RepositoryError::NotFound).is_client_error());
    }
}
