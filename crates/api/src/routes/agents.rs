//! Natural-language agent endpoints.
//!
//! Agent output is JSON by default. `/agents/query` can instead return the
//! plain-text multi-agent report, and `/agents/tools/{tool}` the agent's
//! templated summary.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::agents::coordinator::{CapabilitiesReport, Interaction, PrefixedTool};
use crate::agents::routing::{RoutingAnalysis, analyze_routing};
use crate::agents::{ResponseFormat, ToolParams, collaboration, report};
use crate::error::AppError;
use crate::state::AppState;

/// Pseudo-agent name that selects keyword routing.
pub const AUTO: &str = "auto";

/// Output shape of `/agents/query`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryFormat {
    #[default]
    Json,
    Text,
}

fn auto() -> String {
    AUTO.to_string()
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "auto")]
    pub preferred_agent: String,
    #[serde(default)]
    pub format: QueryFormat,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolQuery {
    #[serde(default)]
    pub format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
pub struct CollaborateRequest {
    pub analysis_type: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub query: String,
}

/// Answer a free-text query, by keyword routing or with a named agent.
///
/// # Errors
///
/// Returns `AppError::Validation` for an empty query or an unknown
/// `preferred_agent`.
pub async fn query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body?;
    let text = request.query.trim();
    if text.is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }
    let coordinator = state.coordinator();

    if request.preferred_agent == AUTO {
        let response = coordinator.process_query(text).await;
        info!(
            agents_consulted = response.agents_consulted,
            results = response.results.len(),
            "Agent query answered"
        );
        return Ok(match request.format {
            QueryFormat::Json => Json(response).into_response(),
            QueryFormat::Text => report::render(coordinator, &response).into_response(),
        });
    }

    let response = coordinator
        .process_with(&request.preferred_agent, text)
        .await
        .ok_or_else(|| AppError::Validation(format!("Unknown agent: {}", request.preferred_agent)))?;
    Ok(match request.format {
        QueryFormat::Json => Json(response).into_response(),
        QueryFormat::Text => report::render_direct(&response).into_response(),
    })
}

/// Registered agents, their capabilities and tools.
pub async fn capabilities(State(state): State<AppState>) -> Json<CapabilitiesReport> {
    Json(state.coordinator().capabilities())
}

/// Every tool under its prefixed name.
pub async fn tools(State(state): State<AppState>) -> Json<Vec<PrefixedTool>> {
    Json(state.coordinator().tool_catalogue())
}

/// Parse a tool request body: empty means no parameters.
fn parse_params(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON parameters: {e}")))
}

/// Run one tool by prefixed name.
///
/// Tool failures caused by the request (unknown tool, missing or bad
/// parameters, nothing found) come back as `{ "error": ... }`.
///
/// # Errors
///
/// Returns `AppError::Validation` for malformed parameters, or
/// `AppError::Tool` when the tool fails on the server side.
pub async fn call_tool(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    query: Result<Query<ToolQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Response, AppError> {
    let Query(options) = query?;
    let params = ToolParams::coerce(parse_params(&body)?)?;

    match state.coordinator().call_prefixed_tool(&tool, &params).await {
        Ok((agent, value)) => Ok(match options.format {
            ResponseFormat::Summary => agent.summarize(&value).into_response(),
            ResponseFormat::Json | ResponseFormat::Raw => Json(value).into_response(),
        }),
        Err(e) if e.is_client_error() => {
            warn!(tool = %tool, error = %e, "Tool call rejected");
            Ok(Json(json!({ "error": e.to_string() })).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run a cross-agent analysis.
///
/// # Errors
///
/// Returns `AppError::Tool` for an unknown analysis type, bad parameters, or
/// a failing tool.
pub async fn collaborate(
    State(state): State<AppState>,
    body: Result<Json<CollaborateRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let params = ToolParams::coerce(request.parameters)?;
    let report =
        collaboration::collaborate(state.coordinator(), &request.analysis_type, &params).await?;
    Ok(Json(report))
}

/// Explain which agents a query would reach.
///
/// # Errors
///
/// Returns `AppError::Validation` if `query` is missing.
pub async fn route(
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Result<Json<RoutingAnalysis>, AppError> {
    let Query(query) = query?;
    Ok(Json(analyze_routing(&query.query)))
}

/// The routed-query log, oldest first.
pub async fn history(State(state): State<AppState>) -> Json<Vec<Interaction>> {
    Json(state.coordinator().history().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_empty_body() {
        assert_eq!(parse_params(b"").ok(), Some(Value::Null));
        assert_eq!(parse_params(b" \n").ok(), Some(Value::Null));
    }

    #[test]
    fn test_parse_params_rejects_garbage() {
        assert!(matches!(parse_params(b"{nope"), Err(AppError::Validation(_))));
        assert_eq!(parse_params(br#"{"user_id": "3"}"#).ok(), Some(json!({"user_id": "3"})));
    }

    #[test]
    fn test_query_request_defaults() {
        let request: QueryRequest =
            serde_json::from_value(json!({"query": "revenue"})).expect("valid body");
        assert_eq!(request.preferred_agent, AUTO);
        assert_eq!(request.format, QueryFormat::Json);
    }
}
