//! Coordinator behavior that needs no database: routing, catalogue lookup
//! and parameter coercion.

use serde_json::json;

use storelens_api::agents::routing::{Complexity, analyze_routing};
use storelens_api::agents::{BehaviorAgent, FinancialAgent, ToolError, ToolParams};
use storelens_core::DeviceType;
use storelens_integration_tests::test_state;

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_revenue_query_routes_to_financial_only() {
    let state = test_state();
    let routed: Vec<&str> = state
        .coordinator()
        .route_query("Show me the revenue report")
        .iter()
        .map(|a| a.id())
        .collect();
    assert_eq!(routed, [FinancialAgent::ID]);
}

#[tokio::test]
async fn test_device_query_routes_to_behavior() {
    let state = test_state();
    let routed: Vec<&str> = state
        .coordinator()
        .route_query("Which device do people use?")
        .iter()
        .map(|a| a.id())
        .collect();
    assert_eq!(routed, [BehaviorAgent::ID]);
}

#[tokio::test]
async fn test_unmatched_query_routes_to_every_agent() {
    let state = test_state();
    assert_eq!(state.coordinator().route_query("hello").len(), 2);
}

#[test]
fn test_routing_analysis_without_keywords() {
    let analysis = analyze_routing("hello");
    assert_eq!(analysis.complexity, Complexity::Low);
    assert_eq!(analysis.suggested_agents, ["auto_routing"]);
    assert!(analysis.detected_keywords.is_empty());
}

#[test]
fn test_routing_analysis_collaboration() {
    let analysis = analyze_routing("comprehensive business dashboard");
    assert_eq!(analysis.complexity, Complexity::Medium);
    assert_eq!(analysis.suggested_agents, ["multi_agent_collaboration"]);
}

#[tokio::test]
async fn test_unhandled_auto_query_is_logged() {
    let state = test_state();
    let coordinator = state.coordinator();

    let response = coordinator.process_query("hello").await;
    assert_eq!(response.agents_consulted, 2);
    assert!(response.results.is_empty());

    let history = coordinator.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query, "hello");
    assert_eq!(history[0].results_count, 0);
    assert_eq!(
        history[0].agents_used,
        [BehaviorAgent::ID, FinancialAgent::ID]
    );
}

#[tokio::test]
async fn test_direct_queries_are_not_logged() {
    let state = test_state();
    let coordinator = state.coordinator();

    assert!(coordinator.process_with("nobody", "revenue").await.is_none());
    assert!(
        coordinator
            .process_with(BehaviorAgent::ID, "hello")
            .await
            .is_some()
    );
    assert!(coordinator.history().await.is_empty());
}

// =============================================================================
// Tool catalogue
// =============================================================================

#[tokio::test]
async fn test_resolve_tool_strips_prefix() {
    let state = test_state();
    let (agent, name) = state
        .coordinator()
        .resolve_tool("financial_generate_sales_forecast")
        .expect("known prefix");
    assert_eq!(agent.id(), FinancialAgent::ID);
    assert_eq!(name, "generate_sales_forecast");
}

#[tokio::test]
async fn test_resolve_tool_unknown_prefix() {
    let state = test_state();
    let err = state
        .coordinator()
        .resolve_tool("inventory_levels")
        .err()
        .expect("unroutable");
    assert!(matches!(err, ToolError::UnroutableTool(ref t) if t == "inventory_levels"));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_unknown_tool_under_known_prefix() {
    let state = test_state();
    let err = state
        .coordinator()
        .call_prefixed_tool("behavior_predict_churn", &ToolParams::new())
        .await
        .err()
        .expect("no such tool");
    assert_eq!(
        err.to_string(),
        "Tool predict_churn not available for agent User Behavior Analyst"
    );
}

#[tokio::test]
async fn test_negative_window_rejected_before_querying() {
    let state = test_state();
    let params = ToolParams::new().with("time_period", -7);
    let err = state
        .coordinator()
        .call_prefixed_tool("behavior_analyze_session_patterns", &params)
        .await
        .err()
        .expect("negative window");
    assert!(matches!(err, ToolError::InvalidParameter { .. }));
}

// =============================================================================
// Parameter coercion
// =============================================================================

#[test]
fn test_coerce_form_style_parameters() {
    let params = ToolParams::coerce(json!({
        "user_id": "12",
        "threshold": "0.5",
        "include_details": "FALSE",
        "device_filter": "mobile",
        "session_id": null,
    }))
    .expect("object");

    assert_eq!(params.opt_id("user_id").ok(), Some(Some(12)));
    assert_eq!(params.get("threshold"), Some(&json!(0.5)));
    assert_eq!(params.bool_or("include_details", true).ok(), Some(false));
    assert_eq!(
        params.opt_parse::<DeviceType>("device_filter").ok(),
        Some(Some(DeviceType::Mobile))
    );
    assert_eq!(params.opt_id("session_id").ok(), Some(None));
}

#[test]
fn test_zero_id_counts_as_absent() {
    let params = ToolParams::coerce(json!({"user_id": "0"})).expect("object");
    assert_eq!(params.opt_id("user_id").ok(), Some(None));
}

#[test]
fn test_unknown_device_filter_is_rejected() {
    let params = ToolParams::coerce(json!({"device_filter": "watch"})).expect("object");
    assert!(params.opt_parse::<DeviceType>("device_filter").is_err());
}
