//! Router-level tests: requests go through the full middleware stack.
//!
//! None of these paths reach Postgres except the readiness probe, which is
//! expected to report the database as unavailable.

use axum::http::StatusCode;
use serde_json::json;

use storelens_api::middleware::REQUEST_ID_HEADER;
use storelens_integration_tests::{body_bytes, body_json, get, post_json};

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root_banner() {
    let response = get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["docs"], "/docs");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_health() {
    let response = get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "healthy", "service": "E-commerce User Behavior API"})
    );
}

#[tokio::test]
async fn test_readiness_without_database() {
    let response = get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let response = get("/health").await;
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header");
    assert!(!header.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    assert_eq!(get("/nope").await.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_list_rejects_out_of_range_limit() {
    for uri in ["/users?limit=0", "/products?limit=1001", "/sessions?skip=-1"] {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert!(body_json(response).await["detail"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_non_numeric_query_parameter_is_422() {
    let response = get("/users?limit=lots").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_top_products_limit_is_capped() {
    let response = get("/analytics/top-products?limit=51").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["detail"],
        "limit must be between 1 and 50"
    );
}

#[tokio::test]
async fn test_unknown_top_products_metric_is_422() {
    let response = get("/analytics/top-products?metric=vibes").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Agent endpoints
// =============================================================================

#[tokio::test]
async fn test_route_explains_keywords() {
    let response = get("/agents/route?query=user%20revenue").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["complexity"], "high");
    assert_eq!(
        body["suggested_agents"],
        json!(["user_behavior_agent", "financial_reporting_agent"])
    );
    assert_eq!(
        body["detected_keywords"],
        json!(["behavior:user", "financial:revenue"])
    );
}

#[tokio::test]
async fn test_route_requires_query() {
    let response = get("/agents/route").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_tool_catalogue() {
    let response = get("/agents/tools").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let tools = body.as_array().expect("array of tools");
    assert_eq!(tools.len(), 18);
    assert!(
        tools
            .iter()
            .any(|t| t["name"] == "behavior_get_user_journey"
                && t["agent_id"] == "user_behavior_agent")
    );
    assert!(
        tools
            .iter()
            .any(|t| t["name"] == "financial_generate_revenue_report")
    );
}

#[tokio::test]
async fn test_capabilities() {
    let body = body_json(get("/agents/capabilities").await).await;
    assert_eq!(body["multi_agent_system"]["total_agents"], 2);
    assert_eq!(
        body["agents"]["financial_reporting_agent"]["available_tools"],
        10
    );
    assert_eq!(body["agents"]["user_behavior_agent"]["available_tools"], 8);
}

#[tokio::test]
async fn test_unknown_tool_reports_error_payload() {
    let response = post_json("/agents/tools/marketing_campaigns", &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Unknown tool: marketing_campaigns"})
    );
}

#[tokio::test]
async fn test_tool_missing_parameter_reports_error_payload() {
    let response = post_json("/agents/tools/behavior_get_user_journey", &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Either user_id or session_id is required"})
    );
}

#[tokio::test]
async fn test_forecast_horizon_over_a_year_is_refused() {
    let response = post_json(
        "/agents/tools/financial_generate_sales_forecast",
        &json!({"forecast_period": "70000000000000"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid parameter forecast_period: must be at most 365 days"})
    );
}

#[tokio::test]
async fn test_tool_rejects_non_object_parameters() {
    let response = post_json("/agents/tools/behavior_get_user_journey", &json!([1, 2])).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(
        body["detail"]
            .as_str()
            .is_some_and(|e| e.starts_with("Invalid parameter parameters"))
    );
}

#[tokio::test]
async fn test_query_with_unknown_agent_is_422() {
    let response = post_json(
        "/agents/query",
        &json!({"query": "revenue", "preferred_agent": "marketing_agent"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["detail"],
        "Unknown agent: marketing_agent"
    );
}

#[tokio::test]
async fn test_query_rejects_empty_text() {
    let response = post_json("/agents/query", &json!({"query": "   "})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_direct_query_declined_by_agent() {
    let response = post_json(
        "/agents/query",
        &json!({"query": "hello there", "preferred_agent": "financial_reporting_agent"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Agent Financial Analyst cannot handle this query"
    );
    assert_eq!(
        body["suggestion"],
        "Try using auto routing or a different agent"
    );
}

#[tokio::test]
async fn test_auto_query_without_keywords_as_text() {
    let response = post_json(
        "/agents/query",
        &json!({"query": "hello there", "format": "text"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = String::from_utf8(body_bytes(response).await).expect("utf-8 report");
    assert!(text.contains("Query: hello there"));
    assert!(text.contains("Agents Consulted: 2"));
}

#[tokio::test]
async fn test_collaborate_unknown_type_is_422() {
    let response = post_json(
        "/agents/collaborate",
        &json!({"analysis_type": "astrology"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["detail"],
        "Unknown collaboration analysis type: astrology"
    );
}

#[tokio::test]
async fn test_history_starts_empty() {
    let body = body_json(get("/agents/history").await).await;
    assert_eq!(body, json!([]));
}
