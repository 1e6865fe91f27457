// HTTP surface: thin dispatch over the operation façade

use axum::{
    extract::{Path, State},
    middleware as axum_middleware,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::TealiumClient;
use crate::error::ApiError;
use crate::middleware;
use crate::operations::UpdateLoadRule;

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub proxy_api_key: String,
    pub client: Arc<TealiumClient>,
}

/// Health check routes (no authentication required)
pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Tealium operation routes (require gateway authentication)
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/profiles/:profile/versions", get(list_versions_handler))
        .route(
            "/v1/profiles/:profile/versions/:version_id",
            get(get_version_handler),
        )
        .route(
            "/v1/profiles/:profile/load-rules",
            get(list_load_rules_handler),
        )
        .route(
            "/v1/profiles/:profile/load-rules/:load_rule_id",
            patch(update_load_rule_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "tealium-gateway",
        "version": VERSION,
        "status": "running",
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_versions_handler(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(profile = %profile, "Listing profile versions");
    let result = state.client.list_versions(&profile).await?;
    Ok(Json(result))
}

async fn get_version_handler(
    State(state): State<AppState>,
    Path((profile, version_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(profile = %profile, version_id = %version_id, "Fetching version detail");
    let result = state.client.get_version(&profile, &version_id).await?;
    Ok(Json(result))
}

async fn list_load_rules_handler(
    State(state): State<AppState>,
    Path(profile): Path<String>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(profile = %profile, "Listing load rules");
    let result = state.client.list_load_rules(&profile).await?;
    Ok(Json(result))
}

/// Body of a load-rule update request. Every field is required; axum's JSON
/// extractor rejects requests missing any of them before the handler runs.
#[derive(Debug, Deserialize)]
pub struct UpdateLoadRuleRequest {
    pub notes: String,
    pub name: String,
    pub state: String,
    pub conditions: Value,
}

async fn update_load_rule_handler(
    State(state): State<AppState>,
    Path((profile, load_rule_id)): Path<(String, String)>,
    Json(request): Json<UpdateLoadRuleRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_update_request(&request)?;

    tracing::info!(
        profile = %profile,
        load_rule_id = %load_rule_id,
        name = %request.name,
        state = %request.state,
        "Updating load rule"
    );

    let result = state
        .client
        .update_load_rule(
            &profile,
            UpdateLoadRule {
                notes: request.notes,
                load_rule_id,
                name: request.name,
                state: request.state,
                conditions: request.conditions,
            },
        )
        .await?;
    Ok(Json(result))
}

/// Required-field validation for the update surface; the façade itself
/// assumes already-validated parameters.
fn validate_update_request(request: &UpdateLoadRuleRequest) -> Result<(), ApiError> {
    if request.notes.trim().is_empty() {
        return Err(ApiError::ValidationError("notes must not be empty".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::ValidationError("name must not be empty".to_string()));
    }
    match request.state.as_str() {
        "active" | "inactive" => {}
        other => {
            return Err(ApiError::ValidationError(format!(
                "state must be \"active\" or \"inactive\", got \"{}\"",
                other
            )));
        }
    }
    if request.conditions.is_null() {
        return Err(ApiError::ValidationError(
            "conditions must not be null".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> UpdateLoadRuleRequest {
        UpdateLoadRuleRequest {
            notes: "fix regex".to_string(),
            name: "Homepage Rule".to_string(),
            state: "active".to_string(),
            conditions: json!([[{"operator": "defined", "value": "", "variable": "udo.page_name"}]]),
        }
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        assert!(validate_update_request(&valid_request()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_notes() {
        let mut request = valid_request();
        request.notes = "  ".to_string();
        assert!(matches!(
            validate_update_request(&request),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut request = valid_request();
        request.name = String::new();
        assert!(matches!(
            validate_update_request(&request),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_state() {
        let mut request = valid_request();
        request.state = "enabled".to_string();
        assert!(matches!(
            validate_update_request(&request),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_null_conditions() {
        let mut request = valid_request();
        request.conditions = Value::Null;
        assert!(matches!(
            validate_update_request(&request),
            Err(ApiError::ValidationError(_))
        ));
    }
}
