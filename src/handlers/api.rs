use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::models::{MenuItem, ServiceError, ValidationError, ValidationErrors};
use crate::observability::MenuOperationTracer;
use crate::services::MenuService;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

/// Shared application state for the menu endpoints
#[derive(Clone)]
pub struct ApiState {
    pub menu_service: Arc<MenuService>,
    pub tracer: MenuOperationTracer,
}

impl ApiState {
    /// Refresh the menu size gauge after a write
    pub async fn publish_menu_size(&self) {
        match self.menu_service.count_items().await {
            Ok(count) => self.tracer.record_menu_size(count),
            Err(err) => warn!(error = %err, "Failed to count menu items"),
        }
    }
}

/// Create API router with all menu endpoints. Unsupported methods on a known
/// path fall through to the same 404 as an unknown path.
pub fn create_api_router(menu_service: Arc<MenuService>, tracer: MenuOperationTracer) -> Router {
    let state = ApiState {
        menu_service,
        tracer,
    };

    Router::new()
        .route(
            "/api/menu",
            get(list_menu_items)
                .post(create_menu_item)
                .fallback(route_not_found),
        )
        .route(
            "/api/menu/:id",
            get(get_menu_item)
                .put(update_menu_item)
                .delete(delete_menu_item)
                .fallback(route_not_found),
        )
        .with_state(state)
}

// =============================================================================
// MENU ENDPOINTS
// =============================================================================

/// List the whole menu
#[instrument(name = "list_menu_items", skip(state))]
pub async fn list_menu_items(State(state): State<ApiState>) -> ApiResult<Json<Vec<MenuItem>>> {
    state
        .tracer
        .trace_menu_operation("list_items", state.menu_service.list_items())
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Get a single menu item
#[instrument(name = "get_menu_item", skip(state), fields(id = %id))]
pub async fn get_menu_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MenuItem>> {
    state
        .tracer
        .trace_menu_operation("get_item", state.menu_service.get_item(&id))
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Create a menu item from a validated payload
#[instrument(name = "create_menu_item", skip(state, payload))]
pub async fn create_menu_item(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MenuItem>)> {
    let result = state
        .tracer
        .trace_menu_operation("create_item", async {
            let Json(payload) = payload
                .map_err(|rejection| ValidationErrors::from(body_rejection(rejection)))?;
            state.menu_service.create_item(&payload).await
        })
        .await;

    match result {
        Ok(item) => {
            crate::info_with_trace!("Created menu item {}", item.id);
            state.publish_menu_size().await;
            Ok((StatusCode::CREATED, Json(item)))
        }
        Err(err) => Err(service_error_to_response(err)),
    }
}

/// Replace a menu item. A missing id wins over any problem with the body.
#[instrument(name = "update_menu_item", skip(state, payload), fields(id = %id))]
pub async fn update_menu_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MenuItem>> {
    let payload = payload
        .map(|Json(payload)| payload)
        .map_err(body_rejection);

    state
        .tracer
        .trace_menu_operation("update_item", state.menu_service.update_item(&id, payload))
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Delete a menu item and return it
#[instrument(name = "delete_menu_item", skip(state), fields(id = %id))]
pub async fn delete_menu_item(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MenuItem>> {
    let result = state
        .tracer
        .trace_menu_operation("delete_item", state.menu_service.delete_item(&id))
        .await;

    match result {
        Ok(item) => {
            state.publish_menu_size().await;
            Ok(Json(item))
        }
        Err(err) => Err(service_error_to_response(err)),
    }
}

// =============================================================================
// FALLBACKS
// =============================================================================

/// Any method and path combination without a handler
pub async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

/// Render a caught handler panic as the generic 500, keeping the cause in the logs
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };

    crate::error_with_trace!(panic = %message, "Handler panicked");
    internal_error().into_response()
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

/// Unreadable bodies are reported like any other field failure
fn body_rejection(rejection: JsonRejection) -> ValidationError {
    let reason = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Content-Type must be application/json",
        _ => "Request body must be valid JSON",
    };

    ValidationError::MalformedBody {
        reason: reason.to_string(),
    }
}

/// Convert service errors to HTTP responses
pub fn service_error_to_response(err: ServiceError) -> (StatusCode, Json<Value>) {
    match err {
        ServiceError::MenuItemNotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Menu item not found" })),
        ),
        ServiceError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": errors })),
        ),
        ServiceError::Repository { source } => {
            crate::error_with_trace!(error = %source, "Menu store failure");
            internal_error()
        }
    }
}
