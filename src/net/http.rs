use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::Registry;
use crate::error::{AppResult, DomainError, InfraError};
use crate::models::item::Item;
use crate::models::types::{AccountId, ItemId};
use crate::net::response::{ApiError, ApiResponse};

const AVAILABLE_ROUTES: &[&str] = &["/", "/health", "/api/items", "/api/accounts"];

#[derive(Clone)]
struct HttpAppCtx {
    registry: Arc<Registry>,
}

/// Run the HTTP server until `shutdown` resolves.
pub async fn serve<F>(
    addr: std::net::SocketAddr,
    registry: Arc<Registry>,
    shutdown: F,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(registry);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(InfraError::from)?;
    tracing::info!(%addr, "OpenRPG http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(InfraError::from)?;
    Ok(())
}

/// The complete application: API routes (mounted under `/api` and at the
/// root), health and index endpoints, and the middleware stack.
pub fn router(registry: Arc<Registry>) -> Router {
    let timeout = Duration::from_millis(registry.config.request_timeout_ms);
    let cors = cors_layer(&registry.config.cors_origin);

    let api = Router::new()
        .route("/items", get(list_items))
        .route("/items/{id}", get(get_item))
        .route("/accounts", post(create_account));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api.clone())
        .merge(api)
        .fallback(route_not_found)
        .with_state(HttpAppCtx { registry })
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            tracing::warn!(
                %origin,
                error = %e,
                "invalid CORS origin, cross-origin requests will be refused"
            );
            layer
        }
    }
}

async fn list_items(State(ctx): State<HttpAppCtx>) -> Result<ApiResponse<Vec<Item>>, ApiError> {
    let items = ctx
        .registry
        .services
        .items
        .list_all()
        .await
        .map_err(|e| ApiError::from_domain(e, "Could not load items"))?;

    let count = items.len();
    Ok(ApiResponse::ok(items, "Items loaded successfully").with_count(count))
}

fn item_not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::not_found("Item not found", format!("Item with ID {id} does not exist"))
}

/// Only meaningful once parsing failed: digits that are not all zeros overflowed
/// the id range. Such an id is a positive integer no item can have.
fn beyond_id_range(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) && raw.bytes().any(|b| b != b'0')
}

async fn get_item(
    State(ctx): State<HttpAppCtx>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Item>, ApiError> {
    let id: ItemId = match raw_id.parse() {
        Ok(id) => id,
        Err(_) if beyond_id_range(&raw_id) => return Err(item_not_found(&raw_id)),
        Err(_) => {
            return Err(ApiError::bad_request("Invalid ID", "The ID must be a positive number"));
        }
    };

    let item = ctx
        .registry
        .services
        .items
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Could not load the item"))?;

    match item {
        Some(item) => Ok(ApiResponse::ok(item, "Item found successfully")),
        None => Err(item_not_found(id)),
    }
}

#[derive(Debug, Deserialize)]
struct CreateAccountRequest {
    username: Option<String>,
    #[serde(alias = "passwrod")]
    password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountCreated {
    account_id: AccountId,
    username: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

async fn create_account(
    State(ctx): State<HttpAppCtx>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<AccountCreated>), ApiError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected account payload");
        ApiError::bad_request("Invalid request body", rejection.body_text())
    })?;

    let (Some(username), Some(password)) = (
        req.username.filter(|s| !s.is_empty()),
        req.password.filter(|s| !s.is_empty()),
    ) else {
        let mut err =
            ApiError::bad_request("Incomplete data", "Username and password are required");
        err.required = Some(vec!["username", "password"]);
        return Err(err);
    };

    let account = match ctx.registry.services.accounts.register(&username, &password).await {
        Ok(account) => account,
        Err(DomainError::Conflict(_)) => {
            return Err(ApiError::new(
                StatusCode::CONFLICT,
                "Username already exists",
                "This username is already in use",
            ));
        }
        Err(e) => return Err(ApiError::from_domain(e, "Could not process the registration")),
    };

    let created = AccountCreated {
        account_id: account.id,
        username: account.username,
        created_at: account.created_at,
    };
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "Account created successfully")))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "OpenRPG core server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": "OpenRPG Core Server",
        "description": "Open source role-playing game server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "items": "/api/items",
            "accounts": "/api/accounts",
        },
    }))
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    let mut err = ApiError::not_found(
        "Route not found",
        format!("Route {method} {uri} does not exist"),
    );
    err.available_routes = Some(AVAILABLE_ROUTES.to_vec());
    err
}
