// Tab Split - Persistence Server
// REST API for server-side lists: create / fetch / version-checked update

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use tab_split::{create_list, get_list, setup_database, update_list, AppState, StoreError};

/// Shared server state
#[derive(Clone)]
struct ServerState {
    db: Arc<Mutex<Connection>>,
}

/// Error payload. `code` is the field clients branch on.
#[derive(Serialize)]
struct ApiError {
    code: &'static str,
    message: String,

    #[serde(skip_serializing_if = "Option::is_none", rename = "expectedVersion")]
    expected_version: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "actualVersion")]
    actual_version: Option<i64>,
}

impl ApiError {
    fn plain(code: &'static str, message: String) -> Self {
        Self {
            code,
            message,
            expected_version: None,
            actual_version: None,
        }
    }
}

/// Map store failures onto status codes + client-visible error codes.
fn store_error_response(err: StoreError) -> (StatusCode, Json<ApiError>) {
    match err {
        StoreError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiError::plain("NOT_FOUND", "No list with that id".to_string())),
        ),
        StoreError::VersionConflict { expected, actual } => (
            StatusCode::CONFLICT,
            Json(ApiError {
                code: "VERSION_CONFLICT",
                message: "Someone else edited this list - reload before saving".to_string(),
                expected_version: Some(expected),
                actual_version: Some(actual),
            }),
        ),
        StoreError::Validation(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::plain("INVALID_STATE", msg)),
        ),
        StoreError::Storage(e) => {
            eprintln!("Storage error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::plain("STORAGE", "Storage unavailable".to_string())),
            )
        }
    }
}

/// PUT /api/lists/:id request body
#[derive(Deserialize)]
struct UpdateRequest {
    data: AppState,

    #[serde(rename = "expectedVersion")]
    expected_version: i64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "version": tab_split::VERSION }))
}

/// POST /api/lists - Persist a new list, version starts at 1
async fn create_handler(
    State(state): State<ServerState>,
    Json(body): Json<AppState>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match create_list(&conn, &body) {
        Ok(list) => (StatusCode::CREATED, Json(list)).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// GET /api/lists/:id - Fetch a list (id is case-insensitive)
async fn fetch_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_list(&conn, &id) {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// PUT /api/lists/:id - Version-checked update; 409 on conflict
async fn update_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRequest>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match update_list(&conn, &id, &body.data, body.expected_version) {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Tab Split - Persistence Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("TABSPLIT_DB").unwrap_or_else(|_| "tabsplit.db".to_string());
    let conn = Connection::open(&db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to initialize database");
    println!("✓ Database ready: {}", db_path);

    let state = ServerState {
        db: Arc::new(Mutex::new(conn)),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/lists", post(create_handler))
        .route("/lists/:id", get(fetch_handler).put(update_handler))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   POST /api/lists        create");
    println!("   GET  /api/lists/:id    fetch");
    println!("   PUT  /api/lists/:id    update (expectedVersion required)");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
