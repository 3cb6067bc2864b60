// Axum API Server Module
//
// Purpose: HTTP front end for report generation. Each request runs a full
// generation on the blocking pool with its own fetch cache.

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::entity::Entity;
use crate::reports::{ReportBundle, ReportGenerator, ReportKind};
use crate::territory::{TerritoryCode, TerritoryError};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ReportGenerator>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::from_generator(ReportGenerator::new(settings))
    }

    pub fn from_generator(generator: ReportGenerator) -> Self {
        Self { generator: Arc::new(generator) }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_check))
        .route("/health", get(health_check))

        // Full bundle (JSON)
        .route("/gerar", get(generate_query))
        .route("/gerar/:ibge", get(generate_path))

        // Single report (plain text)
        .route("/relatorio", get(single_report))

        // Entity lookup only
        .route("/municipio", get(entity_query))
        .route("/municipio/:ibge", get(entity_path))

        // Middleware (applied in reverse order)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReportQuery {
    ibge: Option<String>,
    tipo: Option<String>,
}

impl ReportQuery {
    /// Non-empty `ibge` parameter.
    fn ibge(&self, example: &str) -> Result<&str, AppError> {
        self.ibge
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("Parâmetro 'ibge' obrigatório.{}", example)))
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Local::now().to_rfc3339(),
        "tipos_disponiveis": ReportKind::keys(),
    }))
}

async fn generate_query(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Value>, AppError> {
    let raw = query.ibge(" Ex: /gerar?ibge=2304400")?;
    bundle_response(&state, raw).await
}

async fn generate_path(
    State(state): State<AppState>,
    Path(ibge): Path<String>,
) -> Result<Json<Value>, AppError> {
    bundle_response(&state, &ibge).await
}

async fn bundle_response(state: &AppState, raw: &str) -> Result<Json<Value>, AppError> {
    let bundle = run_generation(state, raw).await?;

    let mut body = serde_json::to_value(&bundle)
        .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e)))?;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("gerado_em".to_string(), Value::String(chrono::Local::now().to_rfc3339()));
        obj.insert("total_relatorios".to_string(), Value::from(bundle.reports.len()));
    }
    Ok(Json(body))
}

async fn single_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let raw = query.ibge("")?;
    let tipo = query
        .tipo
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Parâmetro 'tipo' obrigatório.".to_string()))?;
    let kind = ReportKind::from_key(tipo).ok_or_else(|| {
        AppError::BadRequest(format!("Tipo inválido. Use: {}", ReportKind::keys().join(", ")))
    })?;

    let bundle = run_generation(&state, raw).await?;
    let text = bundle
        .report(kind)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::NotFound(format!("Relatório '{}' não gerado para IBGE {}", kind.key(), bundle.ibge))
        })?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text.to_string()).into_response())
}

async fn entity_query(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Value>, AppError> {
    let raw = query.ibge("")?;
    entity_response(&state, raw).await
}

async fn entity_path(
    State(state): State<AppState>,
    Path(ibge): Path<String>,
) -> Result<Json<Value>, AppError> {
    entity_response(&state, &ibge).await
}

async fn entity_response(state: &AppState, raw: &str) -> Result<Json<Value>, AppError> {
    let code = TerritoryCode::parse(raw)?;
    let generator = Arc::clone(&state.generator);
    let lookup = code.clone();

    let entity: Entity = tokio::task::spawn_blocking(move || generator.resolve_entity(&lookup))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;

    Ok(Json(serde_json::json!({
        "municipio": entity.name,
        "uf": entity.uf,
        "ibge": code.as_str(),
    })))
}

/// Validate the code, then generate on the blocking pool.
async fn run_generation(state: &AppState, raw: &str) -> Result<ReportBundle, AppError> {
    let code = TerritoryCode::parse(raw)?;
    tracing::info!("Generating reports for IBGE {}", code);

    let generator = Arc::clone(&state.generator);
    tokio::task::spawn_blocking(move || generator.generate(&code))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| {
            tracing::error!("Generation failed: {:#}", e);
            AppError::Internal(format!("Erro ao gerar: {}", e))
        })
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<TerritoryError> for AppError {
    fn from(e: TerritoryError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "erro": message
        }));

        (status, body).into_response()
    }
}
