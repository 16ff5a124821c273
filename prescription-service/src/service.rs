use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use prescription_pipeline::{
    CustomSearchApi, GeminiClient, HttpPageFetcher, InMemoryArticleStore, MedicalOntology,
    Orchestrator, PipelineConfig, QueryExpander, SearchEngine, SourceEvaluator,
};

use crate::config::ServiceConfig;
use crate::models::GeneratePrescriptionRequest;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "status": "error", "message": message })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "status": "error",
            "message": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

pub fn create_app(config: &ServiceConfig) -> Router {
    let app_state = AppState {
        orchestrator: Arc::new(build_orchestrator(config)),
    };
    build_router(app_state)
}

/// Wire the pipeline components from the service configuration.
pub fn build_orchestrator(config: &ServiceConfig) -> Orchestrator {
    let ontology = MedicalOntology::load(&config.ontology_path);
    let expander = QueryExpander::new(ontology);
    let evaluator = SourceEvaluator::new(config.trusted_domains.iter().cloned());
    let search_api = Arc::new(CustomSearchApi::new(
        &config.search_endpoint,
        &config.search_api_key,
        &config.search_engine_id,
    ));
    let fetcher = Arc::new(HttpPageFetcher::new());
    let engine = SearchEngine::new(
        search_api,
        evaluator,
        fetcher,
        config.crawl_delay,
        config.max_search_results,
    );
    let llm = Arc::new(GeminiClient::new(&config.gemini_api_key));

    Orchestrator::new(
        expander,
        engine,
        llm,
        PipelineConfig {
            results_per_query: config.results_per_query,
            ..PipelineConfig::default()
        },
    )
    .with_article_store(Arc::new(InMemoryArticleStore::new()))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/prescription/generate", post(generate_prescription))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Prescription Research Service",
        "version": "1.0.0",
        "description": "Retrieval-backed, AI-assisted prescription drafts for human review",
        "endpoints": {
            "POST /api/prescription/generate": "Process a patient case into a prescription draft",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn generate_prescription(
    State(state): State<AppState>,
    Json(request): Json<GeneratePrescriptionRequest>,
) -> ApiResult<Value> {
    info!(
        "Processing patient case with {} current symptoms",
        request.current_symptoms.len()
    );

    validate_report_text(&request.medical_report_text)?;

    match state
        .orchestrator
        .process_case(&request.medical_report_text, &request.current_symptoms)
        .await
    {
        Ok(outcome) => Ok(Json(json!({
            "status": "success",
            "case_id": outcome.case_id,
            "result": outcome.prescription,
            "sources": outcome.sources,
            "diagnostics": outcome.diagnostics
        }))),
        Err(e) => {
            error!("Failed to process patient case: {}", e);
            Err(internal_error(
                "Failed to process patient case",
                &e.to_string(),
            ))
        }
    }
}

fn validate_report_text(report_text: &str) -> Result<(), ApiError> {
    if report_text.trim().is_empty() {
        return Err(bad_request_error("Medical report text is required"));
    }
    Ok(())
}
