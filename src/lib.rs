//! HTTP surface of the logo service: one POST route per callable function,
//! plus the directory of re-hosted images.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    routing::post,
    Json, Router,
};
use logo_functions::LogoFunctions;
use logo_types::wire::{
    Callable, CallableResult, GenerateLogoRequest, GenerateLogoResponse,
    GeneratePromptRequest, GeneratePromptResponse, ProjectRequest, ProjectResponse,
    ProjectsRequest, ProjectsResponse,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod config;


#[derive(Clone)]
pub struct AppState {
    functions: Arc<LogoFunctions>,
}

impl AppState {
    pub fn new(functions: LogoFunctions) -> Self {
        Self {
            functions: Arc::new(functions),
        }
    }
}

pub fn create_app(state: AppState, images_dir: &Path) -> Router {
    Router::new()
        .route("/generateLogo", post(generate_logo))
        .route("/generateLogoPrompt", post(generate_logo_prompt))
        .route("/getUserProjects", post(get_user_projects))
        .route("/getUserProjectById", post(get_user_project_by_id))
        .nest_service("/images", ServeDir::new(images_dir))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn generate_logo(
    State(state): State<AppState>,
    body: Result<Json<Callable<GenerateLogoRequest>>, JsonRejection>,
) -> Json<CallableResult<GenerateLogoResponse>> {
    let result = match body {
        Ok(Json(body)) => state.functions.generate_logo(body.data).await,
        Err(rejection) => GenerateLogoResponse::failed(invalid_request(rejection)),
    };
    Json(CallableResult { result })
}

async fn generate_logo_prompt(
    State(state): State<AppState>,
    body: Result<Json<Callable<GeneratePromptRequest>>, JsonRejection>,
) -> Json<CallableResult<GeneratePromptResponse>> {
    let result = match body {
        Ok(Json(body)) => state.functions.generate_logo_prompt(body.data).await,
        Err(rejection) => GeneratePromptResponse::failed(invalid_request(rejection)),
    };
    Json(CallableResult { result })
}

async fn get_user_projects(
    State(state): State<AppState>,
    body: Result<Json<Callable<ProjectsRequest>>, JsonRejection>,
) -> Json<CallableResult<ProjectsResponse>> {
    let result = match body {
        Ok(Json(body)) => state.functions.get_user_projects(body.data).await,
        Err(rejection) => ProjectsResponse::failed(invalid_request(rejection)),
    };
    Json(CallableResult { result })
}

async fn get_user_project_by_id(
    State(state): State<AppState>,
    body: Result<Json<Callable<ProjectRequest>>, JsonRejection>,
) -> Json<CallableResult<ProjectResponse>> {
    let result = match body {
        Ok(Json(body)) => state.functions.get_user_project_by_id(body.data).await,
        Err(rejection) => ProjectResponse::failed(invalid_request(rejection)),
    };
    Json(CallableResult { result })
}

// Malformed bodies are answered like any other failure, inside `result`.
fn invalid_request(rejection: JsonRejection) -> String {
    let reason = rejection.body_text();
    tracing::warn!("Rejected callable body: {}", reason);
    format!("Invalid request: {}", reason)
}
