use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use extract::{DocumentShape, Extraction};
use graph::{
    GraphPresenter, GraphStats, GraphView, LabelPolicy, MissingTargets, PresenterOptions,
    graph_stats, to_mermaid,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use store::{SaveEntry, SaveStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};

pub struct AppState {
    pub store: SaveStore,
    pub presenter: PresenterOptions,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: SaveStore, presenter: PresenterOptions) -> Self {
        Self {
            store,
            presenter,
            metrics: Metrics::new(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/saves", get(list_saves))
        .route("/api/saves/*path", get(get_save))
        .route("/api/folders", get(list_folders))
        .route("/api/folders/:folder/latest", get(latest_save))
        .route("/api/graph/*path", get(get_graph))
        .route("/api/situations/*path", get(get_situations))
        .route("/api/mermaid/*path", get(get_mermaid))
        .route("/api/stats", get(get_stats))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn track_requests(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    state.metrics.record_request(!response.status().is_server_error());
    response
}

/// Run blocking file-system work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

fn parse_param<T: FromStr<Err = String>>(value: Option<&str>) -> Result<Option<T>, ApiError> {
    value.map(|v| v.parse::<T>().map_err(ApiError::BadRequest)).transpose()
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    saves_root: PathBuf,
    root_exists: bool,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        saves_root: state.store.root().to_path_buf(),
        root_exists: state.store.root_exists(),
    })
}

#[derive(Deserialize)]
struct ListQuery {
    folder: Option<String>,
}

async fn list_saves(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SaveEntry>>, ApiError> {
    let timer = TimedOperation::start();
    let store = state.store.clone();
    let entries = blocking(move || {
        store
            .list_entries(query.folder.as_deref())
            .map_err(ApiError::listing)
    })
    .await?;

    state.metrics.record_listing(timer.elapsed());
    Ok(Json(entries))
}

async fn list_folders(State(state): State<Arc<AppState>>) -> Result<Json<Vec<SaveEntry>>, ApiError> {
    let timer = TimedOperation::start();
    let store = state.store.clone();
    let folders = blocking(move || store.list_folders().map_err(ApiError::listing)).await?;

    state.metrics.record_listing(timer.elapsed());
    Ok(Json(folders))
}

async fn latest_save(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Result<Json<SaveEntry>, ApiError> {
    let store = state.store.clone();
    let entry = blocking(move || store.latest_entry(&folder).map_err(ApiError::file)).await?;
    Ok(Json(entry))
}

async fn read_document(state: &AppState, path: String) -> Result<Value, ApiError> {
    let timer = TimedOperation::start();
    let store = state.store.clone();
    let doc = blocking(move || store.read_document(&path).map_err(ApiError::file)).await?;
    state.metrics.record_read(timer.elapsed());
    Ok(doc)
}

async fn get_save(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let doc = read_document(&state, path).await?;
    Ok(Json(doc))
}

#[derive(Deserialize)]
struct GraphQuery {
    shape: Option<String>,
    labels: Option<String>,
    missing: Option<String>,
}

impl GraphQuery {
    fn shape(&self) -> Result<Option<DocumentShape>, ApiError> {
        parse_param(self.shape.as_deref())
    }

    /// Server defaults with any per-request overrides applied.
    fn presenter_options(&self, defaults: PresenterOptions) -> Result<PresenterOptions, ApiError> {
        Ok(PresenterOptions {
            labels: parse_param::<LabelPolicy>(self.labels.as_deref())?.unwrap_or(defaults.labels),
            missing_targets: parse_param::<MissingTargets>(self.missing.as_deref())?
                .unwrap_or(defaults.missing_targets),
        })
    }
}

fn run_extract(doc: &Value, shape: Option<DocumentShape>) -> Extraction {
    match shape {
        Some(shape) => extract::extract_as(doc, shape),
        None => extract::extract(doc),
    }
}

#[derive(Serialize)]
struct GraphResponse {
    path: String,
    shape: Option<DocumentShape>,
    graph: GraphView,
    stats: GraphStats,
}

async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<GraphResponse>, ApiError> {
    let timer = TimedOperation::start();
    let shape = query.shape()?;
    let options = query.presenter_options(state.presenter)?;

    let doc = read_document(&state, path.clone()).await?;
    let extraction = run_extract(&doc, shape);
    let graph = GraphPresenter::new(options).present(&extraction);
    let stats = graph_stats(&graph);

    state.metrics.record_graph(timer.elapsed(), extraction.records.len());
    tracing::info!(
        path = %path,
        shape = ?extraction.shape,
        nodes = stats.nodes,
        edges = stats.edges,
        missing = stats.missing_targets,
        "Served situation graph"
    );

    Ok(Json(GraphResponse {
        path,
        shape: extraction.shape,
        graph,
        stats,
    }))
}

async fn get_situations(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<Extraction>, ApiError> {
    let shape = query.shape()?;
    let doc = read_document(&state, path).await?;
    Ok(Json(run_extract(&doc, shape)))
}

async fn get_mermaid(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(query): Query<GraphQuery>,
) -> Result<Response, ApiError> {
    let shape = query.shape()?;
    let options = query.presenter_options(state.presenter)?;

    let doc = read_document(&state, path).await?;
    let graph = GraphPresenter::new(options).present(&run_extract(&doc, shape));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        to_mermaid(&graph),
    )
        .into_response())
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
