// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalassa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Loopback HTTP server: static editor assets plus a small JSON API.
//!
//! The sync endpoints are stateless (the client sends the model it holds); the diagram and
//! version endpoints go through the [`Repository`].

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path as FsPath;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::format::mermaid::{
    generate_sequence_diagram, parse_sequence_diagram, sanitize_markup, suggest, Suggestion,
};
use crate::grid::{project_grid, GridView};
use crate::model::{DiagramId, GroupId, SequenceModel, VersionId};
use crate::ops::{apply_grid_ops, ApplyError, GridOp, GridOutcome};
use crate::store::{
    parse_id, Diagram, DiagramFilter, FolderBackend, KvBackend, NewDiagram, Repository,
    StoreError, User, Version,
};

pub type SharedBackend = Box<dyn KvBackend + Send>;

#[derive(Clone)]
pub struct AppState {
    repo: Arc<Mutex<Repository<SharedBackend>>>,
}

impl AppState {
    pub fn new(repo: Repository<SharedBackend>) -> Self {
        Self { repo: Arc::new(Mutex::new(repo)) }
    }

    pub fn with_backend(backend: impl KvBackend + Send + 'static) -> Self {
        let backend: SharedBackend = Box::new(backend);
        Self::new(Repository::new(backend))
    }

    fn repo(&self) -> MutexGuard<'_, Repository<SharedBackend>> {
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn author_or_current(&self, author: Option<String>) -> Result<String, StoreError> {
        match author.filter(|name| !name.trim().is_empty()) {
            Some(author) => Ok(author),
            None => Ok(self.repo().current_user()?.name),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(StoreError::LastVersion { .. } | StoreError::GroupCycle { .. }) => {
                StatusCode::CONFLICT
            }
            Self::Store(StoreError::InvalidId { .. } | StoreError::InvalidKey { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Apply(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("cannot bind 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ---- sync ----

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub text: String,
    pub model: SequenceModel,
    pub grid: GridView,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub model: SequenceModel,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GridRequest {
    pub model: SequenceModel,
    pub ops: Vec<GridOp>,
}

#[derive(Debug, Serialize)]
pub struct GridResponse {
    pub text: String,
    pub model: SequenceModel,
    pub grid: GridView,
    pub outcome: GridOutcome,
}

/// `POST /api/sync/parse`: sanitize and parse markup.
pub async fn sync_parse(Json(body): Json<ParseRequest>) -> Json<ModelResponse> {
    let text = sanitize_markup(&body.text).into_owned();
    let model = parse_sequence_diagram(&text);
    let grid = project_grid(&model);
    Json(ModelResponse { text, model, grid })
}

/// `POST /api/sync/generate`: canonical markup for a model.
pub async fn sync_generate(Json(body): Json<GenerateRequest>) -> Json<GenerateResponse> {
    Json(GenerateResponse { text: generate_sequence_diagram(&body.model) })
}

/// `POST /api/sync/grid`: apply grid edits to a model and regenerate markup.
pub async fn sync_grid(Json(body): Json<GridRequest>) -> Result<Json<GridResponse>, ApiError> {
    let mut model = body.model;
    let outcome = apply_grid_ops(&mut model, &body.ops)?;
    let text = generate_sequence_diagram(&model);
    let grid = project_grid(&model);
    Ok(Json(GridResponse { text, model, grid, outcome }))
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    /// Editor text up to the cursor.
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
}

/// `POST /api/sync/suggest`: completions for the text before the cursor.
pub async fn sync_suggest(Json(body): Json<SuggestRequest>) -> Json<SuggestResponse> {
    Json(SuggestResponse { suggestions: suggest(&body.prefix) })
}

// ---- diagrams ----

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// A group id, or `ungrouped`.
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiagramBody {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDetail {
    #[serde(flatten)]
    pub diagram: Diagram,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendVersionBody {
    pub code: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameVersionBody {
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveUserBody {
    pub name: String,
}

pub async fn list_diagrams(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Diagram>>, ApiError> {
    let filter = match query.group.as_deref() {
        None | Some("") => DiagramFilter::All,
        Some("ungrouped") => DiagramFilter::Ungrouped,
        Some(raw) => DiagramFilter::InGroup(parse_id("group id", raw)?),
    };
    Ok(Json(state.repo().list_diagrams(&filter)?))
}

pub async fn create_diagram(
    State(state): State<AppState>,
    Json(body): Json<CreateDiagramBody>,
) -> Result<(StatusCode, Json<Diagram>), ApiError> {
    let author = state.author_or_current(body.author)?;
    let diagram = state.repo().create_diagram(NewDiagram {
        title: body.title,
        code: body.code,
        author,
        group_id: body.group_id,
        thumbnail: body.thumbnail,
    })?;
    Ok((StatusCode::CREATED, Json(diagram)))
}

pub async fn get_diagram(
    State(state): State<AppState>,
    Path(id): Path<DiagramId>,
) -> Result<Json<DiagramDetail>, ApiError> {
    let repo = state.repo();
    let diagram = repo.get_diagram(&id)?;
    let code = sanitize_markup(&repo.get_version(&diagram.latest_version_id)?.code).into_owned();
    Ok(Json(DiagramDetail { diagram, code }))
}

pub async fn delete_diagram(
    State(state): State<AppState>,
    Path(id): Path<DiagramId>,
) -> Result<StatusCode, ApiError> {
    state.repo().delete_diagram(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<DiagramId>,
) -> Result<Json<Vec<Version>>, ApiError> {
    Ok(Json(state.repo().list_versions(&id)?))
}

pub async fn append_version(
    State(state): State<AppState>,
    Path(id): Path<DiagramId>,
    Json(body): Json<AppendVersionBody>,
) -> Result<(StatusCode, Json<Diagram>), ApiError> {
    let author = state.author_or_current(body.author)?;
    let diagram = state.repo().update_diagram(
        &id,
        &body.code,
        &author,
        body.note.as_deref().filter(|note| !note.trim().is_empty()),
        body.thumbnail,
    )?;
    Ok((StatusCode::CREATED, Json(diagram)))
}

pub async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<VersionId>,
) -> Result<Json<Version>, ApiError> {
    Ok(Json(state.repo().get_version(&id)?))
}

pub async fn rename_version(
    State(state): State<AppState>,
    Path(id): Path<VersionId>,
    Json(body): Json<RenameVersionBody>,
) -> Result<Json<Version>, ApiError> {
    Ok(Json(state.repo().rename_version(&id, &body.note)?))
}

pub async fn delete_version(
    State(state): State<AppState>,
    Path(id): Path<VersionId>,
) -> Result<StatusCode, ApiError> {
    state.repo().delete_version(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user(State(state): State<AppState>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.repo().current_user()?))
}

pub async fn save_user(
    State(state): State<AppState>,
    Json(body): Json<SaveUserBody>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.repo().save_user(body.name.trim())?))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/sync/parse", post(sync_parse))
        .route("/api/sync/generate", post(sync_generate))
        .route("/api/sync/grid", post(sync_grid))
        .route("/api/sync/suggest", post(sync_suggest))
        .route("/api/diagrams", get(list_diagrams).post(create_diagram))
        .route("/api/diagrams/{id}", get(get_diagram).delete(delete_diagram))
        .route("/api/diagrams/{id}/versions", get(list_versions).post(append_version))
        .route(
            "/api/versions/{id}",
            get(get_version).patch(rename_version).delete(delete_version),
        )
        .route("/api/user", get(get_user).put(save_user))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// API routes with `static_root` served for everything else.
pub fn router(state: AppState, static_root: &FsPath) -> Router {
    let assets = ServeDir::new(static_root).append_index_html_on_directories(true);
    api_routes(state).fallback_service(assets).layer(TraceLayer::new_for_http())
}

pub async fn bind(port: u16) -> Result<TcpListener, ServerError> {
    TcpListener::bind((Ipv4Addr::LOCALHOST, port))
        .await
        .map_err(|source| ServerError::Bind { port, source })
}

pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await.map_err(ServerError::Serve)
}

/// Binds, optionally opens a browser, and serves until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = bind(config.port).await?;
    let addr: SocketAddr = listener.local_addr().map_err(ServerError::Serve)?;
    let state = AppState::with_backend(FolderBackend::new(&config.store_dir));
    let url = format!("http://{addr}/");

    info!(
        %url,
        static_root = %config.static_root.display(),
        store_dir = %config.store_dir.display(),
        "serving editor"
    );
    if config.open_browser {
        open_browser(&url);
    }

    serve(listener, router(state, &config.static_root), shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}

/// Best effort; a missing opener is logged, not fatal.
fn open_browser(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command.arg(url).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    match spawn_reaped(command) {
        Ok(_) => debug!(%url, "opened browser"),
        Err(err) => warn!(%url, error = %err, "could not open browser"),
    }
}

/// Spawns `command` and waits for it on the blocking pool so the child is reaped.
fn spawn_reaped(mut command: Command) -> std::io::Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = command.spawn()?;
    Ok(tokio::task::spawn_blocking(move || match child.wait() {
        Ok(status) => Some(status),
        Err(err) => {
            debug!(error = %err, "cannot wait for child process");
            None
        }
    }))
}
