use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde_json::Value;

use crate::{
    models::*,
    normalize::normalize,
    progress::summarize,
    resolver::resolve_next,
    roster::{load_roster, reduce_roster},
    source::{CurriculumSource, SourceError},
};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn CurriculumSource>,
    pub roster_concurrency: usize,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;
type MaybeBearer = Option<TypedHeader<Authorization<Bearer>>>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // snapshots supplied by the caller
        .route("/api/progress", post(progress_inline))
        .route("/api/progress/roster", post(roster_inline))
        // snapshots fetched from the backend
        .route("/api/enrollments/:enrollment_id/progress", get(enrollment_progress))
        .route("/api/roster/progress", post(roster_fetch))
        .with_state(state)
}

fn progress_of(curriculum: &Curriculum) -> ProgressResponse {
    let CourseProgress { per_module, overall } = summarize(curriculum);
    ProgressResponse {
        overall,
        per_module,
        next: resolve_next(curriculum),
    }
}

async fn progress_inline(Json(raw): Json<Value>) -> Json<ProgressResponse> {
    Json(progress_of(&normalize(&raw)))
}

async fn roster_inline(Json(req): Json<InlineRosterReq>) -> Json<RosterResponse> {
    let entries = req
        .entries
        .into_iter()
        .map(|e| RosterEntry {
            enrollment_id: e.enrollment_id,
            snapshot: if e.curriculum.is_null() {
                Err(SnapshotError::Missing)
            } else {
                Ok(normalize(&e.curriculum))
            },
        })
        .collect();

    Json(RosterResponse {
        rows: reduce_roster(entries),
        computed_at: chrono::Utc::now(),
    })
}

async fn enrollment_progress(
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
    bearer: MaybeBearer,
) -> ApiResult<ProgressResponse> {
    let id = parse_id(&enrollment_id);
    let raw = state
        .source
        .fetch_curriculum(&id, token(&bearer))
        .await
        .map_err(source_err)?;
    Ok(Json(progress_of(&normalize(&raw))))
}

async fn roster_fetch(
    State(state): State<AppState>,
    bearer: MaybeBearer,
    Json(req): Json<FetchRosterReq>,
) -> ApiResult<RosterResponse> {
    if req.enrollment_ids.is_empty() {
        return Err(e400("enrollmentIds is empty"));
    }
    let bearer = token(&bearer).map(str::to_owned);
    let entries = load_roster(
        state.source.clone(),
        req.enrollment_ids,
        bearer,
        state.roster_concurrency,
    )
    .await;

    Ok(Json(RosterResponse {
        rows: reduce_roster(entries),
        computed_at: chrono::Utc::now(),
    }))
}

// --- helpers ---

// path ids keep the numeric shape the backend uses when they look numeric
fn parse_id(raw: &str) -> OpaqueId {
    raw.parse::<i64>()
        .map(OpaqueId::Number)
        .unwrap_or_else(|_| OpaqueId::Text(raw.to_string()))
}

fn token(bearer: &MaybeBearer) -> Option<&str> {
    bearer.as_ref().map(|TypedHeader(auth)| auth.token())
}

fn source_err(e: SourceError) -> (StatusCode, String) {
    match e {
        e @ SourceError::NotFound(_) => e404(e.to_string()),
        other => e502(other),
    }
}

fn e400<T: Into<String>>(msg: T) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}

fn e404<T: Into<String>>(msg: T) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, msg.into())
}

fn e502<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    tracing::error!(error=%e, "backend error");
    (StatusCode::BAD_GATEWAY, e.to_string())
}
