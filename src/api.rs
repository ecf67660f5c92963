use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::calendar::types::{SearchOutcome, SearchReport, SearchResponse};
use crate::calendar::CourtSearch;
use crate::ics;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<CourtSearch>,
}

impl AppState {
    pub fn new(search: CourtSearch) -> Self {
        Self {
            search: Arc::new(search),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route("/search/attorney", get(search_attorney))
        .route("/search/attorney/ics", get(search_attorney_ics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn default_all() -> String {
    "all".to_string()
}

// Names default to empty so a missing parameter gets the JSON 400, not a bare rejection.
#[derive(Debug, serde::Deserialize)]
struct AttorneyQuery {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default = "default_all")]
    date: String,
    #[serde(default = "default_all")]
    location: String,
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cfg = state.search.config();
    Json(serde_json::json!({
        "message": "Court Calendar Search API",
        "window_days": cfg.window_days,
        "max_concurrency": cfg.max_concurrency,
        "endpoints": {
            "/search/attorney": "Search hearings by attorney name",
            "/search/attorney/ics": "Same search as an iCalendar file",
            "/health": "Liveness probe"
        }
    }))
}

async fn run_search(state: &AppState, q: &AttorneyQuery) -> Result<SearchOutcome, Response> {
    state
        .search
        .search("attorney", &q.first_name, &q.last_name, &q.date, &q.location)
        .await
        .map_err(|e| {
            tracing::info!(target: "api", error = %e, "rejected search request");
            (
                StatusCode::BAD_REQUEST,
                Json(SearchResponse::failure(e.to_string())),
            )
                .into_response()
        })
}

fn report_headers(report: &SearchReport) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-units-failed", HeaderValue::from(report.failed_units));
    headers.insert(
        "x-query-timed-out",
        HeaderValue::from_static(if report.timed_out { "1" } else { "0" }),
    );
    headers
}

async fn search_attorney(State(state): State<AppState>, Query(q): Query<AttorneyQuery>) -> Response {
    match run_search(&state, &q).await {
        Ok(out) => {
            let headers = report_headers(&out.report);
            (StatusCode::OK, headers, Json(SearchResponse::from(out))).into_response()
        }
        Err(resp) => resp,
    }
}

async fn search_attorney_ics(
    State(state): State<AppState>,
    Query(q): Query<AttorneyQuery>,
) -> Response {
    match run_search(&state, &q).await {
        Ok(out) => {
            let body = ics::records_to_calendar(&out.records, chrono::Utc::now().naive_utc());
            let mut headers = report_headers(&out.report);
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/calendar; charset=utf-8"),
            );
            headers.insert(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"hearings.ics\""),
            );
            (StatusCode::OK, headers, body).into_response()
        }
        Err(resp) => resp,
    }
}
