use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use weather_core::{ErrorKind, NormalizedWeather, SearchRecord, WeatherError, WeatherService};

pub type AppState = Arc<WeatherService>;

const WEATHER_ERROR_TITLE: &str = "Erro ao buscar dados do clima";
const HISTORY_ERROR_TITLE: &str = "Erro ao buscar histórico de consultas";

/// HTTP status per error kind. Every lookup failure is reported as a client
/// error; not-found and upstream failures are not told apart at this level.
const STATUS_BY_KIND: &[(ErrorKind, StatusCode)] = &[
    (ErrorKind::Configuration, StatusCode::BAD_REQUEST),
    (ErrorKind::NotFound, StatusCode::BAD_REQUEST),
    (ErrorKind::Provider, StatusCode::BAD_REQUEST),
    (ErrorKind::Transport, StatusCode::BAD_REQUEST),
    (ErrorKind::Internal, StatusCode::BAD_REQUEST),
];

fn status_for(kind: ErrorKind) -> StatusCode {
    STATUS_BY_KIND
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or(StatusCode::BAD_REQUEST, |(_, status)| *status)
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/weather/history", get(history))
        .route("/weather/{city}", get(weather))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    erro: &'static str,
    mensagem: String,
}

#[derive(Debug)]
struct ApiError {
    title: &'static str,
    source: WeatherError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.source.kind());
        let body = ErrorBody { erro: self.title, mensagem: self.source.to_string() };
        (status, Json(body)).into_response()
    }
}

async fn weather(
    State(service): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<NormalizedWeather>, ApiError> {
    match service.lookup(&city).await {
        Ok(lookup) => {
            tracing::debug!(city = %city, source = ?lookup.source, "weather lookup served");
            Ok(Json(lookup.weather))
        }
        Err(err) => {
            tracing::warn!(city = %city, kind = %err.kind(), error = %err, "weather lookup failed");
            Err(ApiError { title: WEATHER_ERROR_TITLE, source: err })
        }
    }
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    city: String,
    search_time: String,
}

impl From<SearchRecord> for HistoryEntry {
    fn from(record: SearchRecord) -> Self {
        Self { search_time: record.search_time(), city: record.city }
    }
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    historico: Vec<HistoryEntry>,
    total_consultas: usize,
}

async fn history(State(service): State<AppState>) -> Result<Json<HistoryResponse>, ApiError> {
    let records = service
        .recent_searches()
        .await
        .map_err(|source| ApiError { title: HISTORY_ERROR_TITLE, source })?;

    let historico: Vec<HistoryEntry> = records.into_iter().map(HistoryEntry::from).collect();

    Ok(Json(HistoryResponse { total_consultas: historico.len(), historico }))
}
