use std::any::Any;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, UNEXPECTED_ERROR_MESSAGE};
use crate::models::WeatherResult;
use crate::models::city::EMPTY_QUERY_MESSAGE;
use crate::weather::WeatherLookup;

/// Uniform body for every answer: either `data` or `error` is set, never both.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(status: StatusCode, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                message,
                status: status.as_u16(),
            }),
        }
    }
}

/// HTTP status for each failure kind
#[must_use]
pub fn status_for(err: &LookupError) -> StatusCode {
    match err {
        LookupError::CityNotFound(_) => StatusCode::NOT_FOUND,
        LookupError::UpstreamInvalidResponse(_) => StatusCode::BAD_GATEWAY,
        LookupError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        LookupError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        if let LookupError::Internal(err) = &self {
            tracing::error!("Weather lookup failed unexpectedly: {:?}", err);
        }
        let status = status_for(&self);
        let body = ApiEnvelope::<WeatherResult>::failure(status, self.user_message());
        (status, Json(body)).into_response()
    }
}

/// Turns a handler panic into the generic 500 envelope
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Request handler panicked: {}", detail);

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = ApiEnvelope::<WeatherResult>::failure(status, UNEXPECTED_ERROR_MESSAGE.to_string());
    (status, Json(body)).into_response()
}

pub fn router(lookup: Arc<WeatherLookup>) -> Router {
    Router::new()
        .route("/weather/{city}", get(get_weather))
        .with_state(lookup)
}

async fn get_weather(
    State(lookup): State<Arc<WeatherLookup>>,
    city: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiEnvelope<WeatherResult>>, LookupError> {
    let Path(city) = city.map_err(|rejection| {
        tracing::debug!("Rejected city path segment: {}", rejection.body_text());
        LookupError::city_not_found(EMPTY_QUERY_MESSAGE)
    })?;
    let result = lookup.lookup(&city).await?;
    Ok(Json(ApiEnvelope::success(result)))
}
