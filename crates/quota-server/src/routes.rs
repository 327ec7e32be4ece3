//! HTTP routes.

use axum::extract::{FromRequestParts, State};
use axum::http::header::RETRY_AFTER;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quota_core::defaults::{USER_CLASS_HEADER, USER_ID_HEADER};
use quota_core::{ERROR_INVALID_CALLER, ERROR_STORAGE};
use quota_limiter::{Decision, LimiterError, UserClass, UserId};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::state::AppState;

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/usage/check", post(check_usage))
        .route("/v1/usage", get(current_usage))
        .route("/health", get(health))
        .with_state(state)
}

/// Authenticated caller, taken from the upstream proxy's headers.
///
/// A missing class header is kept as an empty class, which resolves
/// through the unknown-class fallback.
#[derive(Debug)]
pub(crate) struct Caller {
    user_id: UserId,
    class: UserClass,
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_str(&parts.headers, USER_ID_HEADER)?
            .ok_or_else(|| LimiterError::InvalidCaller(format!("missing {USER_ID_HEADER} header")))
            .and_then(UserId::parse)?;
        let class = header_str(&parts.headers, USER_CLASS_HEADER)?
            .map(UserClass::new)
            .unwrap_or_else(|| UserClass::new(""));
        Ok(Self { user_id, class })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| LimiterError::InvalidCaller(format!("{name} header is not visible ASCII")))
        })
        .transpose()
        .map_err(ApiError::from)
}

/// Error body for non-quota failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Failures that end a request before or instead of a quota answer.
#[derive(Debug)]
pub(crate) enum ApiError {
    /// Missing or malformed caller identity.
    InvalidCaller(String),
    /// Storage unreachable on a read-only path.
    Unavailable(String),
}

impl From<LimiterError> for ApiError {
    fn from(e: LimiterError) -> Self {
        match e {
            LimiterError::InvalidCaller(msg) => Self::InvalidCaller(msg),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCaller(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::InvalidCaller(message) => ErrorBody {
                error: ERROR_INVALID_CALLER,
                message,
            },
            Self::Unavailable(message) => ErrorBody {
                error: ERROR_STORAGE,
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// `POST /v1/usage/check`
async fn check_usage(
    State(state): State<AppState>,
    caller: Result<Caller, ApiError>,
) -> Response {
    let caller = match caller {
        Ok(caller) => caller,
        Err(e) => {
            debug!(error = ?e, "rejecting request without valid caller");
            quota_metrics::record_http_request("check", e.status().as_u16());
            return e.into_response();
        }
    };

    let decision = state
        .limiter
        .check_and_record(&caller.user_id, &caller.class)
        .await;

    let response = match &decision {
        Decision::Allowed { .. } => (StatusCode::OK, Json(decision.body())).into_response(),
        Decision::Rejected { usage } => {
            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, Json(decision.body())).into_response();
            let wait = retry_after_secs(usage.reset_time, state.limiter.now_utc());
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(wait));
            response
        }
    };

    quota_metrics::record_http_request("check", response.status().as_u16());
    response
}

/// Whole seconds until `reset`, never less than one.
fn retry_after_secs(reset: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (reset - now).whole_seconds().max(1)
}

/// `GET /v1/usage`
async fn current_usage(
    State(state): State<AppState>,
    caller: Result<Caller, ApiError>,
) -> Response {
    let response = match caller {
        Ok(caller) => match state
            .limiter
            .current_usage(&caller.user_id, &caller.class)
            .await
        {
            Ok(usage) => (StatusCode::OK, Json(usage.body())).into_response(),
            Err(e) => {
                warn!(user_id = %caller.user_id, error = %e, "usage lookup failed");
                ApiError::from(e).into_response()
            }
        },
        Err(e) => e.into_response(),
    };

    quota_metrics::record_http_request("usage", response.status().as_u16());
    response
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// `GET /health`
async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}
