use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use pokedex_core::{CoreError, PageQuery};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// -------------------------
// Error bodies
// -------------------------

/// Wire shape of every error response: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// High-level API errors to be mapped to HTTP responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field.
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(id) => ApiError::NotFound(format!("pokemon not found: {id}")),
            CoreError::InvalidQuery(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec());

        let mut response = (status, bytes).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

// -------------------------
// List query parameters
// -------------------------

/// Raw query string of `GET /api/pokemon`.
///
/// Values are kept as strings so unparsable numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search_term: Option<String>,
}

impl ListParams {
    /// Resolve into a page query: missing or unparsable `page` is 1, missing or
    /// unparsable `limit` is `default_limit`, both are raised to at least 1 and
    /// `limit` is capped at `max_limit`.
    pub fn into_query(self, default_limit: u64, max_limit: u64) -> Result<PageQuery, ApiError> {
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(self.limit.as_deref())
            .unwrap_or(default_limit)
            .clamp(1, max_limit.max(1));
        Ok(PageQuery::new(page, limit, self.search_term)?)
    }
}

/// Leading-integer parse: `"3"`, `" 3 "` and `"3abc"` give 3; zero, negative
/// or empty input give `None`.
fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let trimmed = raw?.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().ok().filter(|&n| n > 0)
}
