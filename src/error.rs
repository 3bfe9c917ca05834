use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RetrieverError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing query parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(url::ParseError),

    #[error("Unsupported URL scheme `{0}`; only http and https are fetched")]
    UnsupportedScheme(String),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),
}

impl IntoResponse for RetrieverError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            RetrieverError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "MISSING_PARAMETER".to_string(),
                    message: format!("Query parameter `{name}` is required."),
                },
            ),
            RetrieverError::InvalidTargetUrl(_) | RetrieverError::UnsupportedScheme(_) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_URL".to_string(),
                    message: "The URL to fetch is not a valid http(s) URL.".to_string(),
                },
            ),
            RetrieverError::Signing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "SIGNING_ERROR".to_string(),
                    message: "The outbound request could not be signed.".to_string(),
                },
            ),
            RetrieverError::DatabaseError(_)
            | RetrieverError::Config(_)
            | RetrieverError::InvalidConfig(_)
            | RetrieverError::Io(_)
            | RetrieverError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
            RetrieverError::Reqwest(e) if e.is_timeout() => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiErrorBody {
                    code: "GATEWAY_TIMEOUT".to_string(),
                    message: "Upstream service timed out.".to_string(),
                },
            ),
            RetrieverError::Reqwest(_) | RetrieverError::UrlParse(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                },
            ),
            RetrieverError::UpstreamStatus(code) => {
                let (err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };
                // only error classes are echoed; 1xx/3xx answers become a gateway error
                let status = if code.is_client_error() || code.is_server_error() {
                    code
                } else {
                    StatusCode::BAD_GATEWAY
                };

                (
                    status,
                    ApiErrorBody {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
