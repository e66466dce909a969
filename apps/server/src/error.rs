use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finmate_core::errors::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Too many requests")]
    TooManyRequests,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest("Invalid request body".to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                CoreError::MarketData(_) => {
                    tracing::warn!("Upstream failure: {}", e);
                    (StatusCode::BAD_GATEWAY, "upstream_error".to_string())
                }
                CoreError::Storage(_) => {
                    tracing::error!("Request failed: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use finmate_core::errors::ValidationError;
    use finmate_market_data::MarketDataError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(CoreError::from(ValidationError::MissingField("x".into()))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(CoreError::NotFound("p1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(CoreError::Storage("bad json".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(CoreError::from(MarketDataError::NoData("x".into()))),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::BadRequest("nope".into()), StatusCode::BAD_REQUEST),

            (ApiError::TooManyRequests, StatusCode::TOO_MANY_REQUESTS),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
