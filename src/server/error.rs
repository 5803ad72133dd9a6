use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::relay::{Failure, FailureKind};

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub Failure);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
            FailureKind::LimitExceeded | FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            FailureKind::NotConfigured | FailureKind::UpstreamError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.0.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_failure_kind() {
        let cases = [
            (Failure::invalid_input(), StatusCode::BAD_REQUEST),
            (Failure::limit_exceeded(5), StatusCode::TOO_MANY_REQUESTS),
            (Failure::not_configured(), StatusCode::INTERNAL_SERVER_ERROR),
            (Failure::rate_limited(), StatusCode::TOO_MANY_REQUESTS),
            (Failure::upstream(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (failure, status) in cases {
            assert_eq!(ApiError::from(failure).status(), status);
        }
    }
}
