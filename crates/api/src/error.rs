//! Unified error handling for the API.
//!
//! Engine domain errors map to specific, actionable responses; anything
//! infrastructural becomes a generic 500 that never leaks internals.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use toy_trove_engine::EngineError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Engine operation failed (domain or database).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Caller is not authenticated.
    #[error("unauthorized")]
    Unauthorized,

    /// Caller lacks the required role.
    #[error("forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    /// Stable machine-readable code for the condition.
    fn code(&self) -> &'static str {
        match self {
            Self::Engine(err) => match err {
                EngineError::EmptyOrder => "empty_cart",
                EngineError::Validation(_) => "validation",
                EngineError::InsufficientStock { .. } => "insufficient_stock",
                EngineError::Inactive(_) => "product_unavailable",
                EngineError::InvalidTransition { .. } => "invalid_transition",
                EngineError::NotFound => "not_found",
                EngineError::Database(_) => "internal",
            },
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::BadRequest(_) => "bad_request",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Engine(err) => match err {
                EngineError::EmptyOrder | EngineError::Validation(_) => StatusCode::BAD_REQUEST,
                EngineError::InsufficientStock { .. }
                | EngineError::Inactive(_)
                | EngineError::InvalidTransition { .. } => StatusCode::CONFLICT,
                EngineError::NotFound => StatusCode::NOT_FOUND,
                EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Infrastructure failures go to Sentry; state errors are suspicious
        // enough to warrant a WARN even though the caller gets a clean 409.
        match &self {
            Self::Engine(EngineError::Database(_)) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "API request error");
            }
            Self::Engine(EngineError::InvalidTransition { .. }) => {
                tracing::warn!(error = %self, "invalid transition requested");
            }
            _ => {}
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toy_trove_core::{OrderStatus, ProductId};

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(
            status_of(AppError::Engine(EngineError::EmptyOrder)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Engine(EngineError::InsufficientStock {
                product_id: ProductId::new(1),
                available: 0,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Engine(EngineError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Engine(EngineError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::Engine(EngineError::Database(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
    }
}
