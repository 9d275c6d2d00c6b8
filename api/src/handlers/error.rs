//! Mapping of domain errors to HTTP responses
//!
//! Every authentication failure produces the same `401` body regardless of
//! the underlying reason. The reason is logged, never returned.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use validator::ValidationErrors;

use warden_core::errors::DomainError;
use warden_shared::{error_codes, ErrorResponse};

/// Errors surfaced by the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    Validation(ValidationErrors),

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    #[error("An internal error occurred")]
    Internal,
}

impl ApiError {
    fn to_body(&self) -> ErrorResponse {
        match self {
            ApiError::Unauthorized => {
                ErrorResponse::new(error_codes::UNAUTHORIZED, "Authentication required")
            }
            ApiError::Validation(errors) => {
                let fields: Vec<&str> = errors.field_errors().keys().copied().collect();
                ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request")
                    .add_detail("fields", fields)
            }
            ApiError::ServiceUnavailable => ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable. Please try again later",
            ),
            ApiError::Internal => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_body())
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Rejected(reason) => {
                log::warn!("Authentication failed: {} ({})", reason, reason.code());
                ApiError::Unauthorized
            }
            DomainError::StorageUnavailable { message } => {
                log::error!("Storage unavailable: {}", message);
                ApiError::ServiceUnavailable
            }
            DomainError::KeyGenerationFailed { message } => {
                log::error!("Key generation failed: {}", message);
                ApiError::ServiceUnavailable
            }
            other => {
                log::error!("Domain Error: {:?}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    ApiError::from(error).error_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::errors::{ClaimKind, RejectionReason};

    #[test]
    fn test_every_rejection_is_a_plain_401() {
        let reasons = [
            RejectionReason::MalformedToken,
            RejectionReason::UnknownKey,
            RejectionReason::DecryptionFailed,
            RejectionReason::SignatureInvalid,
            RejectionReason::claim(ClaimKind::Audience),
            RejectionReason::TokenExpired,
            RejectionReason::TokenRevoked,
            RejectionReason::SubjectNotFound,
            RejectionReason::ExpiredOrRevoked,
        ];

        for reason in reasons {
            let error = ApiError::from(DomainError::from(reason));
            assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(error.to_body().message, "Authentication required");
        }
    }

    #[test]
    fn test_infrastructure_errors_are_not_401() {
        let storage = handle_domain_error(DomainError::storage("redis down"));
        assert_eq!(storage.status(), StatusCode::SERVICE_UNAVAILABLE);

        let internal = handle_domain_error(DomainError::Internal {
            message: "bad pem".to_string(),
        });
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
