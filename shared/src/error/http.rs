//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // General
            ErrorCode::Success => StatusCode::OK,
            ErrorCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::InvalidFormat
            | ErrorCode::RequiredField => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,

            // Auth (401)
            ErrorCode::NotAuthenticated
            | ErrorCode::InvalidCredentials
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid => StatusCode::UNAUTHORIZED,

            // Permission (403)
            ErrorCode::PermissionDenied
            | ErrorCode::RoleRequired
            | ErrorCode::AdminRequired => StatusCode::FORBIDDEN,

            // Order
            ErrorCode::OrderNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidTransition
            | ErrorCode::OrderAlreadyCompleted
            | ErrorCode::OrderAlreadyRejected => StatusCode::UNPROCESSABLE_ENTITY,

            // Catalog / Content
            ErrorCode::WebsiteNotFound | ErrorCode::PostNotFound => StatusCode::NOT_FOUND,
            ErrorCode::WebsiteInactive => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ContentRefInvalid => StatusCode::BAD_REQUEST,
            ErrorCode::ContentPatchFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // System
            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::InvalidTransition.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
