//! HTTP status handling for the Data API.

use jotter_core::{Error, ItemKind};

/// Classes of failure the Data API reports through its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Missing or wrong token.
    Unauthorized,
    /// Record does not exist.
    NotFound,
    /// Malformed request body or parameters.
    BadRequest,
    /// Too many requests.
    RateLimited,
    /// Server-side failure.
    ServerError,
    /// Anything else.
    Unknown,
}

impl ApiErrorCode {
    /// Determine the error code from an HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400 | 422 => Self::BadRequest,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if a request failing with this code may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }
}

/// Convert a failed response into a jotter [`Error`].
///
/// `target` names the record the request addressed; a 404 without a target
/// (a collection request) is a rejected request, not a missing record. Any
/// other failure on a target carries the target's kind and id in its message.
pub fn to_error(status: u16, target: Option<(ItemKind, &str)>, message: &str) -> Error {
    let code = ApiErrorCode::from_status(status);
    let err = match (code, target) {
        (ApiErrorCode::NotFound, Some((kind, id))) => return Error::not_found(kind, id),
        (ApiErrorCode::Unauthorized, _) => Error::Backend {
            status: Some(status),
            message: format!(
                "authorization rejected, check JOTTER_API_TOKEN: {}",
                message
            ),
        },
        _ => Error::Backend {
            status: Some(status),
            message: message.to_string(),
        },
    };
    match target {
        Some((kind, id)) => err.for_record(kind, id),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jotter_core::ErrorKind;

    #[test]
    fn test_error_code_from_401() {
        assert_eq!(ApiErrorCode::from_status(401), ApiErrorCode::Unauthorized);
    }

    #[test]
    fn test_error_code_from_404() {
        assert_eq!(ApiErrorCode::from_status(404), ApiErrorCode::NotFound);
    }

    #[test]
    fn test_error_code_from_502() {
        assert_eq!(ApiErrorCode::from_status(502), ApiErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_from_unknown() {
        assert_eq!(ApiErrorCode::from_status(418), ApiErrorCode::Unknown);
    }

    #[test]
    fn test_retryable() {
        assert!(ApiErrorCode::RateLimited.is_retryable());
        assert!(ApiErrorCode::ServerError.is_retryable());
        assert!(!ApiErrorCode::NotFound.is_retryable());
        assert!(!ApiErrorCode::Unauthorized.is_retryable());
    }

    #[test]
    fn test_404_with_target_is_not_found() {
        let err = to_error(404, Some((ItemKind::Note, "abc")), "Not Found");
        assert!(matches!(err, Error::NotFound { kind: ItemKind::Note, ref id } if id == "abc"));
    }

    #[test]
    fn test_404_without_target_is_backend_error() {
        let err = to_error(404, None, "no route");
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn test_server_error_names_target() {
        let id = "0123456789abcdef0123456789abcdef";
        let err = to_error(500, Some((ItemKind::Folder, id)), "database is locked");
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains(id));
        assert!(err.to_string().contains("database is locked"));
    }

    #[test]
    fn test_unauthorized_mentions_token() {
        let err = to_error(403, None, "Invalid token");
        assert!(err.to_string().contains("JOTTER_API_TOKEN"));
        assert!(err.to_string().contains("403"));
    }
}
