//! Response envelope shared by every API call.
//!
//! # Invariants
//! - `success == true` implies `data.is_some()` and no error fields.
//! - `success == false` implies `error` and `error_kind` are set.

use bolajon_core::{LearningServiceError, RepoError, UserServiceError, ValidationError};
use serde::{Deserialize, Serialize};

/// Failure class, mirrored to HTTP-style 400/404/500 by transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    Validation,
    NotFound,
    Internal,
}

impl ApiErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

/// `{ success, data, error }` response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ApiErrorKind>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    pub(crate) fn from_result(result: Result<T, ApiFailure>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(failure) => Self::failure(failure.kind, failure.message),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Serialises the envelope; falls back to a fixed internal-error body.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(
                "{{\"success\":false,\"error\":\"serialization failed: {}\",\"error_kind\":\"internal\"}}",
                err.to_string().replace('"', "'")
            )
        })
    }
}

/// Error carried between the use-case call and the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiFailure {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiFailure {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiFailure {
    fn from(value: ValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<RepoError> for ApiFailure {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => err.into(),
            RepoError::UserNotFound(_) => Self::not_found(value.to_string()),
            RepoError::Db(err) if err.is_busy() => {
                Self::internal(format!("database busy, retry later: {err}"))
            }
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiFailure {
    fn from(value: UserServiceError) -> Self {
        match value {
            UserServiceError::Validation(err) => err.into(),
            UserServiceError::UserNotFound(_) => Self::not_found(value.to_string()),
            UserServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<LearningServiceError> for ApiFailure {
    fn from(value: LearningServiceError) -> Self {
        match value {
            LearningServiceError::Validation(err) => err.into(),
            LearningServiceError::UserNotFound(_) => Self::not_found(value.to_string()),
            LearningServiceError::Speech(err) => Self::internal(err.to_string()),
            LearningServiceError::Repo(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiErrorKind, ApiFailure, ApiResponse};
    use bolajon_core::{UserServiceError, ValidationError};
    use uuid::Uuid;

    #[test]
    fn success_envelope_omits_error_fields() {
        let json = ApiResponse::ok(3_u32).to_json();
        assert_eq!(json, r#"{"success":true,"data":3}"#);
    }

    #[test]
    fn failure_envelope_carries_kind() {
        let response: ApiResponse<u32> = ApiResponse::failure(ApiErrorKind::NotFound, "missing");
        let value: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "missing");
        assert_eq!(value["error_kind"], "not_found");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn service_errors_map_to_kinds() {
        let not_found: ApiFailure = UserServiceError::UserNotFound(Uuid::nil()).into();
        assert_eq!(not_found.kind, ApiErrorKind::NotFound);

        let invalid: ApiFailure = ValidationError::AgeOutOfRange(12).into();
        assert_eq!(invalid.kind, ApiErrorKind::Validation);
    }
}
