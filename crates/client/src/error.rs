use gms_engine::Rejection;
use gms_interchange::ReconcileError;

/// All errors a cover-letter API call can produce.
///
/// The variants follow what the caller must do next: retry, log in again,
/// give up, or show a workflow message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response arrived (DNS, connect, timeout). Safe to retry.
    #[error("network error: {message}")]
    Network { message: String },

    /// Missing or expired credentials (HTTP 401). Requires a new login.
    #[error("authentication required: {message}")]
    Unauthenticated { message: String },

    /// The role lacks permission for this action (HTTP 403). Not retryable.
    #[error("permission denied: {message}")]
    Forbidden { message: String },

    /// The cover letter does not exist for this role (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-success answer, including `{"success": false}` bodies.
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The body is not JSON or lacks the expected envelope.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Pre-flight refused the action; nothing was sent.
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// The reconciled letter carries no identifier to address it by.
    #[error("cover letter has no entryId")]
    MissingEntryId,

    /// The request could not be built or sent as given (bad URI, proxy,
    /// body encoding). Nothing reached the backend; retrying cannot help.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The client is not configured to reach the backend.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ApiError {
    /// Only transport failures may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated { .. })
    }

    /// Map a failure message from a response body onto the taxonomy.
    ///
    /// The backend sometimes reports auth problems with a non-401 status and
    /// a message such as "Authentication required".
    pub fn from_failure_message(status: u16, message: &str) -> ApiError {
        let lower = message.to_ascii_lowercase();
        let message = message.to_string();
        if lower.contains("authentication required")
            || lower.contains("not authenticated")
            || lower.contains("unauthorized")
        {
            ApiError::Unauthenticated { message }
        } else if lower.contains("permission") || lower.contains("forbidden") {
            ApiError::Forbidden { message }
        } else {
            ApiError::Backend { status, message }
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::BackendFailure { message } => {
                ApiError::from_failure_message(200, &message)
            }
            other => ApiError::MalformedResponse {
                message: other.to_string(),
            },
        }
    }
}
