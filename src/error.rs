/// Error Handling Module
///
/// One error type per concern, all folding into `AppError`:
/// 1. Validation errors for request input
/// 2. Store errors (lookups, conflicts, file I/O)
/// 3. Authentication / authorization errors
/// 4. HTTP response mapping with structured logging

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
}

/// Persistent store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Only the author may modify this chirp")]
    NotAuthor,
    #[error("Store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Authentication and authorization errors
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header not included")]
    MissingHeader,
    #[error("Malformed authorization header")]
    MalformedHeader,
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token could not be decoded")]
    InvalidToken,
    #[error("Token has expired")]
    Expired,
    #[error("Wrong token type")]
    WrongTokenType,
    #[error("Token has been revoked")]
    RevokedToken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid API key")]
    InvalidApiKey,
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Internal error: {0}")]
    Internal(String),
    /// Failure inside a handler that already holds an `ErrorContext`
    #[error("{operation} failed: {source}")]
    InContext {
        request_id: String,
        operation: String,
        source: Box<AppError>,
    },
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to clients
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Request id, also present in the server log line
    pub error_id: String,
    pub message: String,
    /// Stable code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    /// Status, client code and client-facing message.
    ///
    /// Auth failures collapse into coarse codes so callers learn the category
    /// of the failure and nothing more.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Store(e) => match e {
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                StoreError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_ENTRY", e.to_string()),
                StoreError::NotAuthor => (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string()),
                StoreError::Io(_) | StoreError::Serialization(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Store error occurred".to_string(),
                ),
            },

            AppError::Auth(e) => match e {
                AuthError::MissingHeader | AuthError::MalformedHeader => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Missing or invalid authorization header".to_string(),
                ),
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    e.to_string(),
                ),
                AuthError::InvalidApiKey => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_API_KEY",
                    e.to_string(),
                ),
                AuthError::InvalidSignature
                | AuthError::InvalidToken
                | AuthError::Expired
                | AuthError::WrongTokenType
                | AuthError::RevokedToken => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_INVALID",
                    "Invalid or expired token".to_string(),
                ),
            },

            AppError::Hashing(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),

            AppError::InContext { source, .. } => source.classify(),
        }
    }

    /// Request id assigned by the handler, if the error passed through one.
    fn request_id(&self) -> Option<&str> {
        match self {
            AppError::InContext { request_id, .. } => Some(request_id),
            _ => None,
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.classify();
        let body = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );
        (status, body)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Store(StoreError::Io(_) | StoreError::Serialization(_)) => {
                tracing::error!(request_id = request_id, error = %self, "Store failure");
            }
            AppError::Store(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Store rejected request");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Hashing(msg) | AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
            AppError::InContext { operation, source, .. } => {
                let _span = tracing::info_span!("operation", name = %operation).entered();
                source.log_error(request_id);
            }
        }
    }
}

/// Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = self
            .request_id()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.log_error(&request_id);

        let (status, body) = <Self as ErrorHandler>::error_response(self, &request_id);
        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context carried through a handler for log correlation
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Tag a failure with this context so the error response and its log
    /// line carry `request_id`.
    pub fn attach(&self, error: impl Into<AppError>) -> AppError {
        AppError::InContext {
            request_id: self.request_id.clone(),
            operation: self.operation.clone(),
            source: Box::new(error.into()),
        }
    }
}
