use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("access denied: {0} is outside the allowed directories")]
    AccessDenied(String),
    #[error("parent directory does not exist: {0}")]
    ParentNotFound(String),
    #[error("input file does not exist: {0}")]
    NotFound(String),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("encode failed: {0}")]
    EncodeFailure(String),
    #[error("converted but failed to delete original {path}: {reason}")]
    DeleteFailure { path: String, reason: String },
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::AccessDenied(_) => "AccessDenied",
            AppError::ParentNotFound(_) => "ParentNotFound",
            AppError::NotFound(_) => "NotFound",
            AppError::UnsupportedFormat(_) => "UnsupportedFormat",
            AppError::EncodeFailure(_) => "EncodeFailure",
            AppError::DeleteFailure { .. } => "DeleteFailure",
            AppError::InvalidParams(_) => "InvalidParams",
            AppError::UnknownTool(_) => "UnknownTool",
            AppError::Internal(_) => "Internal",
        }
    }

    /// JSON-RPC error code used when the error escapes a tool call.
    pub fn rpc_code(&self) -> i64 {
        match self {
            AppError::InvalidParams(_) | AppError::UnknownTool(_) => -32602,
            _ => -32000,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
