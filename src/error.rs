//! Error taxonomy shared by the backend and the use cases.
//!
//! Every failure carries one of five kinds. Callers that need to branch use
//! [`GuildError::kind`]; the chat surface uses [`GuildError::user_message`].

use std::fmt;

/// Why an operation was refused before (or abandoned during) I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled the context.
    Cancelled,
    /// The context deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("context cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Coarse classification preserved across the use-case boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Cancelled,
    NotFound,
    AlreadyExists,
    Validation,
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum GuildError {
    #[error("{operation}: {reason}")]
    Cancelled {
        operation: &'static str,
        reason: CancelReason,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("database error in {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl GuildError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wrap a driver error. A unique-constraint violation on `entity` is
    /// reported as [`ErrorKind::AlreadyExists`] so a lost insert race looks
    /// the same to callers as a pre-check hit.
    pub fn from_sqlx(operation: &'static str, entity: &'static str, key: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::already_exists(entity, key);
            }
        }
        Self::Transport {
            operation,
            source: err,
        }
    }

    pub fn transport(operation: &'static str, err: sqlx::Error) -> Self {
        Self::Transport {
            operation,
            source: err,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GuildError::Cancelled { .. } => ErrorKind::Cancelled,
            GuildError::NotFound { .. } => ErrorKind::NotFound,
            GuildError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            GuildError::Validation { .. } => ErrorKind::Validation,
            GuildError::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Short text suitable for a chat reply.
    pub fn user_message(&self) -> String {
        match self {
            GuildError::NotFound { entity, key } => format!("{entity} `{key}` does not exist"),
            GuildError::AlreadyExists { entity, key } => format!("{entity} `{key}` already exists"),
            GuildError::Validation { field, message } => format!("invalid {field}: {message}"),
            GuildError::Cancelled { .. } => {
                "the request took too long and was dropped, please try again".to_string()
            }
            GuildError::Transport { .. } => {
                "the database is unavailable right now, please try again later".to_string()
            }
        }
    }
}

pub type GuildResult<T> = Result<T, GuildError>;
