use std::path::PathBuf;

use shared::{
    error::{ErrorCode, GameException},
    protocol::ReplyError,
};
use thiserror::Error;

/// How the session reacts to a failed round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The server refused the column; input is simply re-enabled.
    InputRejected,
    /// The server reported some other exception; surfaced with its raw code.
    Application,
    /// Network failure, non-2xx status or an unreadable payload.
    Transport,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("server reported {0}")]
    Server(GameException),
    #[error("malformed reply: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unexpected reply: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Server(exception) if exception.code.is_input_rejection() => {
                ErrorClass::InputRejected
            }
            ClientError::Server(_) => ErrorClass::Application,
            ClientError::Transport(_)
            | ClientError::Status { .. }
            | ClientError::Malformed(_)
            | ClientError::Unexpected(_) => ErrorClass::Transport,
        }
    }

    pub fn exception_code(&self) -> Option<&ErrorCode> {
        match self {
            ClientError::Server(exception) => Some(&exception.code),
            _ => None,
        }
    }
}

impl From<ReplyError> for ClientError {
    fn from(value: ReplyError) -> Self {
        match value {
            ReplyError::Exception(exception) => ClientError::Server(exception),
            ReplyError::Malformed(err) => ClientError::Malformed(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_server_exceptions_by_code() {
        let full = ClientError::Server(GameException::new(ErrorCode::ColumnFull, "full"));
        assert_eq!(full.class(), ErrorClass::InputRejected);

        let won = ClientError::Server(GameException::new(ErrorCode::AlreadyWon, "won"));
        assert_eq!(won.class(), ErrorClass::Application);
        assert_eq!(won.exception_code(), Some(&ErrorCode::AlreadyWon));
    }

    #[test]
    fn status_errors_are_transport_failures() {
        let err = ClientError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(err.class(), ErrorClass::Transport);
        assert_eq!(err.to_string(), "server returned HTTP 502: Bad Gateway");
    }
}
