use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    AlreadyWon,
    BoardFull,
    ColumnFull,
    OutOfBounds,
    Unknown,
    /// A code this client does not know; kept verbatim for display.
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::AlreadyWon => "ALREADY_WON",
            ErrorCode::BoardFull => "BOARD_FULL",
            ErrorCode::ColumnFull => "COLUMN_FULL",
            ErrorCode::OutOfBounds => "OUT_OF_BOUNDS",
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::Other(code) => code,
        }
    }

    /// Codes that only mean "that column can't take a disc"; the move is simply not made.
    pub fn is_input_rejection(&self) -> bool {
        matches!(self, ErrorCode::ColumnFull | ErrorCode::OutOfBounds)
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ALREADY_WON" => ErrorCode::AlreadyWon,
            "BOARD_FULL" => ErrorCode::BoardFull,
            "COLUMN_FULL" => ErrorCode::ColumnFull,
            "OUT_OF_BOUNDS" => ErrorCode::OutOfBounds,
            "UNKNOWN" => ErrorCode::Unknown,
            _ => ErrorCode::Other(value),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(value: ErrorCode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `exception` object a server embeds in an otherwise successful HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {}", .message.as_deref().unwrap_or("no message"))]
pub struct GameException {
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
}

impl GameException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            class_name: None,
            column: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("could not parse cell '{0}', expected a single character")]
    InvalidCell(String),
    #[error("board has no rows")]
    Empty,
    #[error("board declares {expected} rows but has {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("row {row} declares {expected} columns but has {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("disc at column {col}, row {row} has an empty cell below it")]
    Floating { col: usize, row: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_survive_round_trip() {
        let exception: GameException =
            serde_json::from_str(r#"{"code":"SERVER_MELTED","message":"boom"}"#).expect("decode");
        assert_eq!(exception.code, ErrorCode::Other("SERVER_MELTED".into()));
        assert_eq!(exception.to_string(), "SERVER_MELTED: boom");
        assert!(!exception.code.is_input_rejection());
    }

    #[test]
    fn column_full_and_out_of_bounds_are_input_rejections() {
        assert!(ErrorCode::from("COLUMN_FULL".to_string()).is_input_rejection());
        assert!(ErrorCode::from("OUT_OF_BOUNDS".to_string()).is_input_rejection());
        assert!(!ErrorCode::BoardFull.is_input_rejection());
    }

    #[test]
    fn decodes_illegal_move_detail() {
        let exception: GameException = serde_json::from_str(
            r#"{"message":"full","class":"connect4.api.IllegalMoveException","code":"COLUMN_FULL","column":3,"disc":"y"}"#,
        )
        .expect("decode");
        assert_eq!(exception.column, Some(3));
        assert_eq!(
            exception.class_name.as_deref(),
            Some("connect4.api.IllegalMoveException")
        );
    }
}
