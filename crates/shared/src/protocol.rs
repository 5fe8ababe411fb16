use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{Board, Disc, GameState},
    error::GameException,
};

pub const PLAY_PATH: &str = "/game/play";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GameRequest {
    /// Play `column` for `current_player`; the server answers with its own counter-move.
    #[serde(rename_all = "camelCase")]
    Next {
        current_player: Disc,
        board: Board,
        column: i64,
    },
    /// Ask the server to pick a move for `current_player`.
    #[serde(rename_all = "camelCase")]
    Recommend { current_player: Disc, board: Board },
    /// Fire-and-forget cold-start mitigation.
    Warm,
}

impl GameRequest {
    pub fn action(&self) -> &'static str {
        match self {
            GameRequest::Next { .. } => "next",
            GameRequest::Recommend { .. } => "recommend",
            GameRequest::Warm => "warm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResponse {
    pub game_state: GameState,
    pub player_board: Board,
    pub player_row: usize,
    #[serde(default)]
    pub ai_board: Option<Board>,
    #[serde(default)]
    pub ai_col: Option<usize>,
    #[serde(default)]
    pub ai_row: Option<usize>,
}

impl PlayResponse {
    /// The opponent's counter-move, when the server made one.
    pub fn ai_move(&self) -> Option<(usize, usize, &Board)> {
        match (self.ai_col, self.ai_row, self.ai_board.as_ref()) {
            (Some(col), Some(row), Some(board)) => Some((col, row, board)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub game_state: GameState,
    pub board: Board,
    pub recommend_column: usize,
    pub recommend_row: usize,
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("server reported {0}")]
    Exception(GameException),
    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Splits a raw reply into the embedded `exception` (if any, and not `null`) or the success body.
pub fn decode_reply<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ReplyError> {
    if let Some(exception) = value.get("exception").filter(|e| !e.is_null()) {
        let exception: GameException = serde_json::from_value(exception.clone())?;
        return Err(ReplyError::Exception(exception));
    }
    Ok(serde_json::from_value(value)?)
}
