//! Known-good `next` exchange used to probe a freshly deployed move server.

use anyhow::Result;
use serde_json::json;
use shared::{
    domain::{Board, Disc},
    protocol::PlayResponse,
};

pub const PLAYER: Disc = Disc::Red;
pub const COLUMN: i64 = 6;

pub fn request_board() -> Result<Board> {
    Ok(serde_json::from_value(json!({
        "numCols": 7,
        "numRows": 6,
        "rows": [
            ["r", "r", "y", ".", ".", ".", "."],
            ["y", "y", "y", ".", ".", ".", "."],
            ["y", "y", "y", ".", ".", ".", "."],
            ["r", ".", "r", ".", ".", ".", "."],
            [".", ".", ".", ".", ".", ".", "."],
            [".", ".", ".", ".", ".", ".", "."],
        ],
    }))?)
}

pub fn expected_reply() -> Result<PlayResponse> {
    Ok(serde_json::from_value(json!({
        "gameState": "0",
        "playerBoard": {
            "numCols": 7,
            "numRows": 6,
            "rows": [
                ["r", "r", "y", ".", ".", ".", "r"],
                ["y", "y", "y", ".", ".", ".", "."],
                ["y", "y", "y", ".", ".", ".", "."],
                ["r", ".", "r", ".", ".", ".", "."],
                [".", ".", ".", ".", ".", ".", "."],
                [".", ".", ".", ".", ".", ".", "."],
            ],
        },
        "playerRow": 0,
        "aiBoard": {
            "numCols": 7,
            "numRows": 6,
            "rows": [
                ["r", "r", "y", "y", ".", ".", "r"],
                ["y", "y", "y", ".", ".", ".", "."],
                ["y", "y", "y", ".", ".", ".", "."],
                ["r", ".", "r", ".", ".", ".", "."],
                [".", ".", ".", ".", ".", ".", "."],
                [".", ".", ".", ".", ".", ".", "."],
            ],
        },
        "aiCol": 3,
        "aiRow": 0,
    }))?)
}

/// Names every field of `actual` that differs from `expected`.
pub fn mismatches(expected: &PlayResponse, actual: &PlayResponse) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if expected.game_state != actual.game_state {
        fields.push("gameState");
    }
    if expected.player_board != actual.player_board {
        fields.push("playerBoard");
    }
    if expected.player_row != actual.player_row {
        fields.push("playerRow");
    }
    if expected.ai_board != actual.ai_board {
        fields.push("aiBoard");
    }
    if expected.ai_col != actual.ai_col {
        fields.push("aiCol");
    }
    if expected.ai_row != actual.ai_row {
        fields.push("aiRow");
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    use shared::domain::{Cell, GameState};

    #[test]
    fn expected_reply_extends_the_request_board() {
        let request = request_board().expect("request board");
        let expected = expected_reply().expect("expected reply");

        assert_eq!(expected.game_state, GameState::RedTurn);
        let mut played = request.clone();
        played.rows[0][COLUMN as usize] = Cell::Occupied(PLAYER);
        assert_eq!(expected.player_board, played);

        let (col, row, ai_board) = expected.ai_move().expect("ai move");
        assert_eq!((col, row), (3, 0));
        assert_eq!(ai_board.cell(col, row), Some(Cell::Occupied(Disc::Yellow)));
        assert_eq!(ai_board.disc_count(), request.disc_count() + 2);
    }

    #[test]
    fn mismatches_name_the_differing_fields() {
        let expected = expected_reply().expect("expected reply");
        assert!(mismatches(&expected, &expected).is_empty());

        let mut actual = expected.clone();
        actual.ai_col = Some(4);
        actual.game_state = GameState::YellowTurn;
        assert_eq!(mismatches(&expected, &actual), vec!["gameState", "aiCol"]);
    }
}
