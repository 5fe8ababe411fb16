use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

pub const NUM_ROWS: usize = 6;
pub const NUM_COLS: usize = 7;

const EMPTY_SYMBOL: char = '.';
const COMMENT_PREFIX: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disc {
    Red,
    Yellow,
}

impl Disc {
    pub fn symbol(self) -> char {
        match self {
            Disc::Red => 'r',
            Disc::Yellow => 'y',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'r' => Some(Disc::Red),
            'y' => Some(Disc::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Disc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Serialize for Disc {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol().encode_utf8(&mut [0; 4]))
    }
}

impl<'de> Deserialize<'de> for Disc {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Disc::from_symbol(symbol)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown disc '{raw}'"))),
            _ => Err(serde::de::Error::custom(format!(
                "could not parse disc '{raw}'"
            ))),
        }
    }
}

/// A board cell. Any single character that is not a disc symbol decodes as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Disc),
}

impl Cell {
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => EMPTY_SYMBOL,
            Cell::Occupied(disc) => disc.symbol(),
        }
    }

    fn from_symbol(symbol: char) -> Self {
        Disc::from_symbol(symbol).map_or(Cell::Empty, Cell::Occupied)
    }
}

impl TryFrom<String> for Cell {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Ok(Cell::from_symbol(symbol)),
            _ => Err(BoardError::InvalidCell(value)),
        }
    }
}

impl From<Cell> for String {
    fn from(value: Cell) -> Self {
        value.symbol().to_string()
    }
}

/// Grid mirrored from the server. `rows[0]` is the bottom row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub num_cols: usize,
    pub num_rows: usize,
    pub rows: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(NUM_COLS, NUM_ROWS)
    }
}

impl Board {
    pub fn empty(num_cols: usize, num_rows: usize) -> Self {
        Self {
            num_cols,
            num_rows,
            rows: vec![vec![Cell::Empty; num_cols]; num_rows],
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|cell| *cell == Cell::Empty)
    }

    pub fn disc_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| matches!(cell, Cell::Occupied(_)))
            .count()
    }

    /// Checks that the declared dimensions match the row data and that every
    /// disc rests on the bottom or on another disc.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.rows.len() != self.num_rows {
            return Err(BoardError::RowCount {
                expected: self.num_rows,
                actual: self.rows.len(),
            });
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.num_cols {
                return Err(BoardError::ColumnCount {
                    row: index,
                    expected: self.num_cols,
                    actual: row.len(),
                });
            }
        }
        for col in 0..self.num_cols {
            let mut gap = false;
            for (row, cells) in self.rows.iter().enumerate() {
                match cells[col] {
                    Cell::Empty => gap = true,
                    Cell::Occupied(_) if gap => return Err(BoardError::Floating { col, row }),
                    Cell::Occupied(_) => {}
                }
            }
        }
        Ok(())
    }
}

/// Text form: optional `<numCols> <numRows>` header, then one line per row, top row first.
/// Lines starting with `#` are comments.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().rev().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
            .collect();

        let header = lines.first().and_then(|line| {
            let mut parts = line.split_whitespace();
            let cols = parts.next()?.parse::<usize>().ok()?;
            let rows = parts.next()?.parse::<usize>().ok()?;
            parts.next().is_none().then_some((cols, rows))
        });
        if header.is_some() {
            lines.remove(0);
        }

        if lines.is_empty() {
            return Err(BoardError::Empty);
        }

        let rows: Vec<Vec<Cell>> = lines
            .iter()
            .rev()
            .map(|line| line.chars().map(Cell::from_symbol).collect())
            .collect();
        let (num_cols, num_rows) = header.unwrap_or((rows[0].len(), rows.len()));

        let board = Board {
            num_cols,
            num_rows,
            rows,
        };
        board.validate()?;
        Ok(board)
    }
}

/// Turn state as reported by the server. The ordinal is the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    RedTurn,
    YellowTurn,
    RedWon,
    YellowWon,
    Draw,
}

impl GameState {
    pub fn turn_of(disc: Disc) -> Self {
        match disc {
            Disc::Red => GameState::RedTurn,
            Disc::Yellow => GameState::YellowTurn,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            GameState::RedTurn => 0,
            GameState::YellowTurn => 1,
            GameState::RedWon => 2,
            GameState::YellowWon => 3,
            GameState::Draw => 4,
        }
    }

    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        match ordinal {
            0 => Some(GameState::RedTurn),
            1 => Some(GameState::YellowTurn),
            2 => Some(GameState::RedWon),
            3 => Some(GameState::YellowWon),
            4 => Some(GameState::Draw),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameState::RedWon | GameState::YellowWon | GameState::Draw
        )
    }

    pub fn winner(self) -> Option<Disc> {
        match self {
            GameState::RedWon => Some(Disc::Red),
            GameState::YellowWon => Some(Disc::Yellow),
            _ => None,
        }
    }
}

impl Serialize for GameState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

// Some server builds quote the ordinal ("0"), so both forms are accepted.
impl<'de> Deserialize<'de> for GameState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let ordinal = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(text) => text.trim().parse::<u64>().map_err(|_| {
                serde::de::Error::custom(format!("invalid game state '{text}'"))
            })?,
        };
        GameState::from_ordinal(ordinal)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown game state {ordinal}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Human,
    Ai,
}

impl Role {
    pub fn other(self) -> Self {
        match self {
            Role::Human => Role::Ai,
            Role::Ai => Role::Human,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub role: Role,
    pub disc: Disc,
    pub colour: String,
}

impl Player {
    pub fn new(role: Role, disc: Disc, colour: impl Into<String>) -> Self {
        Self {
            role,
            disc,
            colour: colour.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_json_uses_server_field_names() {
        let board = Board::default();
        let json = serde_json::to_value(&board).expect("serialize");
        assert_eq!(json["numCols"], 7);
        assert_eq!(json["numRows"], 6);
        assert_eq!(json["rows"][0][0], ".");
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn unknown_single_character_cell_decodes_as_empty() {
        let cell: Cell = serde_json::from_str("\"?\"").expect("cell");
        assert_eq!(cell, Cell::Empty);
        assert!(serde_json::from_str::<Cell>("\"ry\"").is_err());
    }

    #[test]
    fn game_state_accepts_quoted_ordinal() {
        let state: GameState = serde_json::from_str("\"3\"").expect("quoted");
        assert_eq!(state, GameState::YellowWon);
        let state: GameState = serde_json::from_str("0").expect("number");
        assert_eq!(state, GameState::RedTurn);
        assert!(serde_json::from_str::<GameState>("5").is_err());
    }

    #[test]
    fn parses_text_board_bottom_row_first() {
        let text = "7 6\n.......\n.......\n.......\n...r...\n...y...\nrr.yy..\n";
        let board: Board = text.parse().expect("board");
        assert_eq!(board.cell(0, 0), Some(Cell::Occupied(Disc::Red)));
        assert_eq!(board.cell(3, 2), Some(Cell::Occupied(Disc::Red)));
        assert_eq!(board.cell(3, 5), Some(Cell::Empty));
        assert_eq!(board.disc_count(), 6);
        assert_eq!(board.to_string().lines().last(), Some("rr.yy.."));
    }

    #[test]
    fn skips_comment_lines_around_the_header() {
        let text = "# opening\n7 6\n# top\n.......\n.......\n.......\n.......\n# last move\n...y...\n...r...\n";
        let board: Board = text.parse().expect("board");
        assert_eq!((board.num_cols, board.num_rows), (7, 6));
        assert_eq!(board.cell(3, 0), Some(Cell::Occupied(Disc::Red)));
        assert_eq!(board.cell(3, 1), Some(Cell::Occupied(Disc::Yellow)));
        assert_eq!(board.disc_count(), 2);
    }

    #[test]
    fn rejects_floating_disc() {
        let text = "7 6\n...r...\n.......\n.......\n.......\n.......\n.......\n";
        let err = text.parse::<Board>().expect_err("floating");
        assert_eq!(err, BoardError::Floating { col: 3, row: 5 });

        let mut board = Board::default();
        board.rows[1][0] = Cell::Occupied(Disc::Yellow);
        assert_eq!(board.validate(), Err(BoardError::Floating { col: 0, row: 1 }));
    }

    #[test]
    fn rejects_ragged_text_board() {
        let err = "7 6\n.......\n......\n".parse::<Board>().expect_err("ragged");
        assert!(matches!(err, BoardError::RowCount { .. } | BoardError::ColumnCount { .. }));
    }

    #[test]
    fn terminal_states() {
        assert!(GameState::Draw.is_terminal());
        assert!(GameState::RedWon.is_terminal());
        assert!(!GameState::turn_of(Disc::Yellow).is_terminal());
        assert_eq!(GameState::RedWon.winner(), Some(Disc::Red));
    }
}
