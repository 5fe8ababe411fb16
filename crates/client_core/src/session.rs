//! The game-interaction state machine.
//!
//! [`GameSession`] owns the mirrored board and turn state and decides what the
//! outside world must do next. It performs no I/O: every operation returns the
//! [`Effect`]s (requests to send, discs to drop, messages to show) that the
//! caller executes, and completions are fed back in as further calls. An
//! opponent disc embedded in a reply is only emitted once the completion for
//! the player's own disc arrives.

use std::time::{Duration, Instant};

use shared::{
    domain::{Board, Disc, GameState, Player, Role},
    protocol::{GameRequest, PlayResponse, RecommendResponse},
};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ErrorClass};

pub const MIN_INPUT_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForInput,
    RequestInFlight,
    AnimatingResult,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(GameRequest),
    /// Remove every placed disc and hide the status message.
    ClearBoard,
    DropDisc {
        id: AnimationId,
        player: Player,
        col: usize,
        row: usize,
        duration: Duration,
    },
    ShowMessage(String),
    /// Blocking, user-visible error.
    Alert(String),
    MoveIndicator(usize),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub human: Player,
    pub ai: Player,
    pub human_first: bool,
    pub swap_on_reset: bool,
    pub min_input_interval: Duration,
    /// Time a disc takes to fall one cell.
    pub drop_step: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            human: Player::new(Role::Human, Disc::Yellow, "#fff700"),
            ai: Player::new(Role::Ai, Disc::Red, "#e33333"),
            human_first: true,
            swap_on_reset: true,
            min_input_interval: MIN_INPUT_INTERVAL,
            drop_step: Duration::from_millis(25),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveReply {
    Play(PlayResponse),
    Recommend(RecommendResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub game_state: GameState,
    pub board: Board,
    pub first_mover: Role,
    pub player_is_waiting: bool,
}

#[derive(Debug, Clone, Copy)]
enum PendingMove {
    Human { column: usize },
    Ai,
}

/// Opponent disc waiting for the current animation to finish.
#[derive(Debug)]
struct ChainedDrop {
    col: usize,
    row: usize,
    board: Board,
}

#[derive(Debug)]
pub struct GameSession {
    options: SessionOptions,
    board: Board,
    game_state: GameState,
    phase: Phase,
    first_mover: Role,
    last_accepted_click: Option<Instant>,
    in_flight: Option<PendingMove>,
    animating: Option<AnimationId>,
    chained: Option<ChainedDrop>,
    next_animation: u64,
}

impl GameSession {
    pub fn new(options: SessionOptions) -> Self {
        let first_mover = if options.human_first {
            Role::Human
        } else {
            Role::Ai
        };
        let opener = match first_mover {
            Role::Human => options.human.disc,
            Role::Ai => options.ai.disc,
        };
        Self {
            options,
            board: Board::default(),
            game_state: GameState::turn_of(opener),
            phase: Phase::WaitingForInput,
            first_mover,
            last_accepted_click: None,
            in_flight: None,
            animating: None,
            chained: None,
            next_animation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn first_mover(&self) -> Role {
        self.first_mover
    }

    pub fn player(&self, role: Role) -> &Player {
        match role {
            Role::Human => &self.options.human,
            Role::Ai => &self.options.ai,
        }
    }

    /// True while a request or the animation that depends on it is outstanding.
    pub fn player_is_waiting(&self) -> bool {
        matches!(self.phase, Phase::RequestInFlight | Phase::AnimatingResult)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            game_state: self.game_state,
            board: self.board.clone(),
            first_mover: self.first_mover,
            player_is_waiting: self.player_is_waiting(),
        }
    }

    /// Begins the first game. The AI opens immediately when it moves first.
    pub fn start(&mut self) -> Vec<Effect> {
        self.reset(false)
    }

    /// The "New Game" action. Dropped while a round trip is outstanding.
    pub fn new_game(&mut self) -> Vec<Effect> {
        if self.player_is_waiting() {
            debug!(phase = ?self.phase, "new game ignored while waiting on the server");
            return Vec::new();
        }
        self.reset(self.options.swap_on_reset)
    }

    /// A click on the board. Any click on a finished game starts a new one, and
    /// a click while the AI is still owed a move asks for it again.
    pub fn click(&mut self, column: i64, now: Instant) -> Vec<Effect> {
        if self.column_index(column).is_none() {
            return Vec::new();
        }
        if self.phase == Phase::GameOver {
            self.last_accepted_click = Some(now);
            return self.reset(self.options.swap_on_reset);
        }
        if self.phase == Phase::WaitingForInput
            && self.game_state == GameState::turn_of(self.options.ai.disc)
        {
            debug!(column, "click retries the outstanding ai move");
            self.last_accepted_click = Some(now);
            return self.trigger_ai_move();
        }
        self.submit_column(column, now)
    }

    pub fn hover(&mut self, column: i64) -> Vec<Effect> {
        if self.player_is_waiting() {
            return Vec::new();
        }
        let last = self.board.num_cols.saturating_sub(1) as i64;
        vec![Effect::MoveIndicator(column.clamp(0, last) as usize)]
    }

    /// Plays `column` for the human. Input that doesn't meet the preconditions is dropped.
    pub fn submit_column(&mut self, column: i64, now: Instant) -> Vec<Effect> {
        if self.phase != Phase::WaitingForInput {
            debug!(phase = ?self.phase, column, "click dropped");
            return Vec::new();
        }
        if self.game_state != GameState::turn_of(self.options.human.disc) {
            debug!(state = ?self.game_state, column, "click dropped, not the human's turn");
            return Vec::new();
        }
        let Some(index) = self.column_index(column) else {
            debug!(column, "click dropped, column off the board");
            return Vec::new();
        };
        if let Some(last) = self.last_accepted_click {
            if now.saturating_duration_since(last) < self.options.min_input_interval {
                debug!(column, "click dropped, inside the debounce interval");
                return Vec::new();
            }
        }

        self.last_accepted_click = Some(now);
        self.phase = Phase::RequestInFlight;
        self.in_flight = Some(PendingMove::Human { column: index });
        debug!(column, "submitting move");
        vec![Effect::Send(GameRequest::Next {
            current_player: self.options.human.disc,
            board: self.board.clone(),
            column,
        })]
    }

    /// Asks the server to move for the AI. Only used when the AI opens.
    pub fn trigger_ai_move(&mut self) -> Vec<Effect> {
        if self.player_is_waiting() {
            debug!(phase = ?self.phase, "ai move already outstanding");
            return Vec::new();
        }
        self.phase = Phase::RequestInFlight;
        self.in_flight = Some(PendingMove::Ai);
        debug!("requesting ai move");
        vec![Effect::Send(GameRequest::Recommend {
            current_player: self.options.ai.disc,
            board: self.board.clone(),
        })]
    }

    pub fn on_reply(&mut self, reply: Result<MoveReply, ClientError>) -> Vec<Effect> {
        let Some(pending) = self.in_flight.take() else {
            warn!(phase = ?self.phase, "reply arrived with no request outstanding");
            return Vec::new();
        };

        match (pending, reply) {
            (PendingMove::Human { column }, Ok(MoveReply::Play(response))) => {
                self.apply_play(column, response)
            }
            (PendingMove::Ai, Ok(MoveReply::Recommend(response))) => {
                self.apply_recommend(response)
            }
            (pending, Ok(_)) => self.fail(
                pending,
                ClientError::Unexpected("reply does not match the request".into()),
            ),
            (pending, Err(err)) => self.fail(pending, err),
        }
    }

    pub fn on_animation_complete(&mut self, id: AnimationId) -> Vec<Effect> {
        if self.animating != Some(id) {
            debug!(?id, "stale animation completion ignored");
            return Vec::new();
        }
        self.animating = None;

        if let Some(chained) = self.chained.take() {
            self.board = chained.board;
            let ai = self.options.ai.clone();
            let mut effects = vec![self.drop_disc(ai, chained.col, chained.row)];
            effects.extend(self.outcome_message());
            return effects;
        }

        self.phase = if self.game_state.is_terminal() {
            info!(state = ?self.game_state, "game over");
            Phase::GameOver
        } else {
            Phase::WaitingForInput
        };
        Vec::new()
    }

    fn reset(&mut self, swap: bool) -> Vec<Effect> {
        if swap {
            self.first_mover = self.first_mover.other();
        }
        self.board = Board::default();
        self.game_state = GameState::turn_of(self.player(self.first_mover).disc);
        self.phase = Phase::WaitingForInput;
        self.in_flight = None;
        self.animating = None;
        self.chained = None;
        info!(first_mover = ?self.first_mover, "new game");

        let mut effects = vec![Effect::ClearBoard];
        if self.first_mover == Role::Ai {
            effects.extend(self.trigger_ai_move());
        }
        effects
    }

    fn apply_play(&mut self, column: usize, response: PlayResponse) -> Vec<Effect> {
        let human = self.options.human.clone();
        let human_won = response.game_state.winner() == Some(human.disc);
        let chained = match response.ai_move() {
            Some((col, row, board)) if !human_won => Some(ChainedDrop {
                col,
                row,
                board: board.clone(),
            }),
            _ => None,
        };
        if chained.is_none() && !response.game_state.is_terminal() {
            return self.fail(
                PendingMove::Human { column },
                ClientError::Unexpected("ongoing game without an opponent move".into()),
            );
        }

        self.board = response.player_board;
        self.game_state = response.game_state;
        self.phase = Phase::AnimatingResult;
        self.chained = chained;
        debug!(column, row = response.player_row, state = ?self.game_state, "move accepted");

        let mut effects = vec![self.drop_disc(human, column, response.player_row)];
        if self.chained.is_none() {
            effects.extend(self.outcome_message());
        }
        effects
    }

    fn apply_recommend(&mut self, response: RecommendResponse) -> Vec<Effect> {
        self.board = response.board;
        self.game_state = response.game_state;
        self.phase = Phase::AnimatingResult;
        debug!(
            column = response.recommend_column,
            row = response.recommend_row,
            state = ?self.game_state,
            "ai opened"
        );

        let ai = self.options.ai.clone();
        let mut effects = vec![self.drop_disc(ai, response.recommend_column, response.recommend_row)];
        effects.extend(self.outcome_message());
        effects
    }

    fn fail(&mut self, pending: PendingMove, err: ClientError) -> Vec<Effect> {
        self.phase = Phase::WaitingForInput;
        match err.class() {
            ErrorClass::InputRejected => {
                debug!(error = %err, "move rejected by server");
                Vec::new()
            }
            ErrorClass::Application => {
                let code = err
                    .exception_code()
                    .map(|code| code.to_string())
                    .unwrap_or_default();
                warn!(%code, "server refused the move");
                let text = match pending {
                    PendingMove::Human { column } => {
                        format!("Could not play column {column} because: {code}")
                    }
                    PendingMove::Ai => format!("Could not get the bot's move because: {code}"),
                };
                vec![Effect::Alert(text)]
            }
            ErrorClass::Transport => {
                warn!(error = %err, "move request failed");
                vec![Effect::Alert(format!("Request failed: {err}"))]
            }
        }
    }

    fn drop_disc(&mut self, player: Player, col: usize, row: usize) -> Effect {
        let id = AnimationId(self.next_animation);
        self.next_animation += 1;
        self.animating = Some(id);
        let cells = self.board.num_rows.saturating_sub(row) as u32;
        Effect::DropDisc {
            id,
            player,
            col,
            row,
            duration: self.options.drop_step * cells,
        }
    }

    fn outcome_message(&self) -> Option<Effect> {
        let text = match self.game_state {
            GameState::Draw => "It's a draw!",
            state => match state.winner() {
                Some(disc) if disc == self.options.human.disc => "You won!",
                Some(_) => "The bot won!",
                None => return None,
            },
        };
        info!(outcome = text, "game finished");
        Some(Effect::ShowMessage(text.to_string()))
    }

    fn column_index(&self, column: i64) -> Option<usize> {
        usize::try_from(column)
            .ok()
            .filter(|col| *col < self.board.num_cols)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
