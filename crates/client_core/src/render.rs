//! Seam between the session and whatever draws the board.

use std::time::Duration;

use shared::domain::Player;

use crate::session::SessionSnapshot;

pub trait RenderAdapter: Send {
    /// Removes all placed discs and any status message.
    fn clear_board(&mut self);

    /// Starts a disc falling into `col` to land on `row` (0 = bottom). The
    /// controller reports completion after `duration`.
    fn drop_disc(&mut self, player: &Player, col: usize, row: usize, duration: Duration);

    fn show_message(&mut self, text: &str);

    fn alert(&mut self, text: &str);

    fn move_indicator(&mut self, _col: usize) {}

    fn session_changed(&mut self, _snapshot: &SessionSnapshot) {}
}
