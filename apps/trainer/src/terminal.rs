use std::time::Duration;

use client_core::{Phase, RenderAdapter, SessionSnapshot};
use shared::domain::{Player, Role, NUM_COLS};

/// Draws the session as text on stdout.
#[derive(Default)]
pub struct TerminalRenderer {
    last_phase: Option<Phase>,
}

impl TerminalRenderer {
    fn print_board(snapshot: &SessionSnapshot) {
        let numbers: String = (1..=snapshot.board.num_cols).map(|n| n.to_string()).collect();
        println!();
        println!("{}", snapshot.board);
        println!("{numbers}");
    }
}

impl RenderAdapter for TerminalRenderer {
    fn clear_board(&mut self) {
        println!("--- new game ---");
    }

    fn drop_disc(&mut self, player: &Player, col: usize, row: usize, _duration: Duration) {
        let who = match player.role {
            Role::Human => "You",
            Role::Ai => "Bot",
        };
        println!("{who} ({}) -> column {}, row {}", player.disc, col + 1, row + 1);
    }

    fn show_message(&mut self, text: &str) {
        println!("*** {text} ***");
    }

    fn alert(&mut self, text: &str) {
        eprintln!("! {text}");
    }

    fn move_indicator(&mut self, col: usize) {
        let marker: String = (0..NUM_COLS)
            .map(|c| if c == col { 'v' } else { ' ' })
            .collect();
        println!("{marker}");
    }

    fn session_changed(&mut self, snapshot: &SessionSnapshot) {
        let entered = self.last_phase != Some(snapshot.phase);
        self.last_phase = Some(snapshot.phase);
        if !entered {
            return;
        }
        match snapshot.phase {
            Phase::WaitingForInput => {
                Self::print_board(snapshot);
                println!("Your move: 1-{} | h <col> to aim | n new game | q quit", snapshot.board.num_cols);
            }
            Phase::GameOver => {
                Self::print_board(snapshot);
                println!("Press enter to play again, q to quit.");
            }
            _ => {}
        }
    }
}
