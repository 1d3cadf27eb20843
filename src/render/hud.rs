use crate::controller::GameView;
use crate::game::{CollisionType, GameState};

/// Terminal-side view state fed by the game loop.
///
/// Drawing happens in the driver; the hud only records what changed and
/// whether a redraw is due.
#[derive(Debug)]
pub struct Hud {
    score: u32,
    game_over: Option<String>,
    needs_redraw: bool,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            score: 0,
            game_over: None,
            needs_redraw: true,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn game_over_message(&self) -> Option<&str> {
        self.game_over.as_deref()
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns whether a redraw was due and clears the flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl GameView for Hud {
    fn render(&mut self, _state: &GameState) {
        self.needs_redraw = true;
    }

    fn show_score(&mut self, score: u32) {
        self.score = score;
    }

    fn show_game_over(&mut self, final_score: u32, cause: Option<CollisionType>) {
        self.game_over = Some(game_over_message(final_score, cause));
        self.needs_redraw = true;
    }

    fn clear_game_over(&mut self) {
        self.game_over = None;
        self.needs_redraw = true;
    }
}

pub fn game_over_message(final_score: u32, cause: Option<CollisionType>) -> String {
    match cause {
        Some(_) => format!("You lost. You had {} points.", final_score),
        None => format!("You filled the board! You had {} points.", final_score),
    }
}
