use crate::game::{CollisionType, GameState};

/// Everything the game loop shows to the player.
///
/// Implementations must not feed anything back into the simulation; they only
/// observe it.
pub trait GameView {
    /// Draw the current state. Called after every accepted tick and after
    /// every reset.
    fn render(&mut self, state: &GameState);

    /// Latest score, after every accepted tick.
    fn show_score(&mut self, score: u32);

    /// The game ended. `cause` is `None` when the snake filled the grid.
    fn show_game_over(&mut self, final_score: u32, cause: Option<CollisionType>);

    fn clear_game_over(&mut self);
}
