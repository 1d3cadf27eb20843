//! Game loop controller and the view it reports to

pub mod game_loop;
pub mod view;

pub use game_loop::{tick_interval, Command, Frame, GameLoop, Phase};
pub use view::GameView;
