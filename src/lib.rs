//! Grid Snake - a terminal Snake game driven by a fixed-rate game loop
//!
//! This library provides:
//! - Core simulation: movement, growth, collisions, food, speed (game module)
//! - The game loop controller turning display frames into ticks (controller module)
//! - Key mapping (input module) and TUI rendering (render module)
//! - The interactive terminal driver (modes module)

pub mod controller;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
