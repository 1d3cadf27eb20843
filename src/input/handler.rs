use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::controller::Command;
use crate::game::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Game(Command),
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Key releases and repeats carry no intent
        if key.kind != KeyEventKind::Press {
            return KeyAction::None;
        }

        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => turn(Direction::Up),
            KeyCode::Down => turn(Direction::Down),
            KeyCode::Left => turn(Direction::Left),
            KeyCode::Right => turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => turn(Direction::Right),

            // Controls
            KeyCode::Esc => KeyAction::Game(Command::Pause),
            KeyCode::Enter | KeyCode::Char(' ') => KeyAction::Game(Command::Confirm),
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Game(Command::Restart),
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }
}

fn turn(direction: Direction) -> KeyAction {
    KeyAction::Game(Command::Turn(direction))
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
