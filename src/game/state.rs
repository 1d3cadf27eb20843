use std::collections::VecDeque;

use super::direction::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front. Never empty.
    body: VecDeque<Position>,
    /// Direction applied on the last tick
    pub direction: Direction,
}

impl Snake {
    /// Create a snake laid out in a straight line behind `head`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self { body, direction }
    }

    /// Create a snake from explicit segments, head first.
    ///
    /// Returns `None` when `segments` is empty.
    pub fn from_segments(segments: Vec<Position>, direction: Direction) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            body: segments.into(),
            direction,
        })
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    /// Check if position is occupied by any segment, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend a new head
    pub(crate) fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Drop the last segment, keeping at least the head
    pub(crate) fn drop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that ended a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Where the simulation is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed but not reset yet
    Initializing,
    /// Playable but not advancing; every game starts here
    Paused,
    Running,
    /// Terminal until the next reset
    Crashed(CollisionType),
    /// The snake filled the whole grid; terminal until the next reset
    Won,
}

impl Lifecycle {
    pub fn is_over(&self) -> bool {
        matches!(self, Lifecycle::Crashed(_) | Lifecycle::Won)
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Direction applied on the next tick
    pub pending_direction: Direction,
    /// Absent only once the grid is full
    pub food: Option<Position>,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    /// Current speed in ticks per second
    pub tick_rate: u32,
    /// Whether any turn is accepted, reversals included
    pub free_turning: bool,
    pub lifecycle: Lifecycle,
    pub steps: u32,
}

impl GameState {
    /// Create a new game state, paused, with free turning enabled and no food
    pub fn new(snake: Snake, grid_width: usize, grid_height: usize, tick_rate: u32) -> Self {
        Self {
            pending_direction: snake.direction,
            snake,
            food: None,
            grid_width,
            grid_height,
            score: 0,
            tick_rate,
            free_turning: true,
            lifecycle: Lifecycle::Paused,
            steps: 0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    pub fn free_cells(&self) -> usize {
        (self.grid_width * self.grid_height).saturating_sub(self.snake.len())
    }

    /// Heading shown to the player: the applied direction
    pub fn heading(&self) -> Direction {
        self.snake.direction
    }
}
