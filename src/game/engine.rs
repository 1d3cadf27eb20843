use log::{debug, info};
use rand::{rngs::StdRng, seq::IteratorRandom, Rng, SeedableRng};

use super::{
    config::{GameConfig, SPEEDUP_THRESHOLD, SPEED_INCREMENT},
    direction::Direction,
    state::{CollisionType, GameState, Lifecycle, Position, Snake},
};

/// Random draws tried before falling back to scanning every free cell
const FOOD_SAMPLE_ATTEMPTS: usize = 64;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The simulation was not running; nothing changed
    Idle,
    /// The snake moved without eating
    Moved,
    /// The snake ate and grew by one segment
    Ate { score: u32, sped_up: bool },
    /// The snake hit a wall or itself; the body was left untouched
    Crashed {
        cause: CollisionType,
        final_score: u32,
    },
    /// The snake ate the last free cell
    Won { final_score: u32 },
}

/// The snake simulation: owns the state and the food RNG
pub struct Simulation {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
}

impl Simulation {
    /// Create a simulation seeded from the OS and reset it
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a simulation with reproducible food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let center = Self::center(&config);
        let mut state = GameState::new(
            Snake::new(center, Direction::Right, 1),
            config.grid_width,
            config.grid_height,
            config.starting_tick_rate,
        );
        state.lifecycle = Lifecycle::Initializing;

        let mut simulation = Self { config, state, rng };
        simulation.reset();
        simulation
    }

    fn center(config: &GameConfig) -> Position {
        Position::new(
            (config.grid_width / 2) as i32,
            (config.grid_height / 2) as i32,
        )
    }

    /// Start a fresh, paused game with a single segment at the grid center
    pub fn reset(&mut self) {
        let snake = Snake::new(Self::center(&self.config), Direction::Right, 1);

        self.state = GameState::new(
            snake,
            self.config.grid_width,
            self.config.grid_height,
            self.config.starting_tick_rate.max(1),
        );
        self.set_food();

        info!(
            "New game on {}x{} grid at {} ticks/s, food at {:?}",
            self.state.grid_width, self.state.grid_height, self.state.tick_rate, self.state.food
        );
    }

    /// Queue a turn for the next tick.
    ///
    /// Reversals are refused once the snake is longer than its head and free
    /// turning has been withdrawn. Returns whether the request was accepted.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        let state = &mut self.state;
        let restricted = !state.free_turning && state.snake.len() > 1;

        if restricted && state.snake.direction.is_opposite(direction) {
            debug!(
                "Ignored reversal from {:?} to {:?}",
                state.snake.direction, direction
            );
            return false;
        }

        state.pending_direction = direction;
        true
    }

    /// Advance by one step. No-op unless running.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.lifecycle != Lifecycle::Running {
            return TickOutcome::Idle;
        }

        let state = &mut self.state;
        state.snake.direction = state.pending_direction;
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if let Some(cause) = Self::check_collision(state, new_head) {
            state.lifecycle = Lifecycle::Crashed(cause);
            match cause {
                CollisionType::Wall => info!("Hit a wall at {:?}", new_head),
                CollisionType::SelfCollision => info!("Hit the snake's body at {:?}", new_head),
            }
            info!("Game over with {} points", state.score);
            return TickOutcome::Crashed {
                cause,
                final_score: state.score,
            };
        }

        state.snake.push_head(new_head);
        state.steps += 1;

        if state.food != Some(new_head) {
            state.snake.drop_tail();
            return TickOutcome::Moved;
        }

        state.score += 1;
        let sped_up = state.score % SPEEDUP_THRESHOLD == 0;
        if sped_up {
            state.tick_rate += SPEED_INCREMENT;
            debug!("Speed up to {} ticks/s", state.tick_rate);
        }
        state.free_turning = state.snake.len() == 1;
        let score = state.score;
        debug!("Ate food at {:?}, score {}", new_head, score);

        if self.set_food().is_none() {
            self.state.lifecycle = Lifecycle::Won;
            info!("Board filled with {} points", score);
            return TickOutcome::Won { final_score: score };
        }

        TickOutcome::Ate { score, sped_up }
    }

    /// Check if the new head position causes a collision
    fn check_collision(state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Place food on a uniformly random free cell; `None` when the grid is full
    fn set_food(&mut self) -> Option<Position> {
        self.state.food = spawn_food(&mut self.rng, &self.state);
        self.state.food
    }

    /// Begin or continue advancing. Has no effect on a finished game.
    pub fn start(&mut self) {
        if self.state.lifecycle == Lifecycle::Paused {
            self.state.lifecycle = Lifecycle::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state.lifecycle == Lifecycle::Running {
            self.state.lifecycle = Lifecycle::Paused;
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    pub fn tick_rate(&self) -> u32 {
        self.state.tick_rate
    }

    pub fn is_over(&self) -> bool {
        self.state.lifecycle.is_over()
    }
}

fn spawn_food(rng: &mut impl Rng, state: &GameState) -> Option<Position> {
    if state.free_cells() == 0 {
        return None;
    }

    for _ in 0..FOOD_SAMPLE_ATTEMPTS {
        let x = rng.gen_range(0..state.grid_width) as i32;
        let y = rng.gen_range(0..state.grid_height) as i32;
        let pos = Position::new(x, y);

        if !state.is_occupied_by_snake(pos) {
            return Some(pos);
        }
    }

    // Crowded board: pick uniformly among what is left
    (0..state.grid_height as i32)
        .flat_map(|y| (0..state.grid_width as i32).map(move |x| Position::new(x, y)))
        .filter(|pos| !state.is_occupied_by_snake(*pos))
        .choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(config: GameConfig) -> Simulation {
        let mut sim = Simulation::with_seed(config, 7);
        sim.start();
        sim
    }

    fn place(sim: &mut Simulation, segments: Vec<Position>, direction: Direction) {
        let state = sim.state_mut();
        state.snake = Snake::from_segments(segments, direction).unwrap();
        state.pending_direction = direction;
    }

    #[test]
    fn test_reset() {
        let sim = Simulation::with_seed(GameConfig::default(), 1);
        let state = sim.state();

        assert_eq!(state.lifecycle, Lifecycle::Paused);
        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert_eq!(state.tick_rate, 7);
        assert!(state.free_turning);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.head(), Position::new(10, 10));

        let food = state.food.unwrap();
        assert!(state.is_in_bounds(food));
        assert!(!state.is_occupied_by_snake(food));
    }

    #[test]
    fn test_tick_is_noop_unless_running() {
        let mut sim = Simulation::with_seed(GameConfig::small(), 3);
        let before = sim.state().clone();

        assert_eq!(sim.tick(), TickOutcome::Idle);
        assert_eq!(sim.state(), &before);

        sim.start();
        sim.pause();
        assert_eq!(sim.tick(), TickOutcome::Idle);
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_basic_movement() {
        let mut sim = running(GameConfig::small());
        sim.state_mut().food = Some(Position::new(0, 0));
        let initial_head = sim.state().snake.head();

        assert_eq!(sim.tick(), TickOutcome::Moved);

        assert_eq!(sim.state().steps, 1);
        assert_eq!(sim.state().snake.len(), 1);
        assert_eq!(sim.state().snake.head(), initial_head.moved_by(1, 0));
    }

    #[test]
    fn test_eating_food_from_start() {
        let mut sim = running(GameConfig::default());
        sim.state_mut().food = Some(Position::new(11, 10));

        let outcome = sim.tick();

        assert_eq!(outcome, TickOutcome::Ate { score: 1, sped_up: false });
        let state = sim.state();
        assert_eq!(state.snake.head(), Position::new(11, 10));
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.score, 1);
        assert!(!state.free_turning);
        let food = state.food.unwrap();
        assert!(!state.is_occupied_by_snake(food));
    }

    #[test]
    fn test_wall_collision_freezes_state() {
        let mut sim = running(GameConfig::new(20));
        place(
            &mut sim,
            vec![Position::new(0, 5), Position::new(1, 5)],
            Direction::Left,
        );
        sim.state_mut().score = 3;
        let body_before = sim.state().snake.clone();

        let outcome = sim.tick();

        assert_eq!(
            outcome,
            TickOutcome::Crashed {
                cause: CollisionType::Wall,
                final_score: 3
            }
        );
        assert_eq!(sim.lifecycle(), Lifecycle::Crashed(CollisionType::Wall));
        assert_eq!(sim.state().score, 3);
        assert_eq!(sim.state().snake, body_before);

        // Stays crashed until reset
        assert_eq!(sim.tick(), TickOutcome::Idle);
        sim.start();
        assert!(sim.is_over());
    }

    #[test]
    fn test_self_collision() {
        let mut sim = running(GameConfig::small());
        sim.state_mut().food = Some(Position::new(9, 9));
        sim.state_mut().free_turning = false;
        place(
            &mut sim,
            Snake::new(Position::new(5, 5), Direction::Right, 5)
                .segments()
                .copied()
                .collect(),
            Direction::Right,
        );

        // Right, down, left, then up into its own body
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert!(sim.request_direction(Direction::Down));
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert!(sim.request_direction(Direction::Left));
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert!(sim.request_direction(Direction::Up));

        assert_eq!(
            sim.tick(),
            TickOutcome::Crashed {
                cause: CollisionType::SelfCollision,
                final_score: 0
            }
        );
    }

    #[test]
    fn test_reversal_rejected_when_long() {
        let mut sim = running(GameConfig::default());
        place(
            &mut sim,
            Snake::new(Position::new(10, 10), Direction::Right, 3)
                .segments()
                .copied()
                .collect(),
            Direction::Right,
        );
        sim.state_mut().free_turning = false;

        assert!(!sim.request_direction(Direction::Left));
        assert_eq!(sim.state().pending_direction, Direction::Right);

        assert!(sim.request_direction(Direction::Up));
        assert_eq!(sim.state().pending_direction, Direction::Up);
    }

    #[test]
    fn test_reversal_checked_against_applied_direction() {
        let mut sim = running(GameConfig::default());
        place(
            &mut sim,
            Snake::new(Position::new(10, 10), Direction::Right, 3)
                .segments()
                .copied()
                .collect(),
            Direction::Right,
        );
        sim.state_mut().free_turning = false;

        // Up then left within one tick must not sneak a reversal through
        assert!(sim.request_direction(Direction::Up));
        assert!(!sim.request_direction(Direction::Left));
        assert_eq!(sim.state().pending_direction, Direction::Up);
    }

    #[test]
    fn test_any_direction_with_single_segment_or_free_turning() {
        let mut sim = running(GameConfig::default());
        assert!(sim.request_direction(Direction::Left));
        assert_eq!(sim.state().pending_direction, Direction::Left);

        place(
            &mut sim,
            Snake::new(Position::new(10, 10), Direction::Right, 3)
                .segments()
                .copied()
                .collect(),
            Direction::Right,
        );
        sim.state_mut().free_turning = true;
        assert!(sim.request_direction(Direction::Left));
    }

    #[test]
    fn test_speed_up_every_five_points() {
        let mut sim = running(GameConfig::new(30));
        sim.state_mut().score = 4;
        let head = sim.state().snake.head();
        sim.state_mut().food = Some(head.moved_by(1, 0));

        assert_eq!(sim.tick(), TickOutcome::Ate { score: 5, sped_up: true });
        assert_eq!(sim.tick_rate(), 8);

        let head = sim.state().snake.head();
        sim.state_mut().food = Some(head.moved_by(1, 0));
        assert_eq!(sim.tick(), TickOutcome::Ate { score: 6, sped_up: false });
        assert_eq!(sim.tick_rate(), 8);
    }

    #[test]
    fn test_growth_and_length_preservation() {
        let mut sim = running(GameConfig::new(30));
        for _ in 0..4 {
            let head = sim.state().snake.head();
            sim.state_mut().food = Some(head.moved_by(1, 0));
            let len = sim.state().snake.len();
            assert!(matches!(sim.tick(), TickOutcome::Ate { .. }));
            assert_eq!(sim.state().snake.len(), len + 1);
        }

        sim.state_mut().food = Some(Position::new(0, 0));
        let len = sim.state().snake.len();
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert_eq!(sim.state().snake.len(), len);

        let head = sim.state().snake.head();
        assert_eq!(sim.state().snake.segments().filter(|p| **p == head).count(), 1);
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut sim = Simulation::with_seed(GameConfig::small(), 11);
        place(
            &mut sim,
            Snake::new(Position::new(9, 9), Direction::Right, 10)
                .segments()
                .copied()
                .collect(),
            Direction::Right,
        );
        for _ in 0..200 {
            let food = sim.set_food().unwrap();
            assert!(!sim.state().is_occupied_by_snake(food));
            assert!(sim.state().is_in_bounds(food));
        }
    }

    #[test]
    fn test_crowded_board_finds_last_cell() {
        let mut sim = Simulation::with_seed(GameConfig::new(3), 5);
        // Every cell but (2, 2)
        let segments = vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(0, 2),
            Position::new(1, 2),
        ];
        place(&mut sim, segments, Direction::Left);

        assert_eq!(sim.set_food(), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_filling_the_grid_wins() {
        let mut sim = running(GameConfig::new(2));
        place(
            &mut sim,
            vec![Position::new(0, 1), Position::new(0, 0), Position::new(1, 0)],
            Direction::Right,
        );
        sim.state_mut().free_turning = false;
        sim.state_mut().food = Some(Position::new(1, 1));
        sim.state_mut().score = 2;

        assert_eq!(sim.tick(), TickOutcome::Won { final_score: 3 });
        assert_eq!(sim.lifecycle(), Lifecycle::Won);
        assert_eq!(sim.state().food, None);
        assert_eq!(sim.state().snake.len(), 4);
        assert_eq!(sim.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_reset_after_crash() {
        let mut sim = running(GameConfig::small());
        place(&mut sim, vec![Position::new(9, 0)], Direction::Right);
        assert!(matches!(sim.tick(), TickOutcome::Crashed { .. }));

        sim.reset();
        assert_eq!(sim.lifecycle(), Lifecycle::Paused);
        assert_eq!(sim.state().snake.head(), Position::new(5, 5));
        assert_eq!(sim.state().score, 0);
    }
}
