//! Fixed-rate game loop on top of a free-running frame callback
//!
//! The driver calls [`GameLoop::on_frame`] at display rate; the loop turns
//! that into simulation ticks at the current speed and forwards every change
//! to a [`GameView`]. Player input arrives as [`Command`]s between frames.

use log::{debug, info};
use std::time::{Duration, Instant};

use super::view::GameView;
use crate::game::{CollisionType, Direction, Simulation, TickOutcome};

/// Logical player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Pause,
    /// Start, continue, or start over after a game over
    Confirm,
    Restart,
}

/// Controller-level state, separate from the simulation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fresh game that has not moved yet
    AwaitingStart,
    Running,
    /// Paused by the player
    Paused,
    /// Crashed or filled the grid; the next turn or confirm starts over
    GameOver,
}

/// Result of one frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Not running; no further frames are needed until resumed
    Stopped,
    /// Running, but the tick interval has not elapsed yet
    Waiting,
    Ticked(TickOutcome),
}

/// Time between ticks at `tick_rate` ticks per second, never zero
pub fn tick_interval(tick_rate: u32) -> Duration {
    (Duration::from_millis(1000) / tick_rate.max(1)).max(Duration::from_nanos(1))
}

pub struct GameLoop {
    simulation: Simulation,
    phase: Phase,
    last_tick: Instant,
    tick_interval: Duration,
    /// Set on game over until the banner has been cleared once
    game_over_armed: bool,
}

impl GameLoop {
    pub fn new(simulation: Simulation) -> Self {
        let tick_interval = tick_interval(simulation.tick_rate());
        Self {
            simulation,
            phase: Phase::AwaitingStart,
            last_tick: Instant::now(),
            tick_interval,
            game_over_armed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Frame callback. Ticks at most once, keeping the leftover time so the
    /// tick rate does not drift with the frame rate.
    pub fn on_frame(&mut self, now: Instant, view: &mut impl GameView) -> Frame {
        if !self.is_running() {
            return Frame::Stopped;
        }

        let elapsed = now.saturating_duration_since(self.last_tick);
        if elapsed < self.tick_interval {
            return Frame::Waiting;
        }

        let remainder = elapsed.as_nanos() % self.tick_interval.as_nanos();
        self.last_tick = now - Duration::from_nanos(remainder as u64);

        let outcome = self.simulation.tick();
        self.sync_tick_interval();

        let state = self.simulation.state();
        view.show_score(state.score);
        view.render(state);

        match outcome {
            TickOutcome::Crashed { cause, final_score } => {
                self.on_crash(final_score, Some(cause), view)
            }
            TickOutcome::Won { final_score } => self.on_crash(final_score, None, view),
            _ => {}
        }

        Frame::Ticked(outcome)
    }

    /// Stop ticking. Idempotent.
    pub fn pause(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Paused;
        self.simulation.pause();
        info!("Paused at score {}", self.simulation.state().score);
    }

    /// Start or continue ticking, starting over first if the game ended.
    ///
    /// Only time that passes after this call counts toward the next tick.
    pub fn resume(&mut self, now: Instant, view: &mut impl GameView) {
        if self.is_running() {
            return;
        }

        if self.simulation.is_over() {
            self.reset_simulation(view);
        }
        if self.game_over_armed {
            self.game_over_armed = false;
            view.clear_game_over();
        }

        self.simulation.start();
        self.phase = Phase::Running;
        self.last_tick = now;
        info!("Running at {} ticks/s", self.simulation.tick_rate());
    }

    fn on_crash(
        &mut self,
        final_score: u32,
        cause: Option<CollisionType>,
        view: &mut impl GameView,
    ) {
        self.phase = Phase::GameOver;
        self.game_over_armed = true;
        view.show_game_over(final_score, cause);
        info!("Game over ({:?}), final score {}", cause, final_score);
    }

    /// Throw the current game away and wait for the player to start again
    pub fn restart(&mut self, view: &mut impl GameView) {
        self.reset_simulation(view);
        if self.game_over_armed {
            self.game_over_armed = false;
            view.clear_game_over();
        }
        self.phase = Phase::AwaitingStart;
    }

    fn reset_simulation(&mut self, view: &mut impl GameView) {
        self.simulation.reset();
        self.sync_tick_interval();

        let state = self.simulation.state();
        view.show_score(state.score);
        view.render(state);
    }

    fn sync_tick_interval(&mut self) {
        let interval = tick_interval(self.simulation.tick_rate());
        if interval != self.tick_interval {
            debug!("Tick interval now {:?}", interval);
            self.tick_interval = interval;
        }
    }

    /// Apply one player command.
    ///
    /// Escape-style pauses are only lifted by `Confirm`; a turn starts the game
    /// only when it has not been started yet or has ended.
    pub fn handle(&mut self, command: Command, now: Instant, view: &mut impl GameView) {
        match command {
            Command::Turn(direction) => match self.phase {
                Phase::Running | Phase::Paused => {
                    self.simulation.request_direction(direction);
                }
                Phase::AwaitingStart => {
                    self.simulation.request_direction(direction);
                    self.resume(now, view);
                }
                Phase::GameOver => {
                    self.resume(now, view);
                    self.simulation.request_direction(direction);
                }
            },
            Command::Pause => self.pause(),
            Command::Confirm => self.resume(now, view),
            Command::Restart => self.restart(view),
        }
    }

    #[cfg(test)]
    pub(crate) fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }
}
