use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

use crate::controller::{Command, GameLoop, Phase};
use crate::game::Simulation;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Hud, Renderer};

/// Display refresh cadence that drives the frame callback (about 60 Hz)
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct HumanMode {
    game_loop: GameLoop,
    hud: Hud,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            game_loop: GameLoop::new(simulation),
            hud: Hud::new(),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            "Leaving after {} games, best score {}",
            self.metrics.games_played, self.metrics.high_score
        );
        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut frame_timer = interval(FRAME_INTERVAL);
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if self.hud.take_redraw() {
                self.draw(terminal)?;
            }

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            if self.handle_event(event) {
                                // Resumed: ask for the next frame right away
                                frame_timer.reset_immediately();
                            }
                        }
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Frame callback, only requested while the game runs
                _ = frame_timer.tick(), if self.game_loop.is_running() => {
                    self.on_frame(Instant::now());
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("Quit requested");
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let state = self.game_loop.simulation().state();
        let phase = self.game_loop.phase();
        terminal
            .draw(|frame| {
                self.renderer
                    .render(frame, state, phase, &self.hud, &self.metrics);
            })
            .context("Failed to draw frame")?;
        Ok(())
    }

    /// Returns true when the event started the game loop
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => match self.input_handler.handle_key_event(key) {
                KeyAction::Game(command) => self.apply(command, Instant::now()),
                KeyAction::Quit => {
                    self.should_quit = true;
                    false
                }
                KeyAction::None => false,
            },
            Event::Resize(_, _) => {
                self.hud.request_redraw();
                false
            }
            _ => false,
        }
    }

    fn apply(&mut self, command: Command, now: Instant) -> bool {
        let before = self.game_loop.phase();
        self.game_loop.handle(command, now, &mut self.hud);
        self.track_phase(before, now);

        // Status line depends on the phase
        self.hud.request_redraw();
        before != Phase::Running && self.game_loop.is_running()
    }

    fn on_frame(&mut self, now: Instant) {
        let before = self.game_loop.phase();
        self.game_loop.on_frame(now, &mut self.hud);
        self.track_phase(before, now);
    }

    fn track_phase(&mut self, before: Phase, now: Instant) {
        let after = self.game_loop.phase();
        let score = self.game_loop.simulation().state().score;
        self.metrics.on_phase_change(before, after, score, now);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
