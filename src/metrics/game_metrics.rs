use std::time::{Duration, Instant};

use crate::controller::Phase;

/// In-session statistics. Nothing here outlives the process.
pub struct GameMetrics {
    /// Set while the current game is running
    running_since: Option<Instant>,
    /// Play time banked before the last pause
    banked: Duration,
    pub high_score: u32,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            banked: Duration::ZERO,
            high_score: 0,
            games_played: 0,
        }
    }

    /// Time spent running in the current game, pauses excluded
    pub fn elapsed(&self, now: Instant) -> Duration {
        let live = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        self.banked + live
    }

    /// Follow a controller phase change
    pub fn on_phase_change(&mut self, from: Phase, to: Phase, score: u32, now: Instant) {
        if from == to {
            return;
        }

        if from == Phase::Running {
            self.stop_clock(now);
        }

        match to {
            Phase::Running => {
                if matches!(from, Phase::AwaitingStart | Phase::GameOver) {
                    self.banked = Duration::ZERO;
                }
                self.running_since = Some(now);
            }
            Phase::GameOver => self.on_game_over(score),
            Phase::AwaitingStart => self.banked = Duration::ZERO,
            Phase::Paused => {}
        }
    }

    fn stop_clock(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.banked += now.saturating_duration_since(since);
        }
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    pub fn format_time(&self, now: Instant) -> String {
        let total_secs = self.elapsed(now).as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
