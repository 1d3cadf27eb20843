use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use std::time::Instant;

use super::hud::Hud;
use crate::controller::Phase;
use crate::game::{Direction, GameState, Position};
use crate::metrics::GameMetrics;

/// Head glyph pointing the way the snake moves
pub fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲ ",
        Direction::Down => "▼ ",
        Direction::Left => "◀ ",
        Direction::Right => "▶ ",
    }
}

/// One line telling the player what the keys do right now
pub fn status_line(phase: Phase) -> &'static str {
    match phase {
        Phase::AwaitingStart => "Press an arrow key, WASD or Enter to start",
        Phase::Running => "",
        Phase::Paused => "Paused - press Enter to continue",
        Phase::GameOver => "Press a direction or Enter to play again",
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        phase: Phase,
        hud: &Hud,
        metrics: &GameMetrics,
    ) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(1), // Status
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(state, hud, metrics);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match hud.game_over_message() {
            Some(message) if phase == Phase::GameOver => {
                frame.render_widget(self.render_game_over(message), game_area);
            }
            _ => frame.render_widget(self.render_grid(state), game_area),
        }

        let status = Paragraph::new(Span::styled(
            status_line(phase),
            Style::default().fg(Color::Yellow),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(status, chunks[2]);

        frame.render_widget(self.render_controls(), chunks[3]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        head_glyph(state.heading()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.is_occupied_by_snake(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if state.food == Some(pos) {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, hud: &Hud, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Points: ", label),
            Span::styled(
                hud.score().to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}/s", state.tick_rate), value),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.snake.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(Instant::now()), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over<'a>(&self, message: &'a str) -> Paragraph<'a> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                message,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Esc", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("Enter", Style::default().fg(Color::Cyan)),
            Span::raw(" continue | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
