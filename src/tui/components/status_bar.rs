//! # StatusBar Component
//!
//! Top bar: the Run control, the transient status message, and the
//! exit value with a colored run indicator.
//!
//! ```text
//!  ▶ Run  Finished                          Exit value: 0  Status: ●
//! └──────┘                                                         └ green while running, red when idle
//!  clickable
//! ```
//!
//! Stateless: all fields are props copied from `App` each frame.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::RunStatus;
use crate::tui::component::Component;

const RUN_LABEL: &str = " ▶ Run ";

/// Indicator color for a run status.
pub fn status_color(status: RunStatus) -> Color {
    match status {
        RunStatus::Running => Color::Green,
        RunStatus::Idle => Color::Red,
    }
}

pub struct StatusBar {
    pub status: RunStatus,
    pub exit_code: Option<i32>,
    pub status_message: String,
}

impl StatusBar {
    pub fn new(status: RunStatus, exit_code: Option<i32>, status_message: String) -> Self {
        Self {
            status,
            exit_code,
            status_message,
        }
    }

    /// Screen area of the Run control within a status bar drawn at `area`.
    pub fn run_button_area(area: Rect) -> Rect {
        let width = Span::raw(RUN_LABEL).width() as u16;
        Rect::new(area.x, area.y, width.min(area.width), area.height.min(1))
    }

    fn exit_text(&self) -> String {
        match self.exit_code {
            Some(code) => format!("Exit value: {code}  Status: "),
            None => "Exit value: -  Status: ".to_string(),
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let button_style = match self.status {
            RunStatus::Idle => Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            RunStatus::Running => Style::default()
                .fg(Color::DarkGray)
                .bg(Color::Black)
                .add_modifier(Modifier::DIM),
        };

        let right = Line::from(vec![
            Span::raw(self.exit_text()),
            Span::styled("●", Style::default().fg(status_color(self.status))),
            Span::raw(" "),
        ]);
        let right_width = right.width() as u16;

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(right_width)]).areas(area);

        let left = Line::from(vec![
            Span::styled(RUN_LABEL, button_style),
            Span::raw(" "),
            Span::raw(self.status_message.as_str()),
        ]);

        frame.render_widget(left, left_area);
        frame.render_widget(right, right_area);
    }
}
