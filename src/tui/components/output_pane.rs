//! # OutputPane Component
//!
//! Right pane: stdout while a run streams, or stderr with diagnostic lines
//! highlighted after a failed run.
//!
//! ## Responsibilities
//!
//! - Scroll (mouse wheel, PageUp/PageDown), following new output while
//!   pinned to the bottom
//! - Select diagnostics with Up/Down and activate them with Enter
//! - Map mouse clicks to output line indices
//!
//! Rebuilt each frame around a persistent `OutputPaneState`.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::core::diagnostics::{ErrorLocation, OutputLine};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the output pane.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// A diagnostic was activated (Enter on the selection).
    Activate(ErrorLocation),
}

#[derive(Debug)]
pub struct OutputPaneState {
    /// First visible line. Unbounded: output can be any length.
    pub offset: usize,
    /// Selected line index (only ever a diagnostic line)
    pub selected: Option<usize>,
    /// When true, follow new output
    pub stick_to_bottom: bool,
    /// Content area from the last render (excludes the border)
    pub viewport: Rect,
}

impl Default for OutputPaneState {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPaneState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            selected: None,
            stick_to_bottom: true,
            viewport: Rect::default(),
        }
    }

    /// Reset for a freshly produced diagnostics view: top of the output,
    /// first diagnostic selected.
    pub fn show_diagnostics(&mut self, lines: &[OutputLine]) {
        self.offset = 0;
        self.stick_to_bottom = false;
        self.selected = lines.iter().position(|l| l.location.is_some());
        self.scroll_to_selected();
    }

    /// Output line index under a screen cell, if inside the viewport.
    pub fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        if !self.viewport.contains(Position::new(column, row)) {
            return None;
        }
        Some(self.offset + (row - self.viewport.y) as usize)
    }

    fn page_height(&self) -> usize {
        (self.viewport.height as usize).max(1)
    }

    fn max_offset(&self, line_count: usize) -> usize {
        line_count.saturating_sub(self.viewport.height as usize)
    }

    fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
        self.stick_to_bottom = false;
    }

    /// Scroll towards the end; reaching it re-pins to the bottom.
    fn scroll_down(&mut self, amount: usize, line_count: usize) {
        let max = self.max_offset(line_count);
        self.offset = self.offset.saturating_add(amount).min(max);
        if self.offset == max {
            self.stick_to_bottom = true;
        }
    }

    fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected else {
            return;
        };
        let height = self.page_height();

        if idx < self.offset {
            self.offset = idx;
            self.stick_to_bottom = false;
        } else if idx >= self.offset + height {
            self.offset = idx + 1 - height;
            self.stick_to_bottom = false;
        }
    }
}

/// Transient output view, built each frame.
pub struct OutputPane<'a> {
    pub state: &'a mut OutputPaneState,
    pub lines: &'a [OutputLine],
    pub focused: bool,
    pub title: &'a str,
}

impl<'a> OutputPane<'a> {
    pub fn new(
        state: &'a mut OutputPaneState,
        lines: &'a [OutputLine],
        focused: bool,
        title: &'a str,
    ) -> Self {
        Self {
            state,
            lines,
            focused,
            title,
        }
    }

    fn select_diagnostic(&mut self, forward: bool) {
        let lines = self.lines;
        let is_diag = |i: &usize| lines[*i].location.is_some();
        let next = match (self.state.selected, forward) {
            (Some(cur), true) => (cur + 1..lines.len()).find(is_diag),
            (Some(cur), false) => (0..cur).rev().find(is_diag),
            (None, true) => (0..lines.len()).find(is_diag),
            (None, false) => (0..lines.len()).rev().find(is_diag),
        };
        if next.is_some() {
            self.state.selected = next;
            self.state.scroll_to_selected();
        }
    }
}

fn line_style(line: &OutputLine, selected: bool) -> Style {
    let style = if line.location.is_some() {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    if selected {
        style.bg(Color::DarkGray)
    } else {
        style
    }
}

impl Component for OutputPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.state.viewport = inner;

        let total = self.lines.len();
        let height = inner.height as usize;
        let max_offset = self.state.max_offset(total);
        if self.state.stick_to_bottom || self.state.offset > max_offset {
            self.state.offset = max_offset;
        }

        // Only lines inside the viewport are built
        let first = self.state.offset;
        let last = (first + height).min(total);
        let visible: Vec<Line> = self.lines[first.min(last)..last]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let style = line_style(line, self.state.selected == Some(first + i));
                Line::styled(line.text.as_str(), style)
            })
            .collect();

        let overflow = total > height;
        let text_area = Rect {
            width: if overflow {
                inner.width.saturating_sub(1) // scrollbar column
            } else {
                inner.width
            },
            ..inner
        };
        frame.render_widget(Paragraph::new(visible), text_area);

        if overflow {
            // ScrollbarState content_length is max scrollable position, not total items
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_offset)
                .position(self.state.offset);
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                width: 1,
                ..inner
            };
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                scrollbar_area,
                &mut scrollbar_state,
            );
        }
    }
}

impl EventHandler for OutputPane<'_> {
    type Event = OutputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let line_count = self.lines.len();
        match event {
            TuiEvent::ScrollUp => {
                self.state.scroll_up(1);
                None
            }
            TuiEvent::ScrollDown => {
                self.state.scroll_down(1, line_count);
                None
            }
            TuiEvent::ScrollPageUp => {
                let page = self.state.page_height();
                self.state.scroll_up(page);
                None
            }
            TuiEvent::ScrollPageDown => {
                let page = self.state.page_height();
                self.state.scroll_down(page, line_count);
                None
            }
            TuiEvent::CursorUp => {
                self.select_diagnostic(false);
                None
            }
            TuiEvent::CursorDown => {
                self.select_diagnostic(true);
                None
            }
            TuiEvent::Enter => self
                .state
                .selected
                .and_then(|i| self.lines.get(i))
                .and_then(|l| l.location)
                .map(OutputEvent::Activate),
            _ => None,
        }
    }
}
