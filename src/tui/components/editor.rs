//! # Editor Component
//!
//! Left pane: the script with a line-number gutter and the caret.
//!
//! ## Responsibilities
//!
//! - Render the visible window of the buffer (no soft wrapping; long lines
//!   scroll horizontally)
//! - Keep the caret inside the viewport
//! - Map mouse clicks back to buffer positions
//! - Apply editing keys to the `ScriptBuffer`
//!
//! ## State Management
//!
//! The text and caret live in the core (`App::buffer`) because diagnostic
//! jumps move the caret from outside the TUI. Only the scroll window is
//! presentation state (`EditorState`).

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::buffer::{ScriptBuffer, expand_tabs};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const INDENT: &str = "    ";

/// High-level events emitted while editing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ContentChanged,
    CaretMoved,
}

/// Scroll window of the editor. Persisted in `TuiState`.
#[derive(Debug, Default)]
pub struct EditorState {
    /// First visible line
    pub scroll_row: usize,
    /// First visible display column
    pub scroll_col: usize,
    /// Text area (excluding border and gutter) from the last render
    pub text_area: Rect,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer (line, display column) under a screen cell, if it is inside
    /// the text area.
    pub fn position_at(&self, column: u16, row: u16) -> Option<(usize, usize)> {
        if !self.text_area.contains(Position::new(column, row)) {
            return None;
        }
        let line = self.scroll_row + (row - self.text_area.y) as usize;
        let col = self.scroll_col + (column - self.text_area.x) as usize;
        Some((line, col))
    }

    /// Adjust scrolling so the caret cell is inside a `width` x `height`
    /// viewport.
    fn follow_caret(&mut self, line: usize, col: usize, width: usize, height: usize) {
        if height > 0 {
            if line < self.scroll_row {
                self.scroll_row = line;
            } else if line >= self.scroll_row + height {
                self.scroll_row = line + 1 - height;
            }
        }
        if width > 0 {
            if col < self.scroll_col {
                self.scroll_col = col;
            } else if col >= self.scroll_col + width {
                self.scroll_col = col + 1 - width;
            }
        }
    }
}

/// Transient editor view, built each frame.
pub struct Editor<'a> {
    pub buffer: &'a ScriptBuffer,
    pub state: &'a mut EditorState,
    pub focused: bool,
    pub title: String,
}

impl<'a> Editor<'a> {
    pub fn new(
        buffer: &'a ScriptBuffer,
        state: &'a mut EditorState,
        focused: bool,
        title: String,
    ) -> Self {
        Self {
            buffer,
            state,
            focused,
            title,
        }
    }

    fn gutter_width(&self) -> u16 {
        let digits = self.buffer.line_count().to_string().len() as u16;
        digits + 1
    }
}

impl Component for Editor<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [gutter_area, text_area] =
            Layout::horizontal([Constraint::Length(self.gutter_width()), Constraint::Min(0)])
                .areas(inner);
        self.state.text_area = text_area;

        let (caret_line, _) = self.buffer.caret_line_col();
        let caret_col = self.buffer.caret_display_col();
        self.state.follow_caret(
            caret_line,
            caret_col,
            text_area.width as usize,
            text_area.height as usize,
        );

        let height = text_area.height as usize;
        let visible: Vec<Line> = self
            .buffer
            .lines()
            .skip(self.state.scroll_row)
            .take(height)
            .map(|line| Line::raw(expand_tabs(line)))
            .collect();
        let numbers: Vec<Line> = (self.state.scroll_row..self.state.scroll_row + visible.len())
            .map(|i| Line::raw(format!("{:>w$}", i + 1, w = gutter_area.width.saturating_sub(1) as usize)))
            .collect();

        frame.render_widget(
            Paragraph::new(numbers).style(Style::default().fg(Color::DarkGray)),
            gutter_area,
        );
        let scroll_x = u16::try_from(self.state.scroll_col).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(visible).scroll((0, scroll_x)), text_area);

        if self.focused && text_area.width > 0 && text_area.height > 0 {
            let x = text_area.x + (caret_col - self.state.scroll_col) as u16;
            let y = text_area.y + (caret_line - self.state.scroll_row) as u16;
            frame.set_cursor_position((x, y));
        }
    }
}

/// Editing keys operate directly on the core buffer.
impl EventHandler for ScriptBuffer {
    type Event = EditorEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.insert_char(*c);
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Terminals commonly deliver pasted newlines as CR
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.insert_str(&text);
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Enter => {
                self.insert_char('\n');
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Indent => {
                self.insert_str(INDENT);
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Backspace => self.backspace().then_some(EditorEvent::ContentChanged),
            TuiEvent::Delete => self.delete().then_some(EditorEvent::ContentChanged),
            TuiEvent::CursorLeft => self.move_left().then_some(EditorEvent::CaretMoved),
            TuiEvent::CursorRight => self.move_right().then_some(EditorEvent::CaretMoved),
            TuiEvent::CursorUp => self.move_vertically(-1).then_some(EditorEvent::CaretMoved),
            TuiEvent::CursorDown => self.move_vertically(1).then_some(EditorEvent::CaretMoved),
            TuiEvent::CursorHome => self.move_home().then_some(EditorEvent::CaretMoved),
            TuiEvent::CursorEnd => self.move_end().then_some(EditorEvent::CaretMoved),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_typing_and_enter() {
        let mut buffer = ScriptBuffer::new();
        buffer.handle_event(&TuiEvent::InputChar('x'));
        buffer.handle_event(&TuiEvent::Enter);
        buffer.handle_event(&TuiEvent::Indent);
        assert_eq!(buffer.text(), "x\n    ");
    }

    #[test]
    fn test_paste_normalizes_carriage_returns() {
        let mut buffer = ScriptBuffer::new();
        let res = buffer.handle_event(&TuiEvent::Paste("a\r\nb\rc".to_string()));
        assert_eq!(res, Some(EditorEvent::ContentChanged));
        assert_eq!(buffer.text(), "a\nb\nc");
    }

    #[test]
    fn test_navigation_at_boundaries_emits_nothing() {
        let mut buffer = ScriptBuffer::new();
        assert_eq!(buffer.handle_event(&TuiEvent::CursorLeft), None);
        assert_eq!(buffer.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(buffer.handle_event(&TuiEvent::CursorUp), None);
    }

    #[test]
    fn test_unrelated_events_ignored() {
        let mut buffer = ScriptBuffer::from_text("abc");
        assert_eq!(buffer.handle_event(&TuiEvent::Run), None);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_render_shows_text_and_line_numbers() {
        let backend = TestBackend::new(30, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        let buffer = ScriptBuffer::from_text("val x = 1\nprintln(x)");
        let mut state = EditorState::new();

        terminal
            .draw(|f| {
                Editor::new(&buffer, &mut state, true, "Editor".to_string()).render(f, f.area());
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Editor"));
        assert!(text.contains("1 val x = 1"));
        assert!(text.contains("2 println(x)"));
    }

    #[test]
    fn test_render_scrolls_to_caret() {
        let backend = TestBackend::new(20, 4); // 2 text rows
        let mut terminal = Terminal::new(backend).unwrap();
        let mut buffer = ScriptBuffer::from_text("a\nb\nc\nd\ne");
        buffer.set_caret_chars(8); // line 5
        let mut state = EditorState::new();

        terminal
            .draw(|f| {
                Editor::new(&buffer, &mut state, true, "Editor".to_string()).render(f, f.area());
            })
            .unwrap();

        assert_eq!(state.scroll_row, 3);
    }

    #[test]
    fn test_position_at_maps_clicks() {
        let state = EditorState {
            scroll_row: 10,
            scroll_col: 2,
            text_area: Rect::new(5, 1, 20, 10),
        };
        assert_eq!(state.position_at(7, 3), Some((12, 4)));
        assert_eq!(state.position_at(0, 3), None);
        assert_eq!(state.position_at(7, 11), None);
    }

    #[test]
    fn test_render_expands_tabs_under_caret() {
        let backend = TestBackend::new(20, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut buffer = ScriptBuffer::from_text("\tx");
        buffer.set_caret_chars(1);
        let mut state = EditorState::new();

        terminal
            .draw(|f| {
                Editor::new(&buffer, &mut state, true, "Editor".to_string()).render(f, f.area());
            })
            .unwrap();

        // Border at x=0, gutter "1 " at x=1..3, text from x=3
        assert_eq!(state.text_area.x, 3);
        assert_eq!(terminal.backend().buffer()[(7, 1)].symbol(), "x");
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (7, 1));
    }
}
