use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::core::state::{App, OutputView};
use crate::tui::component::Component;
use crate::tui::components::{Editor, OutputPane, StatusBar};
use crate::tui::{Focus, TuiState};

const KEY_HINTS: &str =
    " Ctrl+R run · Esc stop · Shift+Tab switch pane · Enter/click jump to error · Ctrl+S save · Ctrl+Q quit";

/// Screen regions. Shared by drawing and mouse hit testing so both always
/// agree on where things are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub status: Rect,
    pub editor: Rect,
    pub output: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    use Constraint::{Length, Min, Percentage};
    let [status, main, footer] = Layout::vertical([Length(1), Min(0), Length(1)]).areas(area);
    let [editor, output] = Layout::horizontal([Percentage(50), Percentage(50)]).areas(main);
    ScreenLayout {
        status,
        editor,
        output,
        footer,
    }
}

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    RunButton,
    Editor,
    Output,
    None,
}

pub fn hit_test(column: u16, row: u16, frame_area: Rect) -> ClickTarget {
    let layout = screen_layout(frame_area);
    let pos = Position::new(column, row);
    if StatusBar::run_button_area(layout.status).contains(pos) {
        ClickTarget::RunButton
    } else if layout.editor.contains(pos) {
        ClickTarget::Editor
    } else if layout.output.contains(pos) {
        ClickTarget::Output
    } else {
        ClickTarget::None
    }
}

fn editor_title(app: &App) -> String {
    let marker = if app.modified { " [+]" } else { "" };
    match &app.source_file {
        Some(path) => format!("Editor: {}{marker}", path.display()),
        None => format!("Editor{marker}"),
    }
}

fn output_title(app: &App) -> &'static str {
    match app.output {
        OutputView::Stdout => "Output",
        OutputView::Diagnostics(_) => "Errors",
        OutputView::Failed(_) => "Execution failed",
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let layout = screen_layout(frame.area());

    StatusBar::new(app.status, app.exit_code, app.status_message.clone())
        .render(frame, layout.status);

    Editor::new(
        &app.buffer,
        &mut tui.editor,
        tui.focus == Focus::Editor,
        editor_title(app),
    )
    .render(frame, layout.editor);

    let lines = app.output_lines();
    OutputPane::new(
        &mut tui.output_pane,
        &lines,
        tui.focus == Focus::Output,
        output_title(app),
    )
    .render(frame, layout.output);

    frame.render_widget(
        Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)),
        layout.footer,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, Effect, update};
    use crate::core::buffer::ScriptBuffer;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_screen_layout_splits_panes() {
        let layout = screen_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.status, Rect::new(0, 0, 100, 1));
        assert_eq!(layout.footer, Rect::new(0, 29, 100, 1));
        assert_eq!(layout.editor, Rect::new(0, 1, 50, 28));
        assert_eq!(layout.output, Rect::new(50, 1, 50, 28));
    }

    #[test]
    fn test_hit_test() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(hit_test(2, 0, area), ClickTarget::RunButton);
        assert_eq!(hit_test(60, 0, area), ClickTarget::None);
        assert_eq!(hit_test(10, 5, area), ClickTarget::Editor);
        assert_eq!(hit_test(70, 5, area), ClickTarget::Output);
        assert_eq!(hit_test(10, 29, area), ClickTarget::None);
    }

    #[test]
    fn test_draw_ui() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = test_app();
        app.buffer = ScriptBuffer::from_text("println(\"hi\")");
        let mut tui = TuiState::new();

        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("▶ Run"));
        assert!(text.contains("Editor"));
        assert!(text.contains("Output"));
        assert!(text.contains("println(\"hi\")"));
    }

    #[test]
    fn test_draw_ui_after_failed_run() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = test_app();
        let Effect::SpawnRun(request) = update(&mut app, Action::RunRequested) else {
            panic!("Expected SpawnRun");
        };
        update(
            &mut app,
            Action::StderrChunk {
                run_id: request.run_id,
                text: "scratch.kts:1:1: error: nope\n".to_string(),
            },
        );
        update(&mut app, Action::RunExited { run_id: request.run_id, code: 1 });
        let mut tui = TuiState::new();

        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Errors"));
        assert!(text.contains("scratch.kts:1:1: error: nope"));
        assert!(text.contains("Exit value: 1"));
    }

    #[test]
    fn test_editor_title_marks_unsaved_edits() {
        let mut app = test_app();
        assert_eq!(editor_title(&app), "Editor");
        app.source_file = Some(std::path::PathBuf::from("hello.kts"));
        assert_eq!(editor_title(&app), "Editor: hello.kts");
        app.modified = true;
        assert_eq!(editor_title(&app), "Editor: hello.kts [+]");
    }
}
