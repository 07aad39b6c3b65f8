//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Running**: polls every ~50ms so streamed output shows up promptly.
//! - **Idle**: sleeps up to 500ms, only redraws on events or terminal resize.
//!
//! ## Runs
//!
//! `Effect::SpawnRun` starts two tokio tasks: the executor (file write,
//! process, stream reads) and a forwarder turning `RunChunk`s into
//! `Action`s on the std `mpsc` channel this loop drains. Esc aborts both;
//! the child is killed on drop.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::script_file;
use crate::core::state::{App, OutputView};
use crate::runner::{RunChunk, RunRequest, ScriptExecutor};
use crate::tui::component::EventHandler;
use crate::tui::components::{EditorEvent, EditorState, OutputEvent, OutputPane, OutputPaneState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::ClickTarget;

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Output,
}

impl Focus {
    fn toggled(self) -> Self {
        match self {
            Focus::Editor => Focus::Output,
            Focus::Output => Focus::Editor,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub editor: EditorState,
    pub output_pane: OutputPaneState,
    pub focus: Focus,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            editor: EditorState::new(),
            output_pane: OutputPaneState::new(),
            focus: Focus::Editor, // User expects to type immediately
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is pushed unconditionally; terminals that
        // don't support it ignore the sequence
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBar,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Apply an effect that needs the loop's resources. Returns `true` to quit.
fn apply_effect(
    effect: Effect,
    app: &mut App,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
    abort_handles: &mut Vec<tokio::task::AbortHandle>,
) -> bool {
    match effect {
        Effect::Quit => return true,
        Effect::SpawnRun(request) => {
            tui.output_pane = OutputPaneState::new();
            *abort_handles = spawn_run(
                request,
                app.executor.clone(),
                app.config.run_timeout_secs,
                tx.clone(),
            );
        }
        Effect::FocusEditor => tui.focus = Focus::Editor,
        Effect::SaveScript => script_file::save_current_script(app),
        Effect::None => {}
    }
    false
}

fn cancel_run(app: &mut App, abort_handles: &mut Vec<tokio::task::AbortHandle>) {
    for handle in abort_handles.drain(..) {
        handle.abort();
    }
    update(app, Action::CancelRun);
}

pub fn run(mut app: App) -> std::io::Result<()> {
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // Abort handles for the current run (used by Esc-to-cancel)
    let mut active_abort_handles: Vec<tokio::task::AbortHandle> = Vec::new();

    let mut needs_redraw = true; // Force first frame

    'main: loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if app.is_running() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            // Editing keys that change nothing (Backspace at the start, etc.)
            // skip the redraw; everything else repaints
            let effect = match event {
                TuiEvent::Resize => {
                    needs_redraw = true;
                    continue;
                }
                TuiEvent::ForceQuit => update(&mut app, Action::Quit),
                TuiEvent::Run => update(&mut app, Action::RunRequested),
                TuiEvent::Save => update(&mut app, Action::SaveRequested),
                TuiEvent::ToggleFocus => {
                    tui.focus = tui.focus.toggled();
                    needs_redraw = true;
                    continue;
                }
                TuiEvent::Escape if app.is_running() => {
                    cancel_run(&mut app, &mut active_abort_handles);
                    needs_redraw = true;
                    continue;
                }
                TuiEvent::Escape => {
                    tui.focus = Focus::Editor;
                    needs_redraw = true;
                    continue;
                }
                TuiEvent::MouseClick(column, row) => {
                    let frame_area = terminal.get_frame().area();
                    handle_click(column, row, frame_area, &mut app, &mut tui)
                }
                // Wheel and paging always scroll the output
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    let lines = app.output_lines();
                    OutputPane::new(&mut tui.output_pane, &lines, false, "").handle_event(&event);
                    needs_redraw = true;
                    continue;
                }
                _ => match tui.focus {
                    Focus::Editor => {
                        needs_redraw |= edit_buffer(&mut app, &event);
                        continue;
                    }
                    Focus::Output if is_text_input(&event) => {
                        tui.focus = Focus::Editor;
                        edit_buffer(&mut app, &event);
                        needs_redraw = true;
                        continue;
                    }
                    Focus::Output => {
                        needs_redraw = true;
                        let lines = app.output_lines();
                        let mut pane = OutputPane::new(&mut tui.output_pane, &lines, true, "");
                        match pane.handle_event(&event) {
                            Some(OutputEvent::Activate(location)) => {
                                update(&mut app, Action::JumpTo(location))
                            }
                            None => continue,
                        }
                    }
                },
            };

            needs_redraw = true;
            if apply_effect(effect, &mut app, &mut tui, &tx, &mut active_abort_handles) {
                break 'main;
            }
        }

        // Handle background task actions (streamed output, exit)
        let had_diagnostics = matches!(app.output, OutputView::Diagnostics(_));
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(effect, &mut app, &mut tui, &tx, &mut active_abort_handles) {
                break 'main;
            }
        }
        if !had_diagnostics && let OutputView::Diagnostics(lines) = &app.output {
            tui.output_pane.show_diagnostics(lines);
        }
        if !app.is_running() {
            active_abort_handles.clear();
        }
    }

    // Leave no orphaned interpreter behind
    for handle in active_abort_handles.drain(..) {
        handle.abort();
    }

    ratatui::restore();
    Ok(())
}

/// Apply an editing key to the buffer. Returns `true` if the buffer or
/// caret changed.
fn edit_buffer(app: &mut App, event: &TuiEvent) -> bool {
    match app.buffer.handle_event(event) {
        Some(EditorEvent::ContentChanged) => {
            app.modified = true;
            true
        }
        Some(EditorEvent::CaretMoved) => true,
        None => false,
    }
}

/// Keys that edit text. Typing while the output pane has focus goes back
/// to the editor.
fn is_text_input(event: &TuiEvent) -> bool {
    matches!(
        event,
        TuiEvent::InputChar(_)
            | TuiEvent::Paste(_)
            | TuiEvent::Indent
            | TuiEvent::Backspace
            | TuiEvent::Delete
    )
}

fn handle_click(
    column: u16,
    row: u16,
    frame_area: ratatui::layout::Rect,
    app: &mut App,
    tui: &mut TuiState,
) -> Effect {
    match ui::hit_test(column, row, frame_area) {
        ClickTarget::RunButton => update(app, Action::RunRequested),
        ClickTarget::Editor => {
            tui.focus = Focus::Editor;
            if let Some((line, col)) = tui.editor.position_at(column, row) {
                app.buffer.set_caret_line_display_col(line, col);
            }
            Effect::None
        }
        ClickTarget::Output => {
            tui.focus = Focus::Output;
            let lines = app.output_lines();
            let clicked = tui
                .output_pane
                .line_at(column, row)
                .and_then(|i| lines.get(i).map(|l| (i, l.location)));
            match clicked {
                Some((index, Some(location))) => {
                    tui.output_pane.selected = Some(index);
                    update(app, Action::JumpTo(location))
                }
                _ => Effect::None,
            }
        }
        ClickTarget::None => Effect::None,
    }
}

/// Start a run in the background. Returns abort handles for cancellation.
fn spawn_run(
    request: RunRequest,
    executor: Arc<dyn ScriptExecutor>,
    timeout_secs: Option<u64>,
    tx: mpsc::Sender<Action>,
) -> Vec<tokio::task::AbortHandle> {
    let run_id = request.run_id;
    info!("Spawning run {} via {} executor", run_id, executor.name());

    // Async channel for streamed chunks
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<RunChunk>(100);

    let tx_exec = tx.clone();
    let exec_handle = tokio::spawn(async move {
        let execution = executor.execute(request, chunk_tx);
        let result = match timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), execution).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => {
                    warn!("Run {} timed out after {}s", run_id, secs);
                    Err(format!("timed out after {secs}s"))
                }
            },
            None => execution.await.map_err(|e| e.to_string()),
        };

        if let Err(message) = result {
            info!("Run {} failed: {}", run_id, message);
            if tx_exec.send(Action::RunFailed { run_id, message }).is_err() {
                warn!("Failed to send run failure: receiver dropped");
            }
        }
    });

    // Forward chunks to the Action channel
    let forward_handle = tokio::spawn(async move {
        let mut stdout_bytes = 0usize;
        while let Some(chunk) = chunk_rx.recv().await {
            let action = match chunk {
                RunChunk::Stdout(text) => {
                    stdout_bytes += text.len();
                    Action::StdoutChunk { run_id, text }
                }
                RunChunk::Stderr(text) => Action::StderrChunk { run_id, text },
                RunChunk::Exited(code) => Action::RunExited { run_id, code },
            };
            if tx.send(action).is_err() {
                warn!("Failed to forward run output: receiver dropped");
                return;
            }
        }
        debug!("Run {} stream closed ({} stdout bytes)", run_id, stdout_bytes);
    });

    vec![exec_handle.abort_handle(), forward_handle.abort_handle()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ProcessExecutor;
    use crate::test_support::test_app;
    use std::path::Path;
    use std::time::Instant;

    const RUN_ID: u64 = 7;

    fn sh_request(dir: &Path, script: &str) -> RunRequest {
        RunRequest {
            run_id: RUN_ID,
            script: script.to_string(),
            interpreter: "sh".to_string(),
            interpreter_args: Vec::new(),
            script_file: dir.join("scratch.sh"),
            read_chunk_size: 100,
        }
    }

    /// Collect actions until one matches `done` or `limit` elapses.
    async fn collect_until(
        rx: &mpsc::Receiver<Action>,
        limit: Duration,
        done: impl Fn(&Action) -> bool,
    ) -> Vec<Action> {
        let deadline = Instant::now() + limit;
        let mut actions = Vec::new();
        while Instant::now() < deadline {
            match rx.try_recv() {
                Ok(action) => {
                    let finished = done(&action);
                    actions.push(action);
                    if finished {
                        break;
                    }
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        actions
    }

    /// A pid is gone once it no longer exists or is only a zombie.
    #[cfg(target_os = "linux")]
    fn process_gone(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Err(_) => true,
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .is_some_and(|rest| rest.trim_start().starts_with('Z')),
        }
    }

    #[test]
    fn test_edit_buffer_marks_modified_only_on_content_change() {
        let mut app = test_app();

        assert!(edit_buffer(&mut app, &TuiEvent::InputChar('x')));
        assert!(app.modified);

        app.modified = false;
        assert!(!edit_buffer(&mut app, &TuiEvent::CursorRight));
        assert!(edit_buffer(&mut app, &TuiEvent::CursorLeft));
        assert!(!app.modified);
    }

    #[test]
    fn test_typing_keys_are_text_input() {
        assert!(is_text_input(&TuiEvent::InputChar('a')));
        assert!(is_text_input(&TuiEvent::Backspace));
        assert!(!is_text_input(&TuiEvent::Enter));
        assert!(!is_text_input(&TuiEvent::CursorDown));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_forwards_output_and_exit() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();

        spawn_run(
            sh_request(dir.path(), "echo hi\necho oops >&2\nexit 2\n"),
            Arc::new(ProcessExecutor::new()),
            None,
            tx,
        );
        let actions = collect_until(&rx, Duration::from_secs(10), |a| {
            matches!(a, Action::RunExited { .. })
        })
        .await;

        assert!(actions.contains(&Action::StdoutChunk {
            run_id: RUN_ID,
            text: "hi\n".to_string(),
        }));
        assert!(actions.contains(&Action::StderrChunk {
            run_id: RUN_ID,
            text: "oops\n".to_string(),
        }));
        assert_eq!(
            actions.last(),
            Some(&Action::RunExited {
                run_id: RUN_ID,
                code: 2
            })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_timeout_fails_after_streamed_output() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();

        spawn_run(
            sh_request(dir.path(), "echo started\nsleep 30\n"),
            Arc::new(ProcessExecutor::new()),
            Some(1),
            tx,
        );
        let actions = collect_until(&rx, Duration::from_secs(10), |a| {
            matches!(a, Action::RunFailed { .. })
        })
        .await;

        assert_eq!(
            actions,
            vec![
                Action::StdoutChunk {
                    run_id: RUN_ID,
                    text: "started\n".to_string(),
                },
                Action::RunFailed {
                    run_id: RUN_ID,
                    message: "timed out after 1s".to_string(),
                },
            ]
        );
        assert!(started.elapsed() < Duration::from_secs(10));

        // The killed process never reports an exit
        let late = collect_until(&rx, Duration::from_millis(300), |_| false).await;
        assert!(late.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_kills_child_and_suppresses_exit() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let script = format!(
            "echo $$ > '{}'\necho started\nsleep 30\n",
            pid_file.display()
        );
        let (tx, rx) = mpsc::channel();

        let mut app = test_app();
        assert!(matches!(
            update(&mut app, Action::RunRequested),
            Effect::SpawnRun(_)
        ));
        let mut handles = spawn_run(
            sh_request(dir.path(), &script),
            Arc::new(ProcessExecutor::new()),
            None,
            tx,
        );

        let actions = collect_until(&rx, Duration::from_secs(10), |a| {
            matches!(a, Action::StdoutChunk { .. })
        })
        .await;
        assert!(matches!(actions.last(), Some(Action::StdoutChunk { .. })));
        let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();

        cancel_run(&mut app, &mut handles);
        assert!(handles.is_empty());
        assert!(!app.is_running());
        assert_eq!(app.status_message, "Run cancelled");

        let deadline = Instant::now() + Duration::from_secs(5);
        while !process_gone(&pid) && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(process_gone(&pid), "interpreter {pid} still running");

        let late = collect_until(&rx, Duration::from_millis(300), |_| false).await;
        assert!(
            !late
                .iter()
                .any(|a| matches!(a, Action::RunExited { .. } | Action::RunFailed { .. }))
        );
    }
}
