//! # Actions
//!
//! Everything that can happen in scriptpad becomes an `Action`.
//! User presses Ctrl+R? That's `Action::RunRequested`.
//! The interpreter prints something? That's `Action::StdoutChunk { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing any I/O the caller must
//! perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Run-derived actions carry the `run_id` they belong to. Anything from a
//! run that is no longer current (cancelled, or superseded) is dropped, so
//! stale output can never leak into a newer run's view.

use log::{debug, info};

use crate::core::diagnostics::{ErrorLocation, caret_offset, format_error_output};
use crate::core::state::{App, OutputView, RunStatus};
use crate::runner::RunRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RunRequested,
    StdoutChunk { run_id: u64, text: String },
    StderrChunk { run_id: u64, text: String },
    RunExited { run_id: u64, code: i32 },
    RunFailed { run_id: u64, message: String },
    CancelRun,
    /// A diagnostic was activated.
    JumpTo(ErrorLocation),
    SaveRequested,
    Quit,
}

/// I/O the event loop must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SpawnRun(RunRequest),
    FocusEditor,
    SaveScript,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::RunRequested => {
            if app.is_running() {
                app.status_message = "A run is already in progress".to_string();
                return Effect::None;
            }
            app.run_id += 1;
            app.stdout.clear();
            app.stderr.clear();
            app.output = OutputView::Stdout;
            app.status = RunStatus::Running;
            app.status_message = format!("Running {}...", app.config.interpreter);
            info!("Run {} requested", app.run_id);

            Effect::SpawnRun(RunRequest {
                run_id: app.run_id,
                script: app.buffer.text().to_string(),
                interpreter: app.config.interpreter.clone(),
                interpreter_args: app.config.interpreter_args.clone(),
                script_file: app.config.script_file.clone(),
                read_chunk_size: app.config.read_chunk_size,
            })
        }
        Action::StdoutChunk { run_id, text } => {
            if is_current(app, run_id) {
                app.stdout.push_str(&text);
            } else {
                debug!("Dropping stdout chunk from stale run {}", run_id);
            }
            Effect::None
        }
        Action::StderrChunk { run_id, text } => {
            if is_current(app, run_id) {
                app.stderr.push_str(&text);
            } else {
                debug!("Dropping stderr chunk from stale run {}", run_id);
            }
            Effect::None
        }
        Action::RunExited { run_id, code } => {
            if !is_current(app, run_id) {
                debug!("Ignoring exit of stale run {}", run_id);
                return Effect::None;
            }
            app.status = RunStatus::Idle;
            app.exit_code = Some(code);
            if code == 0 {
                app.status_message = "Finished".to_string();
            } else {
                app.output = OutputView::Diagnostics(format_error_output(&app.stderr, &app.marker()));
                app.status_message = format!("Exited with {code}");
            }
            Effect::None
        }
        Action::RunFailed { run_id, message } => {
            if !is_current(app, run_id) {
                debug!("Ignoring failure of stale run {}", run_id);
                return Effect::None;
            }
            app.status = RunStatus::Idle;
            app.output = OutputView::Failed(format!("Execution failed: {message}"));
            app.status_message = "Execution failed".to_string();
            Effect::None
        }
        Action::CancelRun => {
            if app.is_running() {
                info!("Run {} cancelled", app.run_id);
                app.status = RunStatus::Idle;
                app.status_message = "Run cancelled".to_string();
            }
            Effect::None
        }
        Action::JumpTo(location) => {
            let offset = caret_offset(app.buffer.text(), location);
            app.buffer.set_caret_chars(offset);
            app.status_message = format!("Jumped to {location}");
            Effect::FocusEditor
        }
        Action::SaveRequested => {
            if app.source_file.is_none() {
                app.status_message = "No file to save to".to_string();
                return Effect::None;
            }
            Effect::SaveScript
        }
        Action::Quit => Effect::Quit,
    }
}

fn is_current(app: &App, run_id: u64) -> bool {
    app.is_running() && run_id == app.run_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::ScriptBuffer;
    use crate::core::diagnostics::OutputLine;
    use crate::test_support::test_app;
    use std::path::PathBuf;

    fn start_run(app: &mut App) -> u64 {
        match update(app, Action::RunRequested) {
            Effect::SpawnRun(request) => request.run_id,
            other => panic!("Expected SpawnRun, got {:?}", other),
        }
    }

    #[test]
    fn test_run_requested_snapshots_buffer() {
        let mut app = test_app();
        app.buffer = ScriptBuffer::from_text("println(1)");

        let effect = update(&mut app, Action::RunRequested);
        let Effect::SpawnRun(request) = effect else {
            panic!("Expected SpawnRun");
        };
        assert_eq!(request.script, "println(1)");
        assert_eq!(request.script_file, PathBuf::from("scratch.kts"));
        assert_eq!(request.run_id, 1);
        assert_eq!(app.status, RunStatus::Running);
    }

    #[test]
    fn test_run_rejected_while_running() {
        let mut app = test_app();
        start_run(&mut app);

        let effect = update(&mut app, Action::RunRequested);
        assert_eq!(effect, Effect::None);
        assert_eq!(app.run_id, 1);
        assert_eq!(app.status_message, "A run is already in progress");
    }

    #[test]
    fn test_successful_run_shows_stdout_unmodified() {
        let mut app = test_app();
        let id = start_run(&mut app);

        update(&mut app, Action::StdoutChunk { run_id: id, text: "hello ".into() });
        update(&mut app, Action::StderrChunk { run_id: id, text: "warning: x\n".into() });
        update(&mut app, Action::StdoutChunk { run_id: id, text: "world\n".into() });
        update(&mut app, Action::RunExited { run_id: id, code: 0 });

        assert_eq!(app.status, RunStatus::Idle);
        assert_eq!(app.exit_code, Some(0));
        assert_eq!(app.output, OutputView::Stdout);
        assert_eq!(app.output_text(), "hello world\n");
    }

    #[test]
    fn test_stdout_is_visible_while_running() {
        let mut app = test_app();
        let id = start_run(&mut app);
        update(&mut app, Action::StdoutChunk { run_id: id, text: "partial".into() });
        assert_eq!(app.output_text(), "partial");
        assert!(app.is_running());
    }

    #[test]
    fn test_failed_exit_shows_diagnostics() {
        let mut app = test_app();
        let id = start_run(&mut app);
        update(&mut app, Action::StdoutChunk { run_id: id, text: "ignored".into() });
        update(
            &mut app,
            Action::StderrChunk {
                run_id: id,
                text: "scratch.kts:2:3: error: boom\nnote\n".into(),
            },
        );
        update(&mut app, Action::RunExited { run_id: id, code: 1 });

        assert_eq!(app.exit_code, Some(1));
        assert_eq!(app.output_text(), "scratch.kts:2:3: error: boom\nnote\n");
        let lines = app.output_lines();
        assert_eq!(
            lines[0].location,
            Some(ErrorLocation { line: 2, column: 3 })
        );
        assert_eq!(lines[1], OutputLine::plain("note"));
        assert_eq!(app.status_message, "Exited with 1");
    }

    #[test]
    fn test_rerun_clears_previous_result() {
        let mut app = test_app();
        let first = start_run(&mut app);
        update(&mut app, Action::StderrChunk { run_id: first, text: "scratch.kts:1:1: e".into() });
        update(&mut app, Action::RunExited { run_id: first, code: 2 });
        assert!(matches!(app.output, OutputView::Diagnostics(_)));

        start_run(&mut app);
        assert_eq!(app.output, OutputView::Stdout);
        assert!(app.output_text().is_empty());
        assert!(app.stderr.is_empty());
    }

    #[test]
    fn test_stale_chunks_are_dropped() {
        let mut app = test_app();
        let first = start_run(&mut app);
        update(&mut app, Action::CancelRun);
        let second = start_run(&mut app);
        assert_ne!(first, second);

        update(&mut app, Action::StdoutChunk { run_id: first, text: "old".into() });
        update(&mut app, Action::RunExited { run_id: first, code: 3 });
        assert!(app.output_text().is_empty());
        assert!(app.is_running());
        assert_eq!(app.exit_code, None);

        update(&mut app, Action::StdoutChunk { run_id: second, text: "new".into() });
        assert_eq!(app.output_text(), "new");
    }

    #[test]
    fn test_chunks_after_cancel_are_dropped() {
        let mut app = test_app();
        let id = start_run(&mut app);
        update(&mut app, Action::StdoutChunk { run_id: id, text: "a".into() });
        update(&mut app, Action::CancelRun);
        update(&mut app, Action::StdoutChunk { run_id: id, text: "b".into() });

        assert_eq!(app.status, RunStatus::Idle);
        assert_eq!(app.status_message, "Run cancelled");
        assert_eq!(app.output_text(), "a");
    }

    #[test]
    fn test_run_failed_is_recoverable() {
        let mut app = test_app();
        let id = start_run(&mut app);
        update(
            &mut app,
            Action::RunFailed {
                run_id: id,
                message: "could not start 'kotlinc': not found".into(),
            },
        );

        assert_eq!(app.status, RunStatus::Idle);
        assert_eq!(
            app.output_text(),
            "Execution failed: could not start 'kotlinc': not found"
        );
        assert!(matches!(update(&mut app, Action::RunRequested), Effect::SpawnRun(_)));
    }

    #[test]
    fn test_jump_moves_caret_only() {
        let mut app = test_app();
        app.buffer = ScriptBuffer::from_text("abc\nde\nfghi");

        let effect = update(&mut app, Action::JumpTo(ErrorLocation { line: 3, column: 2 }));

        assert_eq!(effect, Effect::FocusEditor);
        assert_eq!(app.buffer.text(), "abc\nde\nfghi");
        assert_eq!(app.buffer.caret_chars(), 8);
        assert_eq!(app.status_message, "Jumped to 3:2");
    }

    #[test]
    fn test_save_without_file() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::SaveRequested), Effect::None);
        assert_eq!(app.status_message, "No file to save to");

        app.source_file = Some(PathBuf::from("script.kts"));
        assert_eq!(update(&mut app, Action::SaveRequested), Effect::SaveScript);
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
