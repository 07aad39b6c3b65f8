//! # Application State
//!
//! Core business state for scriptpad. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── executor: Arc<dyn ScriptExecutor>  // how runs are executed
//! ├── config: ResolvedConfig             // interpreter, script file, ...
//! ├── buffer: ScriptBuffer               // script text + caret
//! ├── source_file: Option<PathBuf>       // file opened from the CLI
//! ├── status: RunStatus                  // Idle / Running
//! ├── run_id: u64                        // id of the latest run
//! ├── stdout / stderr: String            // captured output of the latest run
//! ├── exit_code: Option<i32>             // last exit code
//! ├── output: OutputView                 // what the output pane shows
//! └── status_message: String             // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::buffer::ScriptBuffer;
use crate::core::config::ResolvedConfig;
use crate::core::diagnostics::{DiagnosticMarker, OutputLine};
use crate::runner::ScriptExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
}

/// What the output pane currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputView {
    /// The captured stdout (live while running).
    Stdout,
    /// stderr of a failed run, with activatable diagnostic lines.
    Diagnostics(Vec<OutputLine>),
    /// The run could not be executed at all.
    Failed(String),
}

pub struct App {
    pub executor: Arc<dyn ScriptExecutor>,
    pub config: ResolvedConfig,
    pub buffer: ScriptBuffer,
    pub source_file: Option<PathBuf>,
    /// Buffer edited since it was loaded or last saved
    pub modified: bool,
    pub status: RunStatus,
    pub run_id: u64,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub output: OutputView,
    pub status_message: String,
}

impl App {
    pub fn new(executor: Arc<dyn ScriptExecutor>, config: ResolvedConfig) -> Self {
        Self {
            executor,
            config,
            buffer: ScriptBuffer::new(),
            source_file: None,
            modified: false,
            status: RunStatus::Idle,
            run_id: 0,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            output: OutputView::Stdout,
            status_message: String::from("Ctrl+R to run"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn marker(&self) -> DiagnosticMarker {
        DiagnosticMarker::for_script(&self.config.script_file)
    }

    /// Lines the output pane renders, in order.
    pub fn output_lines(&self) -> Vec<OutputLine> {
        match &self.output {
            OutputView::Stdout => self.stdout.split('\n').map(OutputLine::plain).collect(),
            OutputView::Diagnostics(lines) => lines.clone(),
            OutputView::Failed(message) => message.split('\n').map(OutputLine::plain).collect(),
        }
    }

    /// Full text of the output pane.
    pub fn output_text(&self) -> String {
        match &self.output {
            OutputView::Stdout => self.stdout.clone(),
            OutputView::Diagnostics(lines) => lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputView::Failed(message) => message.clone(),
        }
    }
}
