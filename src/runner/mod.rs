//! # Script Runner
//!
//! Executes the buffer through an external interpreter and streams what the
//! process writes back as [`RunChunk`]s.
//!
//! ```text
//! RunRequest ──▶ ScriptExecutor::execute ──▶ Sender<RunChunk>
//!                    │                          Stdout("...")
//!                    │                          Stderr("...")
//!                    └─ Err(RunError)           Exited(code)
//! ```
//!
//! The executor is a trait so the TUI can be driven by a fake in tests.

mod process;
mod stream;

use std::fmt;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

pub use process::ProcessExecutor;
pub use stream::pump;

/// Everything needed for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub run_id: u64,
    pub script: String,
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
    pub script_file: PathBuf,
    pub read_chunk_size: usize,
}

/// Incremental output of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunChunk {
    Stdout(String),
    Stderr(String),
    /// Process finished. Signal-terminated children report `-1`.
    Exited(i32),
}

#[derive(Debug)]
pub enum RunError {
    /// The script file could not be written.
    WriteScript { path: PathBuf, source: io::Error },
    /// The interpreter could not be started.
    Spawn { program: String, source: io::Error },
    /// Reading output or waiting for the child failed.
    Io(io::Error),
    /// The receiving side of the chunk channel is gone.
    ChannelClosed,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::WriteScript { path, source } => {
                write!(f, "could not write {}: {source}", path.display())
            }
            RunError::Spawn { program, source } => {
                write!(f, "could not start '{program}': {source}")
            }
            RunError::Io(e) => write!(f, "process I/O error: {e}"),
            RunError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::WriteScript { source, .. } | RunError::Spawn { source, .. } => Some(source),
            RunError::Io(e) => Some(e),
            RunError::ChannelClosed => None,
        }
    }
}

#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    fn name(&self) -> &str;

    /// Run the script, sending output chunks as they arrive and finishing
    /// with exactly one `RunChunk::Exited` on success.
    async fn execute(&self, request: RunRequest, sender: Sender<RunChunk>)
    -> Result<(), RunError>;
}
