//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::config::ResolvedConfig;
use crate::runner::{RunChunk, RunError, RunRequest, ScriptExecutor};

/// An executor for tests that don't need a real interpreter.
/// Every run exits immediately with code 0 and no output.
pub struct NoopExecutor;

#[async_trait]
impl ScriptExecutor for NoopExecutor {
    fn name(&self) -> &str {
        "noop"
    }

    async fn execute(
        &self,
        _request: RunRequest,
        sender: Sender<RunChunk>,
    ) -> Result<(), RunError> {
        sender
            .send(RunChunk::Exited(0))
            .await
            .map_err(|_| RunError::ChannelClosed)
    }
}

/// Creates a test App with a NoopExecutor and default config.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(NoopExecutor), ResolvedConfig::default())
}
