//! Runs scripts through a real interpreter process.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;
use tokio::sync::mpsc::Sender;

use super::stream::pump;
use super::{RunChunk, RunError, RunRequest, ScriptExecutor};

/// Writes the script file, then runs `<interpreter> <args...> <script_file>`.
///
/// The child is spawned with `kill_on_drop`, so dropping the `execute`
/// future (task abort, timeout) also kills the process.
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

async fn write_script(path: &Path, script: &str) -> Result<(), RunError> {
    let to_err = |source| RunError::WriteScript {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(to_err)?;
    }
    tokio::fs::write(path, script).await.map_err(to_err)
}

#[async_trait]
impl ScriptExecutor for ProcessExecutor {
    fn name(&self) -> &str {
        "process"
    }

    async fn execute(
        &self,
        request: RunRequest,
        sender: Sender<RunChunk>,
    ) -> Result<(), RunError> {
        write_script(&request.script_file, &request.script).await?;
        debug!(
            "Wrote {} bytes to {}",
            request.script.len(),
            request.script_file.display()
        );

        let mut child = Command::new(&request.interpreter)
            .args(&request.interpreter_args)
            .arg(&request.script_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: request.interpreter.clone(),
                source,
            })?;
        info!(
            "Run {}: spawned {} (pid {:?})",
            request.run_id,
            request.interpreter,
            child.id()
        );

        let stdout = child.stdout.take().ok_or_else(|| {
            RunError::Io(std::io::Error::other("child stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            RunError::Io(std::io::Error::other("child stderr was not captured"))
        })?;

        // Both pipes are drained together; reading one to EOF first can
        // deadlock once the child fills the other pipe's buffer.
        let (out_bytes, err_bytes) = tokio::join!(
            pump(stdout, request.read_chunk_size, &sender, RunChunk::Stdout),
            pump(stderr, request.read_chunk_size, &sender, RunChunk::Stderr),
        );
        let (out_bytes, err_bytes) = (out_bytes?, err_bytes?);

        let status = child.wait().await.map_err(RunError::Io)?;
        let code = status.code().unwrap_or_else(|| {
            warn!("Run {}: process terminated by signal", request.run_id);
            -1
        });
        info!(
            "Run {}: exited with {} (stdout {} bytes, stderr {} bytes)",
            request.run_id, code, out_bytes, err_bytes
        );

        sender
            .send(RunChunk::Exited(code))
            .await
            .map_err(|_| RunError::ChannelClosed)
    }
}
