//! # Script File
//!
//! Load/save of the optional file given on the command line.
//!
//! Saves write `<file>.tmp` and then `rename()` it over the target, so a
//! crash mid-write never leaves a truncated script behind.

use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};

use crate::core::buffer::ScriptBuffer;
use crate::core::state::App;

/// Read `path` into a buffer. A missing file yields an empty buffer so a
/// new script can be started by naming it.
pub fn load_script(path: &Path) -> io::Result<ScriptBuffer> {
    match fs::read_to_string(path) {
        Ok(text) => {
            info!("Loaded {} ({} bytes)", path.display(), text.len());
            Ok(ScriptBuffer::from_text(text))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("{} does not exist yet, starting empty", path.display());
            Ok(ScriptBuffer::new())
        }
        Err(e) => Err(e),
    }
}

fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

/// Save the buffer to `app.source_file`, reporting the outcome in the
/// status bar.
pub fn save_current_script(app: &mut App) {
    let Some(path) = app.source_file.clone() else {
        return;
    };
    match write_atomic(&path, app.buffer.text()) {
        Ok(()) => {
            info!("Saved {}", path.display());
            app.modified = false;
            app.status_message = format!("Saved {}", path.display());
        }
        Err(e) => {
            warn!("Failed to save {}: {}", path.display(), e);
            app.status_message = format!("Save failed: {e}");
        }
    }
}
