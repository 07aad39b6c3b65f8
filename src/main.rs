use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use scriptpad::core::config::{self, CliOverrides, ScriptpadConfig};
use scriptpad::core::script_file;
use scriptpad::core::state::App;
use scriptpad::runner::ProcessExecutor;
use scriptpad::tui;

#[derive(Parser)]
#[command(name = "scriptpad", about = "Split-pane script editor and runner")]
struct Args {
    /// Script to open (saved back with Ctrl+S)
    file: Option<PathBuf>,

    /// Interpreter binary used for runs
    #[arg(short, long)]
    interpreter: Option<String>,

    /// File the buffer is written to before each run
    #[arg(short, long)]
    script_file: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Initialize file logger - writes to scriptpad.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("scriptpad.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Using default config: {}", e);
        ScriptpadConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            interpreter: args.interpreter,
            script_file: args.script_file,
        },
    );

    log::info!(
        "Scriptpad starting up with interpreter: {} {:?}",
        resolved.interpreter,
        resolved.interpreter_args
    );

    let mut app = App::new(Arc::new(ProcessExecutor::new()), resolved);
    if let Some(path) = args.file {
        app.buffer = script_file::load_script(&path)?;
        app.source_file = Some(path);
    }

    tui::run(app)
}
