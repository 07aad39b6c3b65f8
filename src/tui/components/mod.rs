//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `StatusBar`: Run control, status message, exit value and run indicator
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `Editor`: script view over the core `ScriptBuffer`, scroll window in
//!   `EditorState`
//! - `OutputPane`: scrollable output with selectable diagnostics, state in
//!   `OutputPaneState`
//!
//! Stateful components are rebuilt each frame from references to their
//! persistent state plus props, so dependencies stay explicit:
//!
//! ```rust,ignore
//! // Good: Dependencies are explicit
//! OutputPane::new(&mut tui.output_pane, &lines, focused, "Output").render(frame, area);
//!
//! // Bad: Hidden dependency on global state
//! output_pane.render(frame, area); // reads from global App
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── status_bar.rs    (Top bar)
//! ├── editor.rs        (Script editor)
//! └── output_pane.rs   (Run output / diagnostics)
//! ```

pub mod editor;
pub mod output_pane;
pub mod status_bar;

pub use editor::{Editor, EditorEvent, EditorState};
pub use output_pane::{OutputEvent, OutputPane, OutputPaneState};
pub use status_bar::StatusBar;
