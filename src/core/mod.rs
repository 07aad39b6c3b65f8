//! # Core Application Logic
//!
//! This module contains scriptpad's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • diagnostics mapping  │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │   runner   │
//!           │  Adapter   │              │ (process)  │
//!           │ (ratatui)  │              │            │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`buffer`]: Script text and caret
//! - [`diagnostics`]: stderr → clickable locations → caret offsets
//! - [`config`]: Layered configuration
//! - [`script_file`]: Opening and saving the user's script

pub mod action;
pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod script_file;
pub mod state;
