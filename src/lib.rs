//! Facecard - Terminal Card Editor
//!
//! A TUI application for editing rating cards with a live preview, a
//! persisted local store, and PNG/SVG export.

pub mod avatar;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod format;
pub mod image_loader;
pub mod input;
pub mod logging;
pub mod model;
pub mod platform;
pub mod preview;
pub mod render;
pub mod seed;
pub mod state;
pub mod store;
pub mod ui;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use export::{ExportFormat, ExportMode, ExportPipeline};
pub use model::{CardState, Layout, ViewMode};
pub use state::AppState;
pub use store::EditorStore;
