//! Editor-side collaborators of `vantage_core`: the viewport and 3D canvas
//! that route mouse and keyboard input into the gizmo, TOML configuration
//! and log setup.

pub mod canvas;
pub mod config;
pub mod logging;
pub mod viewport;

pub use canvas::Canvas3D;
pub use config::{ConfigError, EditorConfig};
pub use viewport::ViewportWidget;
