//! Editor configuration loaded from TOML.
//!
//! Every section is optional; missing keys fall back to the defaults below.
//! The core only `debug_assert!`s its numeric preconditions, so everything
//! that reaches it from a file goes through [`EditorConfig::validate`]
//! first.
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//!
//! [camera]
//! projection = "perspective"   # or "orthographic"
//! fov = 60.0
//! position = [0.0, 4.0, 12.0]
//! look_at = [0.0, 0.0, 0.0]
//!
//! [gizmo]
//! translate_gain = 1000.0
//!
//! [scene]
//! bounds_min = [-20.0, -5.0, -20.0]
//! bounds_max = [20.0, 20.0, 20.0]
//! scatter_count = 32
//! seed = 7
//!
//! [log]
//! level = "debug"
//! ```

use std::path::Path;

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;
use vantage_core::{BoundingBox, GizmoSettings, Projection, ProjectionKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ─── Sections ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vantage Editor".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub projection: ProjectionMode,
    /// Vertical field of view in degrees (perspective).
    pub fov: f32,
    /// View volume height in world units (orthographic).
    pub near_height: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub position: [f32; 3],
    pub look_at: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionMode::Perspective,
            fov: 60.0,
            near_height: 10.0,
            z_near: 0.1,
            z_far: 500.0,
            position: [0.0, 4.0, 12.0],
            look_at: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraConfig {
    /// Build the projection for a viewport with the given aspect ratio.
    pub fn projection(&self, aspect: f32) -> Projection {
        let kind = match self.projection {
            ProjectionMode::Perspective => ProjectionKind::Perspective { fov: self.fov },
            ProjectionMode::Orthographic => ProjectionKind::Orthographic {
                near_height: self.near_height,
            },
        };
        Projection::with_kind(kind, aspect, self.z_near, self.z_far)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GizmoConfig {
    pub translate_gain: f32,
    pub scale_gain: f32,
    pub uniform_scale_step: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        let d = GizmoSettings::default();
        Self {
            translate_gain: d.translate_gain,
            scale_gain: d.scale_gain,
            uniform_scale_step: d.uniform_scale_step,
        }
    }
}

impl From<&GizmoConfig> for GizmoSettings {
    fn from(c: &GizmoConfig) -> Self {
        GizmoSettings {
            translate_gain: c.translate_gain,
            scale_gain: c.scale_gain,
            uniform_scale_step: c.uniform_scale_step,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    /// Number of cubes the demo scatters.
    pub scatter_count: usize,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            bounds_min: [-20.0, -5.0, -20.0],
            bounds_max: [20.0, 20.0, 20.0],
            scatter_count: 24,
            seed: 1,
        }
    }
}

impl SceneConfig {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(Vec3::from(self.bounds_min), Vec3::from(self.bounds_max))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.level
            .parse()
            .map_err(|_| invalid("log.level", format!("unknown level '{}'", self.level)))
    }
}

// ─── Root ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub gizmo: GizmoConfig,
    pub scene: SceneConfig,
    pub log: LogConfig,
}

impl EditorConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate config text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the core would assert on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }

        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(invalid("camera.fov", format!("{} is outside (0, 180)", cam.fov)));
        }
        if !(cam.near_height > 0.0) {
            return Err(invalid("camera.near_height", "must be positive"));
        }
        if !(cam.z_near > 0.0 && cam.z_far > cam.z_near) {
            return Err(invalid(
                "camera.z_near",
                format!("need 0 < z_near < z_far, got [{}, {}]", cam.z_near, cam.z_far),
            ));
        }
        let forward = Vec3::from(cam.look_at) - Vec3::from(cam.position);
        if forward == Vec3::ZERO {
            return Err(invalid("camera.look_at", "coincides with camera.position"));
        }
        if forward.normalize().cross(Vec3::Y).length() < 1e-6 {
            return Err(invalid("camera.look_at", "view direction is parallel to world up"));
        }

        let g = &self.gizmo;
        if !(g.translate_gain > 0.0 && g.scale_gain > 0.0 && g.uniform_scale_step > 0.0) {
            return Err(invalid("gizmo", "gains and steps must be positive"));
        }

        let b = self.scene.bounds();
        if !b.min.cmplt(b.max).all() {
            return Err(invalid("scene.bounds_min", "must be below bounds_max on every axis"));
        }

        self.log.level_filter()?;
        Ok(())
    }
}
