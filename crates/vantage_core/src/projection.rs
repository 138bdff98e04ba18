//! Perspective / orthographic projection with a cached matrix.
//!
//! Matrices follow the OpenGL clip convention (right-handed eye space,
//! depth in `[-1, 1]`).

use std::cell::Cell;

use glam::Mat4;

use crate::math::DEG_TO_RAD;

/// Projection mode together with the one parameter that only makes sense
/// for that mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    /// Vertical field of view in degrees, in `(0, 180)`.
    Perspective { fov: f32 },
    /// Height of the view volume in world units, `> 0`.
    Orthographic { near_height: f32 },
}

#[derive(Debug, Clone)]
pub struct Projection {
    kind: ProjectionKind,
    aspect: f32,
    z_near: f32,
    z_far: f32,
    matrix: Cell<Mat4>,
    valid: Cell<bool>,
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(45.0, 1.0, 0.1, 100.0)
    }
}

impl Projection {
    pub fn perspective(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        Self::with_kind(ProjectionKind::Perspective { fov }, aspect, z_near, z_far)
    }

    pub fn orthographic(near_height: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        Self::with_kind(ProjectionKind::Orthographic { near_height }, aspect, z_near, z_far)
    }

    pub fn with_kind(kind: ProjectionKind, aspect: f32, z_near: f32, z_far: f32) -> Self {
        debug_assert_kind(kind);
        debug_assert!(aspect > 0.0, "aspect must be positive, got {aspect}");
        debug_assert!(
            z_near > 0.0 && z_far > z_near,
            "invalid z range [{z_near}, {z_far}]"
        );
        Self {
            kind,
            aspect,
            z_near,
            z_far,
            matrix: Cell::new(Mat4::IDENTITY),
            valid: Cell::new(false),
        }
    }

    // ── Setters ───────────────────────────────────────────────────────────

    pub fn set_aspect(&mut self, aspect: f32) {
        debug_assert!(aspect > 0.0, "aspect must be positive, got {aspect}");
        self.aspect = aspect;
        self.valid.set(false);
    }

    pub fn set_z_range(&mut self, z_near: f32, z_far: f32) {
        debug_assert!(
            z_near > 0.0 && z_far > z_near,
            "invalid z range [{z_near}, {z_far}]"
        );
        self.z_near = z_near;
        self.z_far = z_far;
        self.valid.set(false);
    }

    /// Switch to (or stay in) perspective mode with the given vertical fov.
    pub fn set_perspective_param(&mut self, fov: f32) {
        self.set_kind(ProjectionKind::Perspective { fov });
    }

    /// Switch to (or stay in) orthographic mode with the given view height.
    pub fn set_orthographic_param(&mut self, near_height: f32) {
        self.set_kind(ProjectionKind::Orthographic { near_height });
    }

    pub fn set_kind(&mut self, kind: ProjectionKind) {
        debug_assert_kind(kind);
        self.kind = kind;
        self.valid.set(false);
    }

    // ── Matrix ────────────────────────────────────────────────────────────

    /// The projection matrix, rebuilt when a setter ran since the last call
    /// or when `force_recalculate` is set.
    pub fn projection_matrix(&self, force_recalculate: bool) -> Mat4 {
        if !self.valid.get() || force_recalculate {
            let m = match self.kind {
                ProjectionKind::Perspective { fov } => {
                    Mat4::perspective_rh_gl(fov * DEG_TO_RAD, self.aspect, self.z_near, self.z_far)
                }
                ProjectionKind::Orthographic { near_height } => {
                    let half_h = near_height * 0.5;
                    let half_w = near_height * self.aspect * 0.5;
                    Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, self.z_near, self.z_far)
                }
            };
            self.matrix.set(m);
            self.valid.set(true);
        }
        self.matrix.get()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.kind, ProjectionKind::Orthographic { .. })
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Whether the cached matrix is current.
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

fn debug_assert_kind(kind: ProjectionKind) {
    match kind {
        ProjectionKind::Perspective { fov } => {
            debug_assert!(fov > 0.0 && fov < 180.0, "fov out of range: {fov}");
        }
        ProjectionKind::Orthographic { near_height } => {
            debug_assert!(near_height > 0.0, "near height must be positive: {near_height}");
        }
    }
}
