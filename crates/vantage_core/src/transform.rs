//! Object transform: position, orientation basis, scale.
//!
//! `Transform` caches the last matrix it produced together with a
//! [`MatrixState`] tag.  Mutators only mark the cache stale; the model or
//! view matrix is rebuilt the next time somebody asks for it.  The cache lives
//! in `Cell`s so that readers can take `&self`, which keeps the type
//! single-threaded (`!Sync`) on purpose.
//!
//! # Example
//! ```rust,ignore
//! use vantage_core::Transform;
//! use glam::{Mat4, Vec3};
//!
//! let mut t = Transform::new(None);
//! t.translate(Vec3::new(1.0, 0.0, 0.0));
//! t.rotate(Mat4::from_rotation_y(0.5));
//! let m = t.model_matrix(); // recomputed here, cached afterwards
//! ```

use std::cell::Cell;

use glam::{Mat4, Vec3, Vec4};

use crate::scene::Handle;

/// Smallest scale accepted on any axis; keeps the model matrix invertible.
pub const MIN_SCALE: f32 = 1e-3;

/// What the cached matrix currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixState {
    /// Position, orientation or scale changed since the last computation.
    NotUpdated,
    /// Cache holds `T * R * S`.
    Model,
    /// Cache holds `S * R * T(-p)`.
    View,
}

#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    /// Rotation basis; the translation column is always `(0, 0, 0, 1)`.
    orientation: Mat4,
    scale: Vec3,
    matrix: Cell<Mat4>,
    matrix_state: Cell<MatrixState>,
    enabled: bool,
    /// Weak link back into the owning registry.  Must be revalidated before use.
    entity: Option<Handle>,
    revision: u64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transform {
    /// Identity transform bound to `entity` (or to nothing).
    pub fn new(entity: Option<Handle>) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Mat4::IDENTITY,
            scale: Vec3::ONE,
            matrix: Cell::new(Mat4::IDENTITY),
            matrix_state: Cell::new(MatrixState::NotUpdated),
            enabled: true,
            entity,
            revision: 0,
        }
    }

    // ── Incremental mutators ──────────────────────────────────────────────

    /// Offset the position in world space.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.touch();
    }

    /// Pre-multiply `rotation` onto the current orientation.
    ///
    /// Only the upper-left 3×3 of `rotation` is meaningful.  The result is
    /// re-orthonormalised so repeated small rotations do not drift.
    pub fn rotate(&mut self, rotation: Mat4) {
        self.orientation = orthonormalize(rotation * self.orientation, self.orientation);
        self.touch();
    }

    /// Multiply the scale component-wise by `factor`, subject to [`MIN_SCALE`].
    pub fn scale_by(&mut self, factor: Vec3) {
        self.set_scale_factor(self.scale * factor);
    }

    // ── Absolute setters ──────────────────────────────────────────────────

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.touch();
    }

    /// Replace the orientation.  Non-orthonormal input is repaired, not rejected.
    pub fn set_orientation(&mut self, orientation: Mat4) {
        self.orientation = orthonormalize(orientation, Mat4::IDENTITY);
        self.touch();
    }

    /// Replace the scale; every axis is clamped to at least [`MIN_SCALE`].
    pub fn set_scale_factor(&mut self, scale: Vec3) {
        self.scale = scale.max(Vec3::splat(MIN_SCALE));
        self.touch();
    }

    /// Orient so that the view looks from the current position at `target`.
    ///
    /// Uses a right-handed look-at with world up `+Y`.  A forward vector
    /// colinear with `+Y` yields a degenerate basis; callers must not look
    /// straight up or down.
    pub fn look_at(&mut self, target: Vec3) {
        let look = Mat4::look_at_rh(self.position, target, Vec3::Y);
        self.orientation = Mat4::from_cols(look.x_axis, look.y_axis, look.z_axis, Vec4::W);
        self.touch();
    }

    // ── Matrices ──────────────────────────────────────────────────────────

    /// `T(position) * orientation * S(scale)`, recomputed only when stale.
    pub fn model_matrix(&self) -> Mat4 {
        if self.matrix_state.get() != MatrixState::Model {
            let m = Mat4::from_translation(self.position)
                * self.orientation
                * Mat4::from_scale(self.scale);
            self.matrix.set(m);
            self.matrix_state.set(MatrixState::Model);
        }
        self.matrix.get()
    }

    /// `S(scale) * orientation * T(-position)`.
    ///
    /// This is a direct camera-style construction, not the inverse of the
    /// model matrix; it assumes an orthonormal orientation.
    pub fn view_matrix(&self) -> Mat4 {
        if self.matrix_state.get() != MatrixState::View {
            let m = Mat4::from_scale(self.scale)
                * self.orientation
                * Mat4::from_translation(-self.position);
            self.matrix.set(m);
            self.matrix_state.set(MatrixState::View);
        }
        self.matrix.get()
    }

    /// Forward vector: the negated third row of the model matrix.
    pub fn direction(&self) -> Vec3 {
        -self.model_matrix().row(2).truncate()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn orientation(&self) -> Mat4 {
        self.orientation
    }

    #[inline]
    pub fn scale_factor(&self) -> Vec3 {
        self.scale
    }

    #[inline]
    pub fn matrix_state(&self) -> MatrixState {
        self.matrix_state.get()
    }

    /// Bumped on every mutation.  Dependent caches compare against it.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn entity(&self) -> Option<Handle> {
        self.entity
    }

    pub fn set_entity(&mut self, entity: Option<Handle>) {
        self.entity = entity;
    }

    fn touch(&mut self) {
        self.matrix_state.set(MatrixState::NotUpdated);
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Gram-Schmidt on the first two basis columns; the third is rebuilt as
/// their cross product and the w components are zeroed.  A degenerate input
/// falls back to `fallback`.
fn orthonormalize(m: Mat4, fallback: Mat4) -> Mat4 {
    let Some(x) = m.x_axis.truncate().try_normalize() else {
        return fallback;
    };
    let y = m.y_axis.truncate();
    let Some(y) = (y - x * x.dot(y)).try_normalize() else {
        return fallback;
    };
    let z = x.cross(y);
    Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), Vec4::W)
}
