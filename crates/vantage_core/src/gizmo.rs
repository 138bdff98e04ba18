//! Mouse-driven translate / rotate / scale of a single scene object.
//!
//! A [`GizmoSession`] is owned by whatever hosts the 3D view (one per
//! canvas).  It remembers which object is being manipulated, along which
//! axis, in which mode, and the world ray direction seen on the previous
//! mouse move.  Each call to [`GizmoSession::drag`] turns the difference
//! between the previous and the current ray into an incremental transform.
//!
//! The target is only a [`Handle`]; the caller resolves it against its
//! registry before every drag and passes the live object in.
//!
//! ```rust,ignore
//! let mut session = GizmoSession::default();
//! session.set_axis(GizmoAxis::X);
//! session.begin(handle, TransformType::Translate);
//! // per mouse move:
//! let ndc = viewport.to_ndc(mx, my)?;
//! match session.drag(&camera, &mut element.object, ndc, rel, &settings) {
//!     GizmoOutcome::Translated(_) | GizmoOutcome::Scaled(_) => world.constrain_position(handle),
//!     _ => false,
//! };
//! ```

use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::math::{line_vs_plane, signed_angle, EPSILON};
use crate::object::Object3D;
use crate::scene::Handle;

// ─── Modes ─────────────────────────────────────────────────────────────────

/// Axis the gizmo is engaged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoAxis {
    #[default]
    None,
    X,
    Y,
    Z,
    All,
}

impl GizmoAxis {
    /// Component mask applied to deltas.
    pub fn mask(self) -> Vec3 {
        match self {
            GizmoAxis::None => Vec3::ZERO,
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
            GizmoAxis::All => Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformType {
    #[default]
    None,
    Translate,
    Rotate,
    Scale,
}

/// Tuning knobs for [`GizmoSession::drag`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoSettings {
    /// Multiplier on ray-direction deltas when translating in perspective.
    pub translate_gain: f32,
    /// Multiplier on ray-direction deltas when scaling in perspective.
    pub scale_gain: f32,
    /// Uniform scale step for the `All` axis, and per pixel in orthographic
    /// views.
    pub uniform_scale_step: f32,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            translate_gain: 1000.0,
            scale_gain: 1.0,
            uniform_scale_step: 0.01,
        }
    }
}

/// What a single [`GizmoSession::drag`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GizmoOutcome {
    /// No target, axis or mode engaged.
    Idle,
    /// First move after arming; only the ray was recorded.
    Primed,
    /// Position moved by the delta.
    Translated(Vec3),
    /// Scale changed by the delta (before clamping).
    Scaled(Vec3),
    /// Orientation rotated by the angle in radians.
    Rotated(f32),
    /// Degenerate frame; nothing changed.
    Skipped,
    /// The rotation plane could not be hit; the session was cleared.
    Lost,
}

// ─── Session ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct GizmoSession {
    target: Option<Handle>,
    axis: GizmoAxis,
    transform_type: TransformType,
    last_ray_direction: Vec3,
}

impl GizmoSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the session on `target`.  The axis is kept.
    pub fn begin(&mut self, target: Handle, transform_type: TransformType) {
        if self.target != Some(target) {
            self.last_ray_direction = Vec3::ZERO;
        }
        self.target = Some(target);
        self.set_transform_type(transform_type);
        log::debug!("gizmo armed on {:?} ({:?}, {:?})", target, self.transform_type, self.axis);
    }

    pub fn set_axis(&mut self, axis: GizmoAxis) {
        if self.axis != axis {
            self.axis = axis;
            self.last_ray_direction = Vec3::ZERO;
        }
    }

    pub fn set_transform_type(&mut self, transform_type: TransformType) {
        if self.transform_type != transform_type {
            self.transform_type = transform_type;
            self.last_ray_direction = Vec3::ZERO;
        }
    }

    /// Forget the previous ray; the next drag primes again.
    pub fn reset_ray(&mut self) {
        self.last_ray_direction = Vec3::ZERO;
    }

    /// Drop the target and forget the previous ray.  Axis and mode are kept.
    pub fn release(&mut self) {
        self.target = None;
        self.last_ray_direction = Vec3::ZERO;
    }

    /// Reset everything, including axis and mode.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Target, axis and mode are all engaged.
    pub fn is_active(&self) -> bool {
        self.target.is_some()
            && self.axis != GizmoAxis::None
            && self.transform_type != TransformType::None
    }

    pub fn target(&self) -> Option<Handle> {
        self.target
    }

    pub fn axis(&self) -> GizmoAxis {
        self.axis
    }

    pub fn transform_type(&self) -> TransformType {
        self.transform_type
    }

    pub fn last_ray_direction(&self) -> Vec3 {
        self.last_ray_direction
    }

    // ── Dragging ───────────────────────────────────────────────────────────

    /// Apply one mouse move to `object`.
    ///
    /// `ndc` is the cursor in normalised device coordinates, `rel` the raw
    /// pixel motion since the previous move (`+y` down).  `object` must be
    /// the element [`target`](Self::target) currently resolves to.
    pub fn drag(
        &mut self,
        camera: &Camera,
        object: &mut Object3D,
        ndc: Vec2,
        rel: Vec2,
        settings: &GizmoSettings,
    ) -> GizmoOutcome {
        if !self.is_active() {
            return GizmoOutcome::Idle;
        }

        let current = camera.world_ray(ndc).direction;
        let previous = self.last_ray_direction;
        self.last_ray_direction = current;
        if previous == Vec3::ZERO {
            return GizmoOutcome::Primed;
        }

        let ortho = camera.is_orthographic();
        match self.transform_type {
            TransformType::None => GizmoOutcome::Idle,
            TransformType::Translate => {
                let delta = if ortho {
                    screen_delta(rel, self.axis)
                } else {
                    (current - previous) * self.axis.mask() * settings.translate_gain
                };
                if delta == Vec3::ZERO {
                    return GizmoOutcome::Skipped;
                }
                object.translate(delta);
                GizmoOutcome::Translated(delta)
            }
            TransformType::Scale => {
                let delta = if self.axis == GizmoAxis::All {
                    if rel.x == 0.0 {
                        Vec3::ZERO
                    } else {
                        Vec3::splat(settings.uniform_scale_step.copysign(rel.x))
                    }
                } else if ortho {
                    screen_delta(rel, self.axis) * settings.uniform_scale_step
                } else {
                    (current - previous) * self.axis.mask() * settings.scale_gain
                };
                if delta == Vec3::ZERO {
                    return GizmoOutcome::Skipped;
                }
                object.set_scale_factor(object.scale_factor() + delta);
                GizmoOutcome::Scaled(delta)
            }
            TransformType::Rotate => self.rotate(camera, object, previous, current, ortho),
        }
    }

    fn rotate(
        &mut self,
        camera: &Camera,
        object: &mut Object3D,
        previous: Vec3,
        current: Vec3,
        ortho: bool,
    ) -> GizmoOutcome {
        let origin = object.position();
        let column = if ortho { 2 } else { 1 };
        let normal = object.orientation().col(column).truncate().normalize_or_zero();
        let eye = camera.position();

        let hits = (
            line_vs_plane(eye, previous, origin, normal).point(),
            line_vs_plane(eye, current, origin, normal).point(),
        );
        let (Some(a), Some(b)) = hits else {
            log::debug!("rotation plane missed; releasing gizmo");
            self.clear();
            return GizmoOutcome::Lost;
        };

        let (a, b) = (a - origin, b - origin);
        if a.length() <= EPSILON || b.length() <= EPSILON {
            return GizmoOutcome::Skipped;
        }

        let angle = signed_angle(a.normalize(), b.normalize(), normal);
        object.rotate(Mat4::from_axis_angle(normal, angle));
        GizmoOutcome::Rotated(angle)
    }
}

/// Raw pixel motion mapped onto world axes for parallel projections.
fn screen_delta(rel: Vec2, axis: GizmoAxis) -> Vec3 {
    match axis {
        GizmoAxis::All => Vec3::new(rel.x, -rel.y, 0.0),
        _ => Vec3::new(rel.x, -rel.y, -rel.y) * axis.mask(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoxGeometry;
    use crate::projection::Projection;
    use std::sync::Arc;

    const H: Handle = Handle(7);

    fn target_at(p: Vec3) -> Object3D {
        let mut o = Object3D::new(Some(H), Arc::new(BoxGeometry { half_extent: Vec3::splat(0.5) }));
        o.set_position(p);
        o
    }

    fn perspective_camera() -> Camera {
        Camera::new(Projection::perspective(90.0, 1.0, 0.1, 100.0))
    }

    fn armed(axis: GizmoAxis, ty: TransformType) -> GizmoSession {
        let mut s = GizmoSession::new();
        s.set_axis(axis);
        s.begin(H, ty);
        s
    }

    #[test]
    fn idle_without_axis_or_target() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::ZERO);
        let settings = GizmoSettings::default();

        let mut s = GizmoSession::new();
        assert_eq!(s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings), GizmoOutcome::Idle);
        s.begin(H, TransformType::Translate);
        assert!(!s.is_active());
        assert_eq!(s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings), GizmoOutcome::Idle);
    }

    #[test]
    fn first_move_only_primes() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -5.0));
        let mut s = armed(GizmoAxis::X, TransformType::Translate);
        let out = s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &GizmoSettings::default());
        assert_eq!(out, GizmoOutcome::Primed);
        assert_eq!(obj.position(), Vec3::new(0.0, 0.0, -5.0));
        assert!(s.last_ray_direction().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn reset_ray_reprimes_without_moving() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -5.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::X, TransformType::Translate);
        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);

        s.reset_ray();
        assert_eq!(s.last_ray_direction(), Vec3::ZERO);
        assert_eq!(s.target(), Some(H));
        let out = s.drag(&cam, &mut obj, Vec2::new(0.5, 0.0), Vec2::new(50.0, 0.0), &settings);
        assert_eq!(out, GizmoOutcome::Primed);
        assert_eq!(obj.position(), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn translate_is_masked_to_axis() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -5.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::X, TransformType::Translate);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        let out = s.drag(&cam, &mut obj, Vec2::new(0.1, 0.0), Vec2::new(20.0, 0.0), &settings);

        // (0.1, 0, -1) normalised, x component times the gain
        let expected = 0.1 / 1.01_f32.sqrt() * 1000.0;
        let p = obj.position();
        assert!((p.x - expected).abs() < 0.05, "{p}");
        assert_eq!(p.y, 0.0);
        assert_eq!(p.z, -5.0);
        assert_eq!(out, GizmoOutcome::Translated(Vec3::new(p.x, 0.0, 0.0)));
    }

    #[test]
    fn orthographic_translate_uses_pixels() {
        let cam = Camera::new(Projection::orthographic(10.0, 1.0, 0.1, 100.0));
        let mut obj = target_at(Vec3::ZERO);
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::Y, TransformType::Translate);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        let out = s.drag(&cam, &mut obj, Vec2::new(0.1, 0.1), Vec2::new(4.0, -3.0), &settings);
        assert_eq!(out, GizmoOutcome::Translated(Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(obj.position(), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn uniform_scale_follows_horizontal_motion() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -5.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::All, TransformType::Scale);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        s.drag(&cam, &mut obj, Vec2::new(0.1, 0.0), Vec2::new(5.0, 0.0), &settings);
        assert!(obj.scale_factor().abs_diff_eq(Vec3::splat(1.01), 1e-6));

        s.drag(&cam, &mut obj, Vec2::new(0.0, 0.0), Vec2::new(-2.0, 0.0), &settings);
        s.drag(&cam, &mut obj, Vec2::new(-0.1, 0.0), Vec2::new(-2.0, 0.0), &settings);
        assert!(obj.scale_factor().abs_diff_eq(Vec3::splat(0.99), 1e-6));

        let out = s.drag(&cam, &mut obj, Vec2::new(-0.1, 0.2), Vec2::new(0.0, 6.0), &settings);
        assert_eq!(out, GizmoOutcome::Skipped);
    }

    #[test]
    fn axis_scale_uses_ray_delta() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -5.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::Y, TransformType::Scale);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        s.drag(&cam, &mut obj, Vec2::new(0.0, 0.1), Vec2::new(0.0, -10.0), &settings);
        let scale = obj.scale_factor();
        assert_eq!(scale.x, 1.0);
        assert_eq!(scale.z, 1.0);
        assert!((scale.y - (1.0 + 0.1 / 1.01_f32.sqrt())).abs() < 1e-4);
    }

    #[test]
    fn rotate_turns_about_local_up() {
        let mut cam = perspective_camera();
        cam.object_mut().set_position(Vec3::new(0.0, 5.0, 0.0));
        cam.object_mut().look_at(Vec3::new(0.0, 0.0, -10.0));
        let mut obj = target_at(Vec3::new(0.0, 0.0, -10.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::Y, TransformType::Rotate);

        s.drag(&cam, &mut obj, Vec2::new(0.0, 0.2), Vec2::ZERO, &settings);
        let out = s.drag(&cam, &mut obj, Vec2::new(0.2, 0.2), Vec2::new(10.0, 0.0), &settings);
        let GizmoOutcome::Rotated(angle) = out else {
            panic!("expected rotation, got {out:?}");
        };
        // dragging right turns clockwise seen from above
        assert!(angle < 0.0);
        assert!(obj.orientation().abs_diff_eq(Mat4::from_rotation_y(angle), 1e-5));
        assert_eq!(obj.position(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn rotate_loses_session_when_plane_is_edge_on() {
        // camera sits in the target's y = 0 rotation plane
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -10.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::Y, TransformType::Rotate);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        let out = s.drag(&cam, &mut obj, Vec2::new(0.3, 0.0), Vec2::new(10.0, 0.0), &settings);
        assert_eq!(out, GizmoOutcome::Lost);
        assert!(s.target().is_none());
        assert_eq!(obj.orientation(), Mat4::IDENTITY);
    }

    #[test]
    fn ray_memory_resets_on_target_or_axis_change() {
        let cam = perspective_camera();
        let mut obj = target_at(Vec3::new(0.0, 0.0, -5.0));
        let settings = GizmoSettings::default();
        let mut s = armed(GizmoAxis::X, TransformType::Translate);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        assert_ne!(s.last_ray_direction(), Vec3::ZERO);
        s.set_axis(GizmoAxis::X);
        assert_ne!(s.last_ray_direction(), Vec3::ZERO);
        s.set_axis(GizmoAxis::Z);
        assert_eq!(s.last_ray_direction(), Vec3::ZERO);

        s.drag(&cam, &mut obj, Vec2::ZERO, Vec2::ZERO, &settings);
        s.begin(H, TransformType::Translate);
        assert_ne!(s.last_ray_direction(), Vec3::ZERO);
        s.begin(Handle(8), TransformType::Translate);
        assert_eq!(s.last_ray_direction(), Vec3::ZERO);

        s.release();
        assert!(s.target().is_none());
        assert_eq!(s.axis(), GizmoAxis::Z);
        s.clear();
        assert_eq!(s.axis(), GizmoAxis::None);
        assert_eq!(s.transform_type(), TransformType::None);
    }
}
