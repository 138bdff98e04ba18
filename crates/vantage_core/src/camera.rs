//! Camera: a projection plus a transform, and the view frustum they span.
//!
//! ## Frustum planes
//!
//! Given `M = projection * view`, the six clip planes can be read straight
//! off the rows of `M` (Gribb-Hartmann): plane `i` is `row3 ± row(i / 2)`,
//! with `+` for even `i` and `-` for odd `i`.  Each plane is stored as
//! `Vec4(nx, ny, nz, d)`, normalised so `dot(n, p) + d` is a true signed
//! distance, positive inside.
//!
//! The planes are *not* kept in sync automatically: call
//! [`Camera::recalculate_projection_volume`] after moving the camera or
//! changing its projection.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::math::{signed_distance, Ray};
use crate::object::{Object2D, Object3D};
use crate::projection::Projection;

/// Index of each frustum plane in [`Camera::planes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

#[derive(Debug, Clone, Default)]
pub struct Camera {
    projection: Projection,
    object: Object3D,
    planes: [Vec4; 6],
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            object: Object3D::default(),
            planes: [Vec4::ZERO; 6],
        }
    }

    // ── Frustum ───────────────────────────────────────────────────────────

    /// Re-extract the frustum planes from `projection * view`.
    ///
    /// Orthographic cameras keep their previous planes: box-volume culling is
    /// not implemented, so everything tests visible until it is.
    pub fn recalculate_projection_volume(&mut self) {
        if self.projection.is_orthographic() {
            log::trace!("orthographic frustum culling not implemented; planes unchanged");
            return;
        }

        let m = self.projection.projection_matrix(false) * self.object.view_matrix();
        let r3 = m.row(3);
        for (i, plane) in self.planes.iter_mut().enumerate() {
            let row = m.row(i / 2);
            let mut p = if i % 2 == 0 { r3 + row } else { r3 - row };
            let len = p.truncate().length();
            if len > 1e-6 {
                p /= len;
            }
            *plane = p;
        }
    }

    /// Conservative sphere-vs-frustum test.
    ///
    /// The object's bounding sphere is centred on its position; the object
    /// is rejected on the first plane it lies entirely behind.  Objects whose
    /// sphere grazes the frustum report visible even if their geometry
    /// does not.
    pub fn is_object_visible(&self, object: &Object3D) -> bool {
        let center = object.position();
        let radius = object.bounding_sphere().radius;
        self.planes
            .iter()
            .all(|plane| signed_distance(*plane, center) >= -radius)
    }

    /// 2D objects are never culled.
    // TODO: cull against the orthographic screen rectangle once sprites carry
    // screen-space bounds.
    pub fn is_object_2d_visible(&self, _object: &Object2D) -> bool {
        true
    }

    #[inline]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    #[inline]
    pub fn plane(&self, which: FrustumPlane) -> Vec4 {
        self.planes[which as usize]
    }

    // ── Rays ──────────────────────────────────────────────────────────────

    /// World-space ray from the camera position through `ndc`.
    ///
    /// The NDC point is taken back to eye space through the inverse
    /// projection, forced to a direction (`z = -1`, `w = 0`), then taken to
    /// world space through the inverse view matrix.
    pub fn world_ray(&self, ndc: Vec2) -> Ray {
        let inv_proj = self.projection.projection_matrix(false).inverse();
        let eye = inv_proj * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let eye = Vec4::new(eye.x, eye.y, -1.0, 0.0);
        let world = self.object.view_matrix().inverse() * eye;
        Ray::new(self.object.position(), world.truncate())
    }

    /// Ray for picking the element under `ndc`.
    ///
    /// Under a parallel projection the cursor ray starts on the near plane
    /// below the cursor and runs along the view direction; perspective
    /// cameras use [`world_ray`](Self::world_ray).
    pub fn pick_ray(&self, ndc: Vec2) -> Ray {
        if !self.projection.is_orthographic() {
            return self.world_ray(ndc);
        }
        let inv = self.view_projection_matrix().inverse();
        let origin = inv.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        Ray::new(origin, self.object.direction())
    }

    // ── Parts ─────────────────────────────────────────────────────────────

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    pub fn object(&self) -> &Object3D {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut Object3D {
        &mut self.object
    }

    /// Forward to the projection; the frustum still needs recalculating.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.projection.set_aspect(aspect);
    }

    pub fn is_orthographic(&self) -> bool {
        self.projection.is_orthographic()
    }

    pub fn position(&self) -> Vec3 {
        self.object.position()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.projection_matrix(false)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.object.view_matrix()
    }

    /// `projection * view`, the matrix the frustum planes come from.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
