//! Transformable objects that carry bounding volumes.
//!
//! An [`Object3D`] pairs a [`Transform`] with a [`Geometry`].  Object-space
//! extents are pulled from the geometry once, on first use; world-space
//! volumes (AABB, bounding sphere) are re-derived whenever the transform's
//! revision moved since the last derivation.

use std::cell::{Cell, OnceCell};
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};

use crate::bounds::{BoundingBox, BoundingSphere, Geometry, LocalBounds, PointGeometry};
use crate::scene::Handle;
use crate::transform::{MatrixState, Transform};

#[derive(Copy, Clone, Debug)]
struct WorldBounds {
    revision: u64,
    aabb: BoundingBox,
    sphere: BoundingSphere,
}

/// A transform with lazily maintained bounding volumes.
#[derive(Clone)]
pub struct Object3D {
    transform: Transform,
    geometry: Arc<dyn Geometry>,
    local: OnceCell<LocalBounds>,
    world: Cell<Option<WorldBounds>>,
    render_aabb: bool,
    render_oobb: bool,
    render_bounding_sphere: bool,
}

impl std::fmt::Debug for Object3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object3D")
            .field("transform", &self.transform)
            .field("local", &self.local.get())
            .finish_non_exhaustive()
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self::new(None, Arc::new(PointGeometry))
    }
}

impl Object3D {
    pub fn new(entity: Option<Handle>, geometry: Arc<dyn Geometry>) -> Self {
        Self {
            transform: Transform::new(entity),
            geometry,
            local: OnceCell::new(),
            world: Cell::new(None),
            render_aabb: false,
            render_oobb: false,
            render_bounding_sphere: false,
        }
    }

    // ── Bounding volumes ──────────────────────────────────────────────────

    /// Object-space box.  Triggers the geometry hook on first call.
    pub fn oobb(&self) -> BoundingBox {
        self.local_bounds().oobb
    }

    /// World-space axis-aligned box derived from the OOBB and model matrix.
    pub fn aabb(&self) -> BoundingBox {
        self.world_bounds().aabb
    }

    /// Sphere around [`position`](Self::position) enclosing the geometry.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        self.world_bounds().sphere
    }

    /// Largest absolute vertex coordinate reported by the geometry.
    pub fn max_vertex_length(&self) -> f32 {
        self.local_bounds().max_vertex_length
    }

    fn local_bounds(&self) -> &LocalBounds {
        self.local.get_or_init(|| self.geometry.local_bounds())
    }

    fn world_bounds(&self) -> WorldBounds {
        let revision = self.transform.revision();
        let stale = self.transform.matrix_state() != MatrixState::Model;
        if let Some(cached) = self.world.get() {
            if cached.revision == revision && !stale {
                return cached;
            }
        }

        let local = *self.local_bounds();
        let model = self.transform.model_matrix();
        let fresh = WorldBounds {
            revision,
            aabb: local.oobb.transformed(&model),
            sphere: BoundingSphere {
                radius: (self.transform.scale_factor() * local.max_vertex_length).length(),
            },
        };
        self.world.set(Some(fresh));
        fresh
    }

    // ── Debug toggles (flags only) ────────────────────────────────────────

    pub fn set_render_aabb(&mut self, on: bool) {
        self.render_aabb = on;
    }

    pub fn render_aabb(&self) -> bool {
        self.render_aabb
    }

    pub fn set_render_oobb(&mut self, on: bool) {
        self.render_oobb = on;
    }

    pub fn render_oobb(&self) -> bool {
        self.render_oobb
    }

    pub fn set_render_bounding_sphere(&mut self, on: bool) {
        self.render_bounding_sphere = on;
    }

    pub fn render_bounding_sphere(&self) -> bool {
        self.render_bounding_sphere
    }

    // ── Transform access ──────────────────────────────────────────────────

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable transform access; the revision counter keeps bounds coherent.
    #[inline]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn orientation(&self) -> Mat4 {
        self.transform.orientation()
    }

    pub fn scale_factor(&self) -> Vec3 {
        self.transform.scale_factor()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
    }

    pub fn set_orientation(&mut self, orientation: Mat4) {
        self.transform.set_orientation(orientation);
    }

    pub fn set_scale_factor(&mut self, scale: Vec3) {
        self.transform.set_scale_factor(scale);
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.transform.translate(delta);
    }

    pub fn rotate(&mut self, rotation: Mat4) {
        self.transform.rotate(rotation);
    }

    pub fn scale_by(&mut self, factor: Vec3) {
        self.transform.scale_by(factor);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.transform.look_at(target);
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix()
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.transform.view_matrix()
    }

    pub fn direction(&self) -> Vec3 {
        self.transform.direction()
    }

    pub fn entity(&self) -> Option<Handle> {
        self.transform.entity()
    }
}

/// Screen-space object (sprite, overlay quad).
#[derive(Debug, Clone, Default)]
pub struct Object2D {
    pub transform: Transform,
    pub size: Vec2,
}
