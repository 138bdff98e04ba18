//! Scene world: the registry that owns every editable object.
//!
//! `World` stores elements in a `HashMap` keyed by a monotonically
//! increasing `u64`, so a [`Handle`] stays valid across unrelated insertions
//! and removals and a stale handle simply fails to resolve.  Anything that
//! keeps a handle (the gizmo session, a transform's back-link) must look it
//! up again before every use.
//!
//! The world also owns the scene bounding box that translated or scaled
//! objects are clamped into.
//!
//! # Quick start
//! ```rust,ignore
//! use vantage_core::{World, BoundingBox};
//! use glam::Vec3;
//!
//! let mut world = World::with_bounds(BoundingBox::new(Vec3::splat(-50.0), Vec3::splat(50.0)));
//! let h = world.spawn_cube("Crate", Vec3::new(0.0, 0.5, -5.0));
//! world.set_position(h, Vec3::new(80.0, 0.0, 0.0));
//! world.constrain_position(h); // back inside the scene box
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::bounds::{BoundingBox, Geometry, LocalBounds};
use crate::camera::Camera;
use crate::math::Ray;
use crate::object::Object3D;

// ─── Handle ────────────────────────────────────────────────────────────────

/// Opaque handle referencing an element inside a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

// ─── Element kinds ─────────────────────────────────────────────────────────

/// Geometric kind of an element.  Doubles as the element's [`Geometry`].
#[derive(Debug, Clone, Default)]
pub enum ElementKind {
    /// A cube given by its half-extent in object units.
    Cube { half_extent: f32 },
    /// An arbitrary vertex cloud in object space.
    Mesh { vertices: Arc<[Vec3]> },
    /// A point light; its influence radius is not part of the bounds.
    PointLight { radius: f32 },
    /// Logical group or marker with no extent.
    #[default]
    Empty,
}

impl Geometry for ElementKind {
    fn local_bounds(&self) -> LocalBounds {
        match self {
            ElementKind::Cube { half_extent } => LocalBounds::from_half_extent(Vec3::splat(*half_extent)),
            ElementKind::Mesh { vertices } => LocalBounds::from_vertices(vertices),
            ElementKind::PointLight { .. } | ElementKind::Empty => LocalBounds::default(),
        }
    }
}

// ─── Element ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Element {
    /// Mirrors the map key.
    pub id: u64,
    pub name: String,
    pub object: Object3D,
    pub kind: ElementKind,
    /// Hidden elements are skipped by culling and picking.
    pub visible: bool,
    pub tags: Vec<String>,
}

// ─── Builder ───────────────────────────────────────────────────────────────

/// Fluent builder returned by [`World::spawn`].
pub struct EntityBuilder<'a> {
    world: &'a mut World,
    name: String,
    position: Vec3,
    orientation: Mat4,
    scale: Vec3,
    kind: ElementKind,
    visible: bool,
    tags: Vec<String>,
}

impl<'a> EntityBuilder<'a> {
    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_orientation(mut self, orientation: Mat4) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Insert the element and return its handle.
    pub fn build(self) -> Handle {
        let id = self.world.next_id;
        self.world.next_id += 1;
        let handle = Handle(id);

        let mut object = Object3D::new(Some(handle), Arc::new(self.kind.clone()));
        object.set_position(self.position);
        object.set_orientation(self.orientation);
        object.set_scale_factor(self.scale);

        log::debug!("spawned {:?} '{}' at {}", handle, self.name, self.position);
        self.world.entities.insert(
            id,
            Element {
                id,
                name: self.name,
                object,
                kind: self.kind,
                visible: self.visible,
                tags: self.tags,
            },
        );
        handle
    }
}

// ─── World ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct World {
    entities: HashMap<u64, Element>,
    next_id: u64,
    bounds: BoundingBox,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Default scene extent: a 2000-unit cube around the origin.
    pub const DEFAULT_BOUNDS: BoundingBox = BoundingBox {
        min: Vec3::splat(-1000.0),
        max: Vec3::splat(1000.0),
    };

    pub fn new() -> Self {
        Self::with_bounds(Self::DEFAULT_BOUNDS)
    }

    pub fn with_bounds(bounds: BoundingBox) -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
            bounds,
        }
    }

    // ── Spawning ───────────────────────────────────────────────────────────

    pub fn spawn(&mut self, name: impl Into<String>) -> EntityBuilder<'_> {
        EntityBuilder {
            world: self,
            name: name.into(),
            position: Vec3::ZERO,
            orientation: Mat4::IDENTITY,
            scale: Vec3::ONE,
            kind: ElementKind::Empty,
            visible: true,
            tags: Vec::new(),
        }
    }

    /// Unit cube (half-extent 0.5) at `position`.
    pub fn spawn_cube(&mut self, name: impl Into<String>, position: Vec3) -> Handle {
        self.spawn(name)
            .with_kind(ElementKind::Cube { half_extent: 0.5 })
            .with_position(position)
            .build()
    }

    /// Remove the element.  Returns `true` if it existed.
    pub fn despawn(&mut self, handle: Handle) -> bool {
        self.entities.remove(&handle.0).is_some()
    }

    // ── Transform shortcuts ────────────────────────────────────────────────

    pub fn set_position(&mut self, handle: Handle, pos: Vec3) {
        if let Some(e) = self.entities.get_mut(&handle.0) {
            e.object.set_position(pos);
        }
    }

    pub fn position(&self, handle: Handle) -> Option<Vec3> {
        self.entities.get(&handle.0).map(|e| e.object.position())
    }

    pub fn set_visible(&mut self, handle: Handle, visible: bool) {
        if let Some(e) = self.entities.get_mut(&handle.0) {
            e.visible = visible;
        }
    }

    // ── Tags ───────────────────────────────────────────────────────────────

    pub fn add_tag(&mut self, handle: Handle, tag: impl Into<String>) {
        if let Some(e) = self.entities.get_mut(&handle.0) {
            let tag = tag.into();
            if !e.tags.contains(&tag) {
                e.tags.push(tag);
            }
        }
    }

    pub fn has_tag(&self, handle: Handle, tag: &str) -> bool {
        self.entities
            .get(&handle.0)
            .is_some_and(|e| e.tags.iter().any(|t| t == tag))
    }

    pub fn iter_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.entities
            .values()
            .filter(move |e| e.tags.iter().any(|t| t == tag))
    }

    // ── Scene bounds ───────────────────────────────────────────────────────

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
    }

    /// Shift an element so that its world AABB lies inside the scene box.
    ///
    /// Each axis is handled independently; an element wider than the scene
    /// on some axis is centred on that axis.  Returns `true` when the
    /// position changed.
    pub fn constrain_position(&mut self, handle: Handle) -> bool {
        let bounds = self.bounds;
        let Some(e) = self.entities.get_mut(&handle.0) else {
            return false;
        };

        let aabb = e.object.aabb();
        let mut shift = Vec3::ZERO;
        for axis in 0..3 {
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
            let (min, max) = (bounds.min[axis], bounds.max[axis]);
            shift[axis] = if hi - lo > max - min {
                (min + max) * 0.5 - (lo + hi) * 0.5
            } else if lo < min {
                min - lo
            } else if hi > max {
                max - hi
            } else {
                0.0
            };
        }

        if shift == Vec3::ZERO {
            return false;
        }
        log::trace!("constraining {:?} by {}", handle, shift);
        e.object.translate(shift);
        true
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Handles of visible elements that survive the camera's frustum test.
    pub fn cull(&self, camera: &Camera) -> Vec<Handle> {
        self.entities
            .values()
            .filter(|e| e.visible && camera.is_object_visible(&e.object))
            .map(|e| Handle(e.id))
            .collect()
    }

    /// Nearest visible element whose bounding sphere `ray` hits.
    pub fn pick(&self, ray: &Ray) -> Option<Handle> {
        self.entities
            .values()
            .filter(|e| e.visible)
            .filter_map(|e| {
                let sphere = e.object.bounding_sphere();
                ray.intersect_sphere(e.object.position(), sphere.radius)
                    .map(|t| (t, e.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| Handle(id))
    }

    // ── Raw access ─────────────────────────────────────────────────────────

    pub fn get(&self, handle: Handle) -> Option<&Element> {
        self.entities.get(&handle.0)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Element> {
        self.entities.get_mut(&handle.0)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entities.contains_key(&handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.entities.values()
    }

    pub fn iter_with_handles(&self) -> impl Iterator<Item = (Handle, &Element)> {
        self.entities.iter().map(|(&id, e)| (Handle(id), e))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
