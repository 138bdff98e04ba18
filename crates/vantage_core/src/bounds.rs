//! Bounding volumes and the geometry hook that feeds them.
//!
//! ## Fast AABB of a transformed box
//!
//! Transforming all 8 corners of a box and re-taking min/max is exact but
//! wasteful.  Instead the centre goes through `M` and the half-extent goes
//! through `|M|`, the component-wise absolute value of the upper-left 3×3
//! (Arvo, Graphics Gems 1990).  The result always contains the rotated box
//! and is tight when the box is not rotated.

use glam::{Mat4, Vec3};

// ── BoundingBox ──────────────────────────────────────────────────────────────

/// Axis-aligned box given by its `min`/`max` corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    /// Degenerate box at the origin.
    pub const EMPTY: Self = Self { min: Vec3::ZERO, max: Vec3::ZERO };

    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning `[-half, half]` around the origin.
    #[inline]
    pub fn from_half_extent(half: Vec3) -> Self {
        Self { min: -half, max: half }
    }

    /// Tightest box around `points`; `EMPTY` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::EMPTY;
        };
        iter.fold(Self::new(first, first), |b, p| Self::new(b.min.min(p), b.max.max(p)))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, `min` first and `max` last.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    pub fn contains_point(&self, p: Vec3, tolerance: f32) -> bool {
        p.cmpge(self.min - Vec3::splat(tolerance)).all()
            && p.cmple(self.max + Vec3::splat(tolerance)).all()
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// World-space AABB of this box after `transform` (centre via `M`,
    /// half-extent via `|M|`).
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let centre = transform.transform_point3(self.center());
        let half = self.half_extent();

        let abs = Mat4::from_cols(
            transform.x_axis.abs(),
            transform.y_axis.abs(),
            transform.z_axis.abs(),
            transform.w_axis.abs(),
        );
        let new_half = abs.transform_vector3(half);

        Self {
            min: centre - new_half,
            max: centre + new_half,
        }
    }
}

// ── BoundingSphere ───────────────────────────────────────────────────────────

/// Sphere radius around the owning object's position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoundingSphere {
    pub radius: f32,
}

// ── Geometry hook ────────────────────────────────────────────────────────────

/// Object-space extents, computed once per object.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LocalBounds {
    /// Object-oriented bounding box in object space.
    pub oobb: BoundingBox,
    /// Largest absolute vertex coordinate along any axis.
    pub max_vertex_length: f32,
}

impl LocalBounds {
    /// Bounds of a vertex cloud.
    pub fn from_vertices(vertices: &[Vec3]) -> Self {
        let max_vertex_length = vertices
            .iter()
            .map(|v| v.abs().max_element())
            .fold(0.0_f32, f32::max);
        Self {
            oobb: BoundingBox::from_points(vertices.iter().copied()),
            max_vertex_length,
        }
    }

    /// Bounds of a box `[-half, half]`.
    pub fn from_half_extent(half: Vec3) -> Self {
        Self {
            oobb: BoundingBox::from_half_extent(half),
            max_vertex_length: half.abs().max_element(),
        }
    }
}

/// Something that owns vertex data and can describe its own extents.
///
/// Implementations are queried exactly once per [`Object3D`](crate::Object3D)
/// lifetime; the geometry is assumed immutable afterwards.
pub trait Geometry {
    fn local_bounds(&self) -> LocalBounds;
}

/// Geometry with no extent (cameras, markers).
#[derive(Copy, Clone, Debug, Default)]
pub struct PointGeometry;

impl Geometry for PointGeometry {
    fn local_bounds(&self) -> LocalBounds {
        LocalBounds::default()
    }
}

/// Axis-aligned box geometry.
#[derive(Copy, Clone, Debug)]
pub struct BoxGeometry {
    pub half_extent: Vec3,
}

impl Geometry for BoxGeometry {
    fn local_bounds(&self) -> LocalBounds {
        LocalBounds::from_half_extent(self.half_extent)
    }
}
