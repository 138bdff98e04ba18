//! Free geometry helpers used by the camera and the transform gizmo.
//!
//! Everything here is pure: no caches, no logging.  The tolerances are
//! absolute and tuned for scenes authored around unit scale.

use glam::{Vec2, Vec3, Vec4};

/// Absolute tolerance for parallel/degenerate tests.
pub const EPSILON: f32 = 1e-6;

/// Degrees → radians factor used by the projection code.
pub const DEG_TO_RAD: f32 = 0.017_453_3;

/// A world-space half-line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first hit with a sphere, if any.
    ///
    /// A ray starting inside the sphere reports `0.0`.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        if c <= 0.0 {
            return Some(0.0);
        }
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b - disc.sqrt();
        (t >= 0.0).then_some(t)
    }
}

/// Classification returned by [`line_vs_plane`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaneIntersection {
    /// The line crosses the plane at the given point.
    Intersect(Vec3),
    /// The line runs parallel to the plane without touching it.
    Parallel,
    /// The line lies in the plane.
    Belong,
}

impl PlaneIntersection {
    /// The intersection point, for `Intersect` only.
    pub fn point(self) -> Option<Vec3> {
        match self {
            PlaneIntersection::Intersect(p) => Some(p),
            _ => None,
        }
    }
}

/// Intersects the line `P + D*t` with the plane through `q` with normal `n`.
///
/// `d` and `n` must be normalised.  When the line is parallel the "belongs"
/// test is one-sided: `dot(p, n) - dot(q, n) < EPSILON`.  Points on the
/// negative side of the plane therefore classify as `Belong` too; callers
/// treat both non-`Intersect` outcomes as failure, so this is kept as is.
pub fn line_vs_plane(p: Vec3, d: Vec3, q: Vec3, n: Vec3) -> PlaneIntersection {
    let denom = d.dot(n);
    if denom.abs() < EPSILON {
        if p.dot(n) - q.dot(n) < EPSILON {
            return PlaneIntersection::Belong;
        }
        return PlaneIntersection::Parallel;
    }

    let t = (q - p).dot(n) / denom;
    PlaneIntersection::Intersect(p + d * t)
}

/// Signed distance from `point` to a plane stored as `(normal, offset)`.
///
/// The plane normal is expected to be unit length for the result to be a
/// true distance; frustum planes are normalised on extraction.
#[inline]
pub fn signed_distance(plane: Vec4, point: Vec3) -> f32 {
    plane.dot(point.extend(1.0))
}

/// Angle in radians from `d1` to `d2`, signed by the rotation sense around `n`.
///
/// All three vectors must be normalised.  The result lies in `[-π, π]`.
pub fn signed_angle(d1: Vec3, d2: Vec3, n: Vec3) -> f32 {
    let angle = d1.dot(d2).clamp(-1.0, 1.0).acos();
    if d1.cross(d2).dot(n) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn restrict_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest power of two that is `>= x`.
///
/// `clp2(0) == 0`, and inputs above `2^31` wrap to `0`, matching the classic
/// bit-smearing formulation.
pub fn clp2(x: u32) -> u32 {
    let mut x = x.wrapping_sub(1);
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x.wrapping_add(1)
}

/// Maps a pixel position inside a `size`-sized viewport to normalised device
/// coordinates (`+y` up).  Returns `None` when the point falls outside
/// `[-1, 1]²`.
pub fn pixel_to_ndc(pixel: Vec2, size: Vec2) -> Option<Vec2> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(
        2.0 * pixel.x / size.x - 1.0,
        1.0 - 2.0 * pixel.y / size.y,
    );
    let inside = (-1.0..=1.0).contains(&ndc.x) && (-1.0..=1.0).contains(&ndc.y);
    inside.then_some(ndc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn ray_hits_plane_at_origin() {
        let hit = line_vs_plane(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, Vec3::Z);
        match hit {
            PlaneIntersection::Intersect(p) => assert!(p.abs_diff_eq(Vec3::ZERO, 1e-6)),
            other => panic!("expected intersection, got {other:?}"),
        }
    }

    #[test]
    fn parallel_ray_off_plane() {
        let hit = line_vs_plane(Vec3::new(0.0, 0.0, 5.0), Vec3::X, Vec3::ZERO, Vec3::Z);
        assert_eq!(hit, PlaneIntersection::Parallel);
    }

    #[test]
    fn parallel_ray_in_plane_belongs() {
        let hit = line_vs_plane(Vec3::new(3.0, 1.0, 0.0), Vec3::X, Vec3::ZERO, Vec3::Z);
        assert_eq!(hit, PlaneIntersection::Belong);
        assert_eq!(hit.point(), None);
    }

    #[test]
    fn oblique_ray_hits_offset_plane() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let hit = line_vs_plane(Vec3::new(0.0, 4.0, 0.0), d, Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        let p = hit.point().expect("oblique ray must hit");
        assert!(p.abs_diff_eq(Vec3::new(3.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn signed_angle_sign_follows_normal() {
        let a = signed_angle(Vec3::X, Vec3::Y, Vec3::Z);
        assert!((a - FRAC_PI_2).abs() < 1e-5);
        let b = signed_angle(Vec3::Y, Vec3::X, Vec3::Z);
        assert!((b + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn signed_angle_handles_parallel_inputs() {
        assert!(signed_angle(Vec3::X, Vec3::X, Vec3::Z).abs() < 1e-3);
        let opposite = signed_angle(Vec3::X, Vec3::NEG_X, Vec3::Z);
        assert!((opposite.abs() - PI).abs() < 1e-3);
    }

    #[test]
    fn restrict_angle_range_and_idempotence() {
        for x in [-1e-8_f32, -720.5, -360.0, -1.0, 0.0, 359.999, 360.0, 725.25, 1e6] {
            let r = restrict_angle(x);
            assert!((0.0..360.0).contains(&r), "{x} -> {r}");
            assert_eq!(restrict_angle(r), r);
        }
        assert!((restrict_angle(-90.0) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn clp2_rounds_up() {
        assert_eq!(clp2(0), 0);
        assert_eq!(clp2(1), 1);
        assert_eq!(clp2(3), 4);
        assert_eq!(clp2(64), 64);
        assert_eq!(clp2(65), 128);
        assert_eq!(clp2(u32::MAX), 0);
    }

    #[test]
    fn signed_distance_on_unit_plane() {
        let plane = Vec4::new(0.0, 1.0, 0.0, -2.0);
        assert!((signed_distance(plane, Vec3::new(5.0, 3.0, 1.0)) - 1.0).abs() < 1e-6);
        assert!((signed_distance(plane, Vec3::ZERO) + 2.0).abs() < 1e-6);
    }

    #[test]
    fn ndc_mapping_rejects_outside() {
        let size = Vec2::new(200.0, 100.0);
        assert_eq!(pixel_to_ndc(Vec2::new(100.0, 50.0), size), Some(Vec2::ZERO));
        assert_eq!(pixel_to_ndc(Vec2::new(0.0, 0.0), size), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(pixel_to_ndc(Vec2::new(201.0, 50.0), size), None);
        assert_eq!(pixel_to_ndc(Vec2::new(10.0, 10.0), Vec2::ZERO), None);
    }

    #[test]
    fn ray_sphere_hit_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray.intersect_sphere(Vec3::ZERO, 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
        assert!(ray.at(t).abs_diff_eq(Vec3::Z, 1e-5));
        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
        assert!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 20.0), 1.0).is_none());
    }
}
