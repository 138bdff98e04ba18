//! vantage_core: transforms, bounding volumes, cameras and the transform
//! gizmo for the Vantage scene editor.
//!
//! Everything here is single-threaded CPU-side data.  Matrices and bounds
//! are cached behind `Cell`s and recomputed on read, so none of the types
//! are `Sync`.

pub mod bounds;
pub mod camera;
pub mod gizmo;
pub mod math;
pub mod object;
pub mod projection;
pub mod scene;
pub mod transform;

// input helper for keyboard / mouse state; needs winit
#[cfg(feature = "input")]
pub mod input;

pub use bounds::{BoundingBox, BoundingSphere, BoxGeometry, Geometry, LocalBounds, PointGeometry};
pub use camera::{Camera, FrustumPlane};
pub use gizmo::{GizmoAxis, GizmoOutcome, GizmoSession, GizmoSettings, TransformType};
pub use math::{PlaneIntersection, Ray};
pub use object::{Object2D, Object3D};
pub use projection::{Projection, ProjectionKind};
pub use scene::{Element, ElementKind, Handle, World};
pub use transform::{MatrixState, Transform};

// re-export common input types so callers don't need to depend on winit
#[cfg(feature = "input")]
pub use input::{InputState, KeyCode, MouseButton};

pub use glam;
