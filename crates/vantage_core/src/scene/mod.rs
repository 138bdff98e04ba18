//! Scene registry: elements, handles and the scene bounding box.

pub mod world;

pub use world::{Element, ElementKind, EntityBuilder, Handle, World};
