//! Core rendering primitives: camera and vertex record

pub mod camera;
pub mod vertex;

pub use camera::{Camera, ProjectionKind};
pub use vertex::Vertex;
