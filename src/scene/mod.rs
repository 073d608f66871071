//! Scene objects.
//!
//! - Entity / Component: placed mesh + material bindings
//! - Transform: position, Euler rotation (degrees), scale
//! - Light: directional, point and spot lights
//! - Camera: the editor's fly camera

pub mod camera;
pub mod entity;
pub mod light;
pub mod transform;

pub use camera::{Camera, CameraMovement};
pub use entity::{Component, Entity, EntityOrigin};
pub use light::{Attenuation, Light, LightKind, LightType};
pub use transform::Transform;
