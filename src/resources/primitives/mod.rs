pub mod box_shape;
pub mod sphere;

pub use box_shape::create_cube;
pub use sphere::{SphereTessellation, create_sphere};
