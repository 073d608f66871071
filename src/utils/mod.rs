//! Utilities.
//!
//! - [`FpsCounter`]: frame rate sampled once per second

pub mod fps_counter;

pub use fps_counter::FpsCounter;
