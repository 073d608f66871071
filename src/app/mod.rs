//! Editor shell: input state, the keyboard controller and (with the `winit`
//! feature) the windowed application.

pub mod controller;
pub mod input;
#[cfg(feature = "winit")]
pub mod winit;

pub use controller::{CommandOutcome, EditorCommand, EditorController};
pub use input::{ButtonState, Input, Key, MouseButton};
#[cfg(feature = "winit")]
pub use self::winit::App;
