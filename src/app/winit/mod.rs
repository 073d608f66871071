//! Winit-based editor shell
//!
//! [`App`] opens a window, builds the [`Renderer`] and the startup scene from
//! an [`EditorConfig`], then drives the loop:
//!
//! 1. window events are translated into [`Input`]
//! 2. on redraw, the [`EditorController`] applies key commands and moves the
//!    camera
//! 3. the renderer draws the registry
//! 4. once per second the window title shows the frame rate
//!
//! # Example
//!
//! ```rust,ignore
//! use umbra::app::winit::App;
//! use umbra::config::EditorConfig;
//!
//! fn main() -> umbra::errors::Result<()> {
//!     App::new(EditorConfig::from_args()?).run()
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::app::controller::{CommandOutcome, EditorController};
use crate::app::input::Input;
use crate::assets::ObjImporter;
use crate::config::EditorConfig;
use crate::errors::Result;
use crate::registry::ResourceRegistry;
use crate::renderer::Renderer;
use crate::scene::Camera;
use crate::utils::FpsCounter;

pub mod input_adapter;

/// Editor application builder.
pub struct App {
    config: EditorConfig,
}

impl App {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Overrides the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Runs the editor until the window is closed or Esc is pressed.
    ///
    /// Blocks the calling thread; the event loop owns it.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            config: self.config,
            state: None,
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Everything that exists once the window is up.
struct EditorState {
    window: Arc<Window>,
    renderer: Renderer,
    registry: ResourceRegistry,
    camera: Camera,
    controller: EditorController,
    input: Input,
    fps_counter: FpsCounter,
    last_loop_time: Instant,
}

impl EditorState {
    fn new(window: Arc<Window>, config: &EditorConfig) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let mut renderer = pollster::block_on(Renderer::new(
            window.clone(),
            config.renderer.clone(),
            width,
            height,
        ))?;
        if let Some(faces) = &config.skybox {
            renderer.set_skybox(faces.as_slice());
        }

        let mut registry = ResourceRegistry::new();
        config.populate(&mut registry, &ObjImporter);

        let camera = Camera::new(
            Vec3::from_array(config.camera_position),
            width as f32 / height as f32,
        );

        let mut input = Input::new();
        input.inject_resize(width, height);

        Ok(Self {
            window,
            renderer,
            registry,
            camera,
            controller: EditorController::new(),
            input,
            fps_counter: FpsCounter::new(),
            last_loop_time: Instant::now(),
        })
    }

    fn update(&mut self) -> CommandOutcome {
        let now = Instant::now();
        let dt = now.duration_since(self.last_loop_time).as_secs_f32();
        self.last_loop_time = now;

        let outcome = self
            .controller
            .handle_keys(&self.input, &mut self.registry, self.renderer.settings_mut());
        self.controller.update_camera(&mut self.camera, &self.input, dt);
        self.input.end_frame();
        outcome
    }

    fn render(&mut self, title: &str) {
        self.renderer.render(&self.registry, &self.camera);

        if let Some(fps) = self.fps_counter.update() {
            self.window.set_title(&format!("{title} | FPS: {fps:.1}"));
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.camera.set_aspect(width, height);
    }
}

/// Implements winit's `ApplicationHandler` for the editor.
struct AppRunner {
    config: EditorConfig,
    state: Option<EditorState>,
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                f64::from(self.config.width),
                f64::from(self.config.height),
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Initializing Renderer Backend...");

        match EditorState::new(window, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Fatal Renderer Error: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        input_adapter::process_window_event(&mut state.input, &event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                state.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                if state.update() == CommandOutcome::Quit {
                    event_loop.exit();
                    return;
                }
                state.render(&self.config.title);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
