//! Editor Controller
//!
//! Keyboard-driven stand-in for an inspector UI. Each key maps to an
//! [`EditorCommand`], and [`EditorController::apply`] turns the command into
//! registry or renderer-setting mutations. Nothing here touches a window or
//! the GPU, so the whole command table is testable headless.
//!
//! | Key          | Command                                               |
//! |--------------|-------------------------------------------------------|
//! | 1 / 2        | add a cube / sphere entity                            |
//! | 3 / 4 / 5    | add a directional / point / spot light                |
//! | M            | add a colour material, assign it to the selection     |
//! | Tab          | select the next entity                                |
//! | C            | select the next component of the selected entity      |
//! | Delete       | remove the selected entity                            |
//! | Backspace    | remove the most recent light                          |
//! | L            | toggle every light gizmo                              |
//! | H            | toggle visibility of the selected entity              |
//! | + / -        | refine / coarsen the selected sphere                  |
//! | B / O        | toggle bloom / SSAO                                   |
//! | T            | cycle the tone-mapping operator                       |
//! | Esc          | quit                                                  |

use glam::Vec2;

use crate::registry::{EntityHandle, ResourceRegistry};
use crate::renderer::RendererSettings;
use crate::resources::MeshType;
use crate::scene::{Camera, CameraMovement, LightType};

use super::input::{Input, Key, MouseButton};

/// Sector and stack increment applied by one `+`/`-` press.
pub const TESSELLATION_STEP: i32 = 4;

/// A single editor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    AddPrimitive(MeshType),
    AddLight(LightType),
    AddColorMaterial,
    SelectNextEntity,
    SelectNextComponent,
    RemoveSelectedEntity,
    RemoveLastLight,
    ToggleLightGizmos,
    ToggleSelectedVisibility,
    /// Adds the step to both sector and stack counts of the selected sphere.
    ChangeTessellation(i32),
    ToggleBloom,
    ToggleSsao,
    CycleToneMapping,
    Quit,
}

impl EditorCommand {
    /// The command bound to `key`, if any.
    #[must_use]
    pub fn from_key(key: Key) -> Option<Self> {
        let command = match key {
            Key::Key1 => Self::AddPrimitive(MeshType::Cube),
            Key::Key2 => Self::AddPrimitive(MeshType::Sphere),
            Key::Key3 => Self::AddLight(LightType::Directional),
            Key::Key4 => Self::AddLight(LightType::Point),
            Key::Key5 => Self::AddLight(LightType::Spot),
            Key::M => Self::AddColorMaterial,
            Key::Tab => Self::SelectNextEntity,
            Key::C => Self::SelectNextComponent,
            Key::Delete => Self::RemoveSelectedEntity,
            Key::Backspace => Self::RemoveLastLight,
            Key::L => Self::ToggleLightGizmos,
            Key::H => Self::ToggleSelectedVisibility,
            Key::Plus => Self::ChangeTessellation(TESSELLATION_STEP),
            Key::Minus => Self::ChangeTessellation(-TESSELLATION_STEP),
            Key::B => Self::ToggleBloom,
            Key::O => Self::ToggleSsao,
            Key::T => Self::CycleToneMapping,
            Key::Escape => Self::Quit,
            Key::W | Key::A | Key::S | Key::D | Key::ControlLeft | Key::ControlRight => return None,
        };
        Some(command)
    }
}

/// What the application loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Quit,
}

/// Applies editor commands and camera input.
#[derive(Debug, Clone, Default)]
pub struct EditorController {
    commands_applied: u64,
}

impl EditorController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands applied so far.
    #[must_use]
    pub fn commands_applied(&self) -> u64 {
        self.commands_applied
    }

    /// Applies every key pressed this frame, in press order.
    pub fn handle_keys(
        &mut self,
        input: &Input,
        registry: &mut ResourceRegistry,
        settings: &mut RendererSettings,
    ) -> CommandOutcome {
        for command in input.keys_down().iter().filter_map(|&key| EditorCommand::from_key(key)) {
            if self.apply(command, registry, settings) == CommandOutcome::Quit {
                return CommandOutcome::Quit;
            }
        }
        CommandOutcome::Continue
    }

    /// Executes one command.
    pub fn apply(
        &mut self,
        command: EditorCommand,
        registry: &mut ResourceRegistry,
        settings: &mut RendererSettings,
    ) -> CommandOutcome {
        self.commands_applied += 1;
        log::debug!("Editor command: {command:?}");

        match command {
            EditorCommand::AddPrimitive(mesh_type) => {
                let handle = registry.add_entity(mesh_type);
                registry.select_entity(Some(handle));
            }
            EditorCommand::AddLight(light_type) => {
                registry.add_light(light_type);
            }
            EditorCommand::AddColorMaterial => {
                let material = registry.add_material(true, []);
                if let Some(selection) = registry.selection() {
                    registry.set_component_material(selection.entity, selection.component_index, material);
                }
            }
            EditorCommand::SelectNextEntity => {
                let next = next_entity(registry, registry.selected_entity());
                registry.select_entity(next);
            }
            EditorCommand::SelectNextComponent => {
                if let Some(selection) = registry.selection() {
                    let count = registry.entity(selection.entity).components.len();
                    if count > 0 {
                        registry.select_component((selection.component_index + 1) % count);
                    }
                }
            }
            EditorCommand::RemoveSelectedEntity => {
                if let Some(handle) = registry.selected_entity() {
                    registry.remove_entity(handle);
                }
            }
            EditorCommand::RemoveLastLight => {
                if let Some(handle) = registry.lights_by_creation().map(|(handle, _)| handle).last() {
                    registry.remove_light(handle);
                }
            }
            EditorCommand::ToggleLightGizmos => {
                let show = registry.lights().all(|(_, light)| !light.visible);
                let handles: Vec<_> = registry.lights().map(|(handle, _)| handle).collect();
                for handle in handles {
                    registry.light_mut(handle).visible = show;
                }
            }
            EditorCommand::ToggleSelectedVisibility => {
                if let Some(handle) = registry.selected_entity() {
                    let entity = registry.entity_mut(handle);
                    entity.visible = !entity.visible;
                }
            }
            EditorCommand::ChangeTessellation(step) => {
                if let Some((_, component)) = registry.selected_component() {
                    let mesh = component.mesh;
                    if let Some(current) = registry.mesh(mesh).tessellation() {
                        let sectors = current.sectors.saturating_add_signed(step);
                        let stacks = current.stacks.saturating_add_signed(step);
                        registry.set_sphere_tessellation(mesh, sectors, stacks);
                    }
                }
            }
            EditorCommand::ToggleBloom => {
                let enabled = !settings.bloom.enabled;
                settings.bloom.set_enabled(enabled);
                log::info!("Bloom {}", if enabled { "enabled" } else { "disabled" });
            }
            EditorCommand::ToggleSsao => {
                let enabled = !settings.ssao.enabled;
                settings.ssao.set_enabled(enabled);
                log::info!("SSAO {}", if enabled { "enabled" } else { "disabled" });
            }
            EditorCommand::CycleToneMapping => {
                let mode = settings.tone_mapping.mode.next();
                settings.tone_mapping.set_mode(mode);
                log::info!("Tone mapping: {}", mode.name());
            }
            EditorCommand::Quit => return CommandOutcome::Quit,
        }
        CommandOutcome::Continue
    }

    /// Fly-camera update: WASD moves (Ctrl doubles the speed), dragging with
    /// the left button rotates, scrolling zooms.
    pub fn update_camera(&self, camera: &mut Camera, input: &Input, dt: f32) {
        let fast = input.ctrl();
        for (key, movement) in [
            (Key::W, CameraMovement::Forward),
            (Key::S, CameraMovement::Backward),
            (Key::A, CameraMovement::Left),
            (Key::D, CameraMovement::Right),
        ] {
            if input.key(key) {
                camera.process_movement(movement, fast, dt);
            }
        }

        let delta = input.mouse_delta();
        if input.mouse_button(MouseButton::Left) && delta != Vec2::ZERO {
            // Dragging pulls the scene along with the cursor.
            camera.process_rotation(-delta.x, -delta.y);
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            camera.process_zoom(scroll);
        }
    }
}

/// The entity after `current` in handle order, wrapping around.
fn next_entity(registry: &ResourceRegistry, current: Option<EntityHandle>) -> Option<EntityHandle> {
    let mut handles = registry.entities().map(|(handle, _)| handle);
    match current {
        None => handles.next(),
        Some(current) => {
            let all: Vec<_> = handles.collect();
            all.iter()
                .copied()
                .find(|&h| h > current)
                .or_else(|| all.first().copied())
        }
    }
}
