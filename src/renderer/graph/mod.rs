//! Render graph organisation
//!
//! Provides:
//! - [`FrameTargets`]: per-resolution G-buffer, SSAO, HDR and bloom targets
//! - [`RenderLists`]: per-frame data extracted from the registry
//! - shadow slot allocation and the shadow map arrays
//! - [`RenderGraph`] / [`RenderNode`]: the ordered pass executor
//! - [`PrepareContext`] / [`ExecuteContext`]: phase-separated pass contexts
//! - one node per deferred pass in [`passes`]

pub mod context;
pub mod extracted;
pub mod frame;
pub mod graph;
pub mod node;
pub mod passes;
pub mod shadow_utils;

pub use context::{ExecuteContext, PrepareContext, SkyboxBinding};
pub use extracted::{DrawItem, GeometryProgram, GizmoItem, RenderLists};
pub use frame::{FrameTarget, FrameTargets};
pub use graph::RenderGraph;
pub use node::RenderNode;
pub use shadow_utils::{ShadowAllocation, ShadowMaps, ShadowSlot, allocate_shadow_slots};
