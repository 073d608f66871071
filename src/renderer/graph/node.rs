//! Render node trait.
//!
//! Each node is one pass of the deferred pipeline.

use super::context::{ExecuteContext, PrepareContext};

/// A single pass in the render graph.
///
/// - `prepare` receives the mutable [`PrepareContext`]: compile pipelines,
///   rebuild bind groups, upload pass-local uniforms.
/// - `run` receives the read-only [`ExecuteContext`] and records commands.
///
/// All mutation belongs in `prepare`; `run` must not allocate GPU objects.
pub trait RenderNode {
    /// Node name, used for debug groups and logging.
    fn name(&self) -> &str;

    fn prepare(&mut self, _ctx: &mut PrepareContext) {}

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}
