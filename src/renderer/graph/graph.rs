//! Render graph executor.
//!
//! A linear list of nodes, prepared and recorded in insertion order into a
//! single command encoder.

use super::context::{ExecuteContext, PrepareContext};
use super::node::RenderNode;

/// Ordered list of render nodes.
///
/// - Nodes run in the order they were added
/// - One `CommandEncoder` covers the whole graph, submitted once
/// - Every node is wrapped in a debug group
pub struct RenderGraph {
    nodes: Vec<Box<dyn RenderNode>>,
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Appends a node; nodes execute in the order they are added.
    #[inline]
    pub fn add_node(&mut self, node: Box<dyn RenderNode>) {
        self.nodes.push(node);
    }

    /// Chained form of [`add_node`](Self::add_node).
    #[inline]
    #[must_use]
    pub fn with_node(mut self, node: Box<dyn RenderNode>) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn prepare(&mut self, ctx: &mut PrepareContext) {
        for node in &mut self.nodes {
            node.prepare(ctx);
        }
    }

    /// Records every node and submits the frame.
    pub fn execute(&self, ctx: &ExecuteContext) {
        let mut encoder = ctx
            .wgpu_ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Graph Encoder"),
            });

        for node in &self.nodes {
            encoder.push_debug_group(node.name());
            node.run(ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        ctx.wgpu_ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Names of all nodes in execution order.
    #[must_use]
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
