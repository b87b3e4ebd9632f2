//! Frame graph: the ordered list of passes executed for one frame

use crate::backend::RenderBackend;
use crate::error::RenderError;
use crate::layer::RenderTarget;

/// A single render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    pub name: String,
    pub target: RenderTarget,
    pub clear: bool,
    pub draw_calls: u32,
    pub primitives: u32,
}

impl RenderPass {
    pub fn new(name: impl Into<String>, target: RenderTarget) -> Self {
        Self {
            name: name.into(),
            target,
            clear: false,
            draw_calls: 0,
            primitives: 0,
        }
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn with_draws(mut self, draw_calls: u32, primitives: u32) -> Self {
        self.draw_calls = draw_calls;
        self.primitives = primitives;
        self
    }

    /// A pass that neither clears nor draws does nothing
    pub fn is_empty(&self) -> bool {
        !self.clear && self.draw_calls == 0
    }
}

/// Ordered passes for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameGraph {
    passes: Vec<RenderPass>,
    compiled: bool,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pass(&mut self, pass: RenderPass) {
        self.passes.push(pass);
        self.compiled = false;
    }

    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Drop empty passes, then merge each pass into its predecessor when both render to the
    /// same target and the later one does not clear.
    pub fn compile(&mut self) {
        let mut compiled: Vec<RenderPass> = Vec::with_capacity(self.passes.len());
        for pass in self.passes.drain(..).filter(|p| !p.is_empty()) {
            match compiled.last_mut() {
                Some(prev) if prev.target == pass.target && !pass.clear => {
                    prev.name = format!("{}+{}", prev.name, pass.name);
                    prev.draw_calls = prev.draw_calls.saturating_add(pass.draw_calls);
                    prev.primitives = prev.primitives.saturating_add(pass.primitives);
                }
                _ => compiled.push(pass),
            }
        }
        self.passes = compiled;
        self.compiled = true;
    }

    /// Run every pass against the backend in order. Stops at the first failure.
    pub fn execute(&self, backend: &mut dyn RenderBackend) -> Result<usize, RenderError> {
        if !self.compiled {
            return Err(RenderError::FrameGraph(
                "frame graph executed before compile".to_string(),
            ));
        }
        for pass in &self.passes {
            backend.execute_pass(pass)?;
        }
        Ok(self.passes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;

    fn offscreen(name: &str) -> RenderTarget {
        RenderTarget::Offscreen(name.to_string())
    }

    #[test]
    fn test_compile_drops_empty_passes() {
        let mut graph = FrameGraph::new();
        graph.add_pass(RenderPass::new("sky", RenderTarget::Backbuffer).with_clear(true));
        graph.add_pass(RenderPass::new("empty", offscreen("shadow")));
        graph.add_pass(RenderPass::new("world", offscreen("hdr")).with_draws(2, 20));
        graph.compile();

        let names: Vec<_> = graph.passes().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sky", "world"]);
    }

    #[test]
    fn test_compile_merges_same_target() {
        let mut graph = FrameGraph::new();
        graph.add_pass(
            RenderPass::new("world", RenderTarget::Backbuffer)
                .with_clear(true)
                .with_draws(4, 40),
        );
        graph.add_pass(RenderPass::new("decals", RenderTarget::Backbuffer).with_draws(1, 2));
        graph.add_pass(
            RenderPass::new("ui", RenderTarget::Backbuffer)
                .with_clear(true)
                .with_draws(1, 2),
        );
        graph.compile();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.passes()[0].name, "world+decals");
        assert_eq!(graph.passes()[0].draw_calls, 5);
        assert_eq!(graph.passes()[1].name, "ui");
    }

    #[test]
    fn test_merged_counts_saturate() {
        let mut graph = FrameGraph::new();
        graph.add_pass(
            RenderPass::new("terrain", RenderTarget::Backbuffer)
                .with_clear(true)
                .with_draws(u32::MAX - 1, u32::MAX),
        );
        graph.add_pass(RenderPass::new("foliage", RenderTarget::Backbuffer).with_draws(5, 10));
        graph.compile();

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.passes()[0].draw_calls, u32::MAX);
        assert_eq!(graph.passes()[0].primitives, u32::MAX);
    }

    #[test]
    fn test_different_targets_not_merged() {
        let mut graph = FrameGraph::new();
        graph.add_pass(RenderPass::new("shadow", offscreen("shadow")).with_draws(3, 30));
        graph.add_pass(RenderPass::new("world", RenderTarget::Backbuffer).with_draws(3, 30));
        graph.compile();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_execute_requires_compile() {
        let mut backend = HeadlessBackend::new(1, 1);
        let mut graph = FrameGraph::new();
        graph.add_pass(RenderPass::new("world", RenderTarget::Backbuffer).with_draws(1, 1));
        assert!(matches!(
            graph.execute(&mut backend),
            Err(RenderError::FrameGraph(_))
        ));

        graph.compile();
        backend.frame_start();
        assert_eq!(graph.execute(&mut backend), Ok(1));
        assert_eq!(backend.counters().draw_calls, 1);
    }
}
