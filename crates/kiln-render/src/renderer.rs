//! Layer renderer: cull & prepare, then frame graph construction

use crate::frame_graph::{FrameGraph, RenderPass};
use crate::layer::{CullResult, LayerComposition};

/// Turns a layer composition into a frame graph in two strictly ordered steps
pub trait LayerRenderer {
    /// Visibility and atlas assignment for every enabled layer
    fn cull(&mut self, composition: &LayerComposition) -> CullResult;

    /// Build the passes for this frame from the composition and its cull result
    fn build_frame_graph(&mut self, composition: &LayerComposition, cull: &CullResult) -> FrameGraph;
}

/// One pass per enabled layer, drawing the visible items in layer order
#[derive(Debug, Default)]
pub struct ForwardRenderer {
    /// Atlas slots available for assignment each frame
    pub atlas_capacity: u32,
}

impl ForwardRenderer {
    pub fn new() -> Self {
        Self { atlas_capacity: 16 }
    }
}

impl LayerRenderer for ForwardRenderer {
    fn cull(&mut self, composition: &LayerComposition) -> CullResult {
        let mut result = CullResult::default();
        let mut next_slot = 0;
        for layer in composition.enabled() {
            let visible: Vec<usize> = layer
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.in_view)
                .map(|(i, _)| i)
                .collect();
            if !visible.is_empty() && next_slot < self.atlas_capacity {
                result.atlas.insert(layer.id, next_slot);
                next_slot += 1;
            }
            result.visible.insert(layer.id, visible);
        }
        result
    }

    fn build_frame_graph(&mut self, composition: &LayerComposition, cull: &CullResult) -> FrameGraph {
        let mut graph = FrameGraph::new();
        for layer in composition.enabled() {
            let visible = cull.visible.get(&layer.id).map(Vec::as_slice).unwrap_or(&[]);
            let primitives = visible
                .iter()
                .filter_map(|&i| layer.items.get(i))
                .map(|item| item.primitives)
                .sum();
            graph.add_pass(
                RenderPass::new(layer.name.clone(), layer.target.clone())
                    .with_clear(layer.clear)
                    .with_draws(visible.len() as u32, primitives),
            );
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{DrawItem, Layer};

    fn composition() -> LayerComposition {
        let mut comp = LayerComposition::new();
        comp.push(
            Layer::new(1, "world")
                .with_clear(true)
                .with_item(DrawItem::new("rock", 100))
                .with_item(DrawItem::new("tree", 50).hidden())
                .with_item(DrawItem::new("house", 300)),
        );
        comp.push(Layer::new(2, "debug").with_item(DrawItem::new("gizmo", 8)));
        comp.push(Layer::new(3, "ui").with_item(DrawItem::new("hud", 2).hidden()));
        comp
    }

    #[test]
    fn test_cull_skips_hidden_and_disabled() {
        let mut comp = composition();
        comp.set_enabled(2, false);
        let result = ForwardRenderer::new().cull(&comp);

        assert_eq!(result.visible.get(&1), Some(&vec![0, 2]));
        assert!(!result.visible.contains_key(&2));
        assert_eq!(result.visible_count(3), 0);
        assert_eq!(result.atlas.get(&1), Some(&0));
        assert!(!result.atlas.contains_key(&3));
    }

    #[test]
    fn test_build_uses_cull_result() {
        let comp = composition();
        let mut renderer = ForwardRenderer::new();
        let cull = renderer.cull(&comp);
        let graph = renderer.build_frame_graph(&comp, &cull);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.passes()[0].draw_calls, 2);
        assert_eq!(graph.passes()[0].primitives, 400);
        assert!(graph.passes()[2].is_empty());
    }

    #[test]
    fn test_atlas_capacity_limits_assignment() {
        let comp = composition();
        let mut renderer = ForwardRenderer { atlas_capacity: 1 };
        let result = renderer.cull(&comp);
        assert_eq!(result.atlas.len(), 1);
    }
}
