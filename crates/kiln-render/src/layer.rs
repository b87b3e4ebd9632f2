//! Layer compositions: the ordered input of the render pipeline

use std::collections::BTreeMap;

pub type LayerId = u32;

/// Where a layer renders to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Backbuffer,
    Offscreen(String),
}

/// One drawable in a layer
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub label: String,
    /// Items sharing a key may be merged by batching
    pub batch_key: Option<u64>,
    pub primitives: u32,
    /// Whether the item intersects the view
    pub in_view: bool,
}

impl DrawItem {
    pub fn new(label: impl Into<String>, primitives: u32) -> Self {
        Self {
            label: label.into(),
            batch_key: None,
            primitives,
            in_view: true,
        }
    }

    pub fn with_batch_key(mut self, key: u64) -> Self {
        self.batch_key = Some(key);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.in_view = false;
        self
    }
}

/// A render layer
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub enabled: bool,
    pub target: RenderTarget,
    /// Clear the target before drawing this layer
    pub clear: bool,
    pub items: Vec<DrawItem>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            target: RenderTarget::Backbuffer,
            clear: false,
            items: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: RenderTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn with_item(mut self, item: DrawItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Ordered list of layers. Order is draw order.
#[derive(Debug, Clone, Default)]
pub struct LayerComposition {
    layers: Vec<Layer>,
}

impl LayerComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer, replacing any layer with the same id in place
    pub fn push(&mut self, layer: Layer) {
        match self.layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        Some(self.layers.remove(index))
    }

    pub fn set_enabled(&mut self, id: LayerId, enabled: bool) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Enabled layers in draw order
    pub fn enabled(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.enabled)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Output of the cull & prepare pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CullResult {
    /// Indices of visible items per enabled layer
    pub visible: BTreeMap<LayerId, Vec<usize>>,
    /// Atlas slot per layer that has something to draw
    pub atlas: BTreeMap<LayerId, u32>,
}

impl CullResult {
    pub fn visible_count(&self, layer: LayerId) -> usize {
        self.visible.get(&layer).map_or(0, Vec::len)
    }

    pub fn total_visible(&self) -> usize {
        self.visible.values().map(Vec::len).sum()
    }
}
