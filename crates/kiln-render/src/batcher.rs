//! Draw call batching

use crate::layer::{DrawItem, LayerComposition};

/// Merges compatible draw items before culling
pub trait Batcher {
    /// Returns the number of items removed by merging
    fn batch(&mut self, composition: &mut LayerComposition) -> usize;
}

/// Merges items of a layer that share a batch key into the first of them
#[derive(Debug, Default)]
pub struct StaticBatcher {
    merged_total: usize,
}

impl StaticBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items merged over the batcher's lifetime
    pub fn merged_total(&self) -> usize {
        self.merged_total
    }
}

impl Batcher for StaticBatcher {
    fn batch(&mut self, composition: &mut LayerComposition) -> usize {
        let mut merged = 0;
        for layer in composition.layers_mut() {
            let mut out: Vec<DrawItem> = Vec::with_capacity(layer.items.len());
            for item in layer.items.drain(..) {
                let existing = item
                    .batch_key
                    .and_then(|key| out.iter().position(|o| o.batch_key == Some(key)));
                match existing {
                    Some(index) => {
                        let batch = &mut out[index];
                        batch.primitives = batch.primitives.saturating_add(item.primitives);
                        batch.in_view |= item.in_view;
                        merged += 1;
                    }
                    None => out.push(item),
                }
            }
            layer.items = out;
        }
        if merged > 0 {
            log::debug!("batched {} draw items", merged);
        }
        self.merged_total += merged;
        merged
    }
}
