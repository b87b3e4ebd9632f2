//! Kiln Render - Render pipeline orchestration
//!
//! This crate provides the graphics backend contract, layer compositions, the frame
//! graph, and the pipeline that turns a composition into executed passes each frame.
//! A headless backend is included for offscreen runs and tests.

mod backend;
mod batcher;
mod error;
mod frame_graph;
mod headless;
mod layer;
mod pipeline;
mod renderer;

pub use backend::{BackendCounters, RenderBackend};
pub use batcher::{Batcher, StaticBatcher};
pub use error::RenderError;
pub use frame_graph::{FrameGraph, RenderPass};
pub use headless::HeadlessBackend;
pub use layer::{CullResult, DrawItem, Layer, LayerComposition, LayerId, RenderTarget};
pub use pipeline::{Lightmapper, RenderPipeline, RenderSummary};
pub use renderer::{ForwardRenderer, LayerRenderer};
