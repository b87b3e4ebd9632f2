//! Graphics backend contract

use crate::error::RenderError;
use crate::frame_graph::RenderPass;

/// Per-frame counters maintained by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCounters {
    pub draw_calls: u32,
    pub primitives: u32,
    pub passes: u32,
}

/// The graphics device as seen by the frame loop.
///
/// `frame_start` resets the per-frame counters; they stay readable after `frame_end`
/// until the next frame starts.
pub trait RenderBackend {
    /// Per-frame housekeeping run during the update phase
    fn update(&mut self) {}

    fn frame_start(&mut self);

    fn frame_end(&mut self);

    /// True while the device context is lost. Frames keep being scheduled but do no work.
    fn is_context_lost(&self) -> bool;

    fn counters(&self) -> BackendCounters;

    fn execute_pass(&mut self, pass: &RenderPass) -> Result<(), RenderError>;
}
