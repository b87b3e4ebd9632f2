//! Headless backend that records passes instead of submitting GPU work

use crate::backend::{BackendCounters, RenderBackend};
use crate::error::RenderError;
use crate::frame_graph::RenderPass;

/// Offscreen backend for headless runs and tests.
///
/// Counts draws and primitives per frame and keeps the names of the passes executed in the
/// current frame.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub width: u32,
    pub height: u32,
    counters: BackendCounters,
    executed: Vec<String>,
    frames_started: u64,
    frames_completed: u64,
    updates: u64,
    in_frame: bool,
    context_lost: bool,
}

impl HeadlessBackend {
    /// Create a new headless backend with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Simulate losing or restoring the device context
    pub fn set_context_lost(&mut self, lost: bool) {
        if lost != self.context_lost {
            if lost {
                log::warn!("headless backend: context lost");
            } else {
                log::info!("headless backend: context restored");
            }
        }
        self.context_lost = lost;
    }

    /// Names of the passes executed since the last `frame_start`
    pub fn executed_passes(&self) -> &[String] {
        &self.executed
    }

    pub fn frames_started(&self) -> u64 {
        self.frames_started
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Number of per-frame `update` calls
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl RenderBackend for HeadlessBackend {
    fn update(&mut self) {
        self.updates += 1;
    }

    fn frame_start(&mut self) {
        self.counters = BackendCounters::default();
        self.executed.clear();
        self.frames_started += 1;
        self.in_frame = true;
    }

    fn frame_end(&mut self) {
        if self.in_frame {
            self.frames_completed += 1;
        }
        self.in_frame = false;
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    fn counters(&self) -> BackendCounters {
        self.counters
    }

    fn execute_pass(&mut self, pass: &RenderPass) -> Result<(), RenderError> {
        if self.context_lost {
            return Err(RenderError::ContextLost);
        }
        if !self.in_frame {
            return Err(RenderError::PassFailed {
                pass: pass.name.clone(),
                message: "executed outside frame_start/frame_end".to_string(),
            });
        }
        self.counters.draw_calls = self.counters.draw_calls.saturating_add(pass.draw_calls);
        self.counters.primitives = self.counters.primitives.saturating_add(pass.primitives);
        self.counters.passes += 1;
        self.executed.push(pass.name.clone());
        Ok(())
    }
}
