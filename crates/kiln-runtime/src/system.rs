//! Runtime system trait

use crate::app::AppHandle;
use crate::events::FrameEvent;
use kiln_core::Result;

/// A system driven by the application's lifecycle
///
/// Systems are initialized and updated in registration order and shut down in reverse.
/// `update` runs once per frame after input has been snapshotted; `post_update` runs after
/// every system's `update`.
pub trait RuntimeSystem {
    /// Called once during `start`
    fn initialize(&mut self, _app: &AppHandle) -> Result<()> {
        Ok(())
    }

    /// Called during `start` after every system has been initialized
    fn post_initialize(&mut self, _app: &AppHandle) -> Result<()> {
        Ok(())
    }

    /// Called once per frame
    fn update(&mut self, frame: &FrameEvent) -> Result<()>;

    /// Called once per frame after all systems have updated
    fn post_update(&mut self, _frame: &FrameEvent) -> Result<()> {
        Ok(())
    }

    /// Called when the application is destroyed
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
