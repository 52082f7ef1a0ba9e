//! Runtime system trait

use crate::FrameContext;
use cinder_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order, once per frame, with the
/// frame's context. Each `update` runs to completion before the host reads
/// the system's output.
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self) -> Result<()>;

    /// Called once per frame
    fn update(&mut self, frame: &FrameContext) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
