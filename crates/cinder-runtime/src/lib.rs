//! Cinder Runtime - Frame loop infrastructure
//!
//! Provides the building blocks a host loop uses to drive simulation systems:
//! - `GameClock` — wall-clock or fixed-step frame timing
//! - `FrameContext` — everything a system reads from its environment each frame
//! - `RuntimeSystem` — trait for systems ticked by the loop

mod clock;
mod frame;
mod system;

pub use clock::GameClock;
pub use frame::FrameContext;
pub use system::RuntimeSystem;
