//! Cinder Core - Foundational types for the Cinder particle engine
//!
//! This crate provides the core types that all other Cinder crates depend on:
//! - `Vec3` - Spatial vector math
//! - `Color` - RGBA color
//! - Error types and Result alias

mod error;
mod types;

pub use error::{CinderError, Result};
pub use types::{Color, Vec3};
