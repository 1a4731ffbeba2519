//! Backend abstraction layer
//!
//! Provides the GL ES trait the shaders are written against and its
//! implementations:
//!
//! - `recording` (always available): records every call, for tests and
//!   headless runs
//! - `glow_backend` (`glow-backend` feature): real GL ES through glow

pub mod recording;
pub mod traits;
pub mod types;

#[cfg(feature = "glow-backend")]
pub mod glow_backend;

pub use recording::{GlCommand, RecordingBackend};
pub use traits::*;
pub use types::*;

#[cfg(feature = "glow-backend")]
pub use glow_backend::GlowBackend;
