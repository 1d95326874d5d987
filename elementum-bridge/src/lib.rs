//! Elementum application crate.
//!
//! Everything except the window lives here so it builds and tests without a
//! GPU. The native front end is behind the `window` feature.

pub mod config;
pub mod controller;
pub mod frame_loop;
pub mod module;
pub mod platform;
pub mod util;

#[cfg(feature = "window")]
mod gfx;
#[cfg(feature = "window")]
pub mod shell;

pub use config::{Cli, Config};
pub use controller::{BootState, Completion, Controller};
pub use frame_loop::{FrameLoop, FrameReport, FrameSink};
pub use module::{ModuleSource, WasmFile};
pub use platform::{Platform, RecordingPlatform};
