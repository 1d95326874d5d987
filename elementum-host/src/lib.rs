//! Host engine boundary.
//!
//! The simulation runs as a WebAssembly module. This crate instantiates it
//! (`wasm_host`), describes what the UI may ask of it (`engine`), and keeps
//! typed views over its linear memory valid across growth (`bridge`, `link`).

pub mod bridge;
pub mod engine;
pub mod error;
pub mod link;
pub mod memory;
pub mod wasm_host;

pub use bridge::{Addressing, MemoryBridge, ViewDescriptor, ViewHandle, FRAMEBUFFER_EXPORT};
pub use engine::HostEngine;
pub use error::HostError;
pub use link::HostLink;
pub use memory::{ForeignMemory, LinearMemory};
pub use wasm_host::{WasmEngine, WasmHost};
