use crate::error::HostError;
use crate::memory::ForeignMemory;

/// What the presentation layer asks of the simulation.
///
/// Implemented over wasmtime by `WasmEngine`; tests use scripted fakes.
pub trait HostEngine {
    /// Initialization handshake: six random words, once, before anything else.
    fn seed(&mut self, seed: [u32; 6]) -> Result<(), HostError>;

    fn set_size(&mut self, width: u32, height: u32) -> Result<(), HostError>;

    /// Canvas size as the host sees it. May differ from the last `set_size`
    /// after a snapshot import.
    fn canvas_size(&mut self) -> Result<(u32, u32), HostError>;

    /// One simulation step.
    fn tick(&mut self) -> Result<(), HostError>;

    /// Render the current state into the framebuffer.
    fn draw(&mut self) -> Result<(), HostError>;

    fn change_scene(&mut self, scene: i32) -> Result<(), HostError>;

    /// Peak intensity observed during the last step.
    fn frame_peak(&mut self) -> Result<f32, HostError>;

    fn export_snapshot(&mut self) -> Result<Vec<u8>, HostError>;

    /// Returns whether the host accepted the snapshot. A rejected snapshot
    /// leaves the simulation as it was.
    fn import_snapshot(&mut self, bytes: &[u8]) -> Result<bool, HostError>;

    fn memory(&mut self) -> &mut dyn ForeignMemory;
}
