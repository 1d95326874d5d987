//! Native window: winit lifecycle, pointer translation, desktop services.

mod app;
mod events;
mod platform;

pub use app::run;
pub use events::PointerTracker;
pub use platform::NativePlatform;
