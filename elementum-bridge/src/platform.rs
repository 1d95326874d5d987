//! What the controller needs from the desktop: blocking alerts, the
//! clipboard, file pickers and somewhere to show the current location.

use std::path::PathBuf;

pub trait Platform {
    /// Blocking notification. Returns once the user dismissed it.
    fn alert(&mut self, message: &str);

    fn copy_text(&mut self, text: &str) -> bool;

    fn pick_open(&mut self) -> Option<PathBuf>;

    fn pick_save(&mut self, default_name: &str) -> Option<PathBuf>;

    fn set_location(&mut self, path: &str);
}

/// Records every request and answers file pickers from preset paths.
/// Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    pub alerts: Vec<String>,
    pub clipboard: Option<String>,
    pub location: Option<String>,
    pub open_path: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub save_requests: Vec<String>,
}

impl Platform for RecordingPlatform {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn copy_text(&mut self, text: &str) -> bool {
        self.clipboard = Some(text.to_string());
        true
    }

    fn pick_open(&mut self) -> Option<PathBuf> {
        self.open_path.clone()
    }

    fn pick_save(&mut self, default_name: &str) -> Option<PathBuf> {
        self.save_requests.push(default_name.to_string());
        self.save_path.clone()
    }

    fn set_location(&mut self, path: &str) {
        self.location = Some(path.to_string());
    }
}
