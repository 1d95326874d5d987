use std::path::PathBuf;
use std::sync::Arc;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use tracing::warn;
use winit::window::Window;

use crate::platform::Platform;

const STATE_FILTER: (&str, &[&str]) = ("Elementum state", &["elem"]);

/// rfd dialogs, the arboard clipboard and the window title.
#[derive(Default)]
pub struct NativePlatform {
    window: Option<Arc<Window>>,
    clipboard: Option<arboard::Clipboard>,
}

impl NativePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_window(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }
}

impl Platform for NativePlatform {
    fn alert(&mut self, message: &str) {
        let _ = MessageDialog::new()
            .set_title("Elementum")
            .set_description(message)
            .set_level(MessageLevel::Warning)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn copy_text(&mut self, text: &str) -> bool {
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(c) => self.clipboard = Some(c),
                Err(e) => {
                    warn!(error = %e, "clipboard unavailable");
                    return false;
                }
            }
        }
        match self.clipboard.as_mut().map(|c| c.set_text(text.to_string())) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                warn!(error = %e, "copy to clipboard failed");
                false
            }
            None => false,
        }
    }

    fn pick_open(&mut self) -> Option<PathBuf> {
        FileDialog::new()
            .add_filter(STATE_FILTER.0, STATE_FILTER.1)
            .pick_file()
    }

    fn pick_save(&mut self, default_name: &str) -> Option<PathBuf> {
        FileDialog::new()
            .add_filter(STATE_FILTER.0, STATE_FILTER.1)
            .set_file_name(default_name)
            .save_file()
    }

    fn set_location(&mut self, path: &str) {
        if let Some(w) = &self.window {
            w.set_title(&format!("Elementum {path}"));
        }
    }
}
