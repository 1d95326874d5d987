use std::path::PathBuf;

use async_trait::async_trait;
use elementum_host::{HostEngine, HostError, WasmHost};
use tracing::info;

/// Produces the simulation engine. Runs on the tokio runtime; the result is
/// handed to the UI thread through the controller's completion channel.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    async fn load(&self) -> Result<Box<dyn HostEngine + Send>, HostError>;
}

/// A `.wasm` file on disk, compiled with wasmtime off the async workers.
pub struct WasmFile {
    path: PathBuf,
}

impl WasmFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModuleSource for WasmFile {
    async fn load(&self) -> Result<Box<dyn HostEngine + Send>, HostError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| HostError::Load(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), bytes = bytes.len(), "compiling host module");

        let engine = tokio::task::spawn_blocking(move || WasmHost::new()?.instantiate(&bytes))
            .await
            .map_err(|e| HostError::Load(format!("module compile task failed: {e}")))??;
        Ok(Box::new(engine))
    }
}
