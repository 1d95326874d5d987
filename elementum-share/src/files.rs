//! Snapshot files on disk.

use std::path::{Path, PathBuf};

use tracing::info;

pub const SNAPSHOT_EXTENSION: &str = "elem";
pub const DEFAULT_FILE_NAME: &str = "state.elem";

/// `path` with the `.elem` extension, replacing whatever it had.
pub fn with_snapshot_extension(path: &Path) -> PathBuf {
    path.with_extension(SNAPSHOT_EXTENSION)
}

pub async fn write_snapshot(path: &Path, snapshot: &[u8]) -> std::io::Result<PathBuf> {
    let path = with_snapshot_extension(path);
    tokio::fs::write(&path, snapshot).await?;
    info!(path = %path.display(), bytes = snapshot.len(), "snapshot exported");
    Ok(path)
}

/// Reads the whole file; the host decides whether the bytes are usable.
pub async fn read_snapshot(path: &Path) -> std::io::Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await?;
    info!(path = %path.display(), bytes = bytes.len(), "snapshot file read");
    Ok(bytes)
}
