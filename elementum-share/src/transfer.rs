//! Last-known-good cache and the share busy flag.
//!
//! Every method that touches the simulation takes the `HostLink`, so nothing
//! here works before the module is attached.

use elementum_host::{HostError, HostLink};
use tracing::{debug, info, warn};

use crate::error::ShareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The cached snapshot was imported.
    Restored,
    /// Nothing cached; the default scene was loaded instead.
    Reset,
    /// The host refused the cached snapshot. Nothing changed.
    Rejected,
}

#[derive(Debug, Default)]
pub struct StateTransfer {
    cache: Option<Vec<u8>>,
    uploading: bool,
}

impl StateTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export_state(&self, host: &mut HostLink) -> Result<Vec<u8>, HostError> {
        host.engine()?.export_snapshot()
    }

    /// Exports and caches. Returns the snapshot so callers that also write
    /// or upload it do not export twice.
    pub fn save(&mut self, host: &mut HostLink) -> Result<Vec<u8>, HostError> {
        let snapshot = self.export_state(host)?;
        debug!(bytes = snapshot.len(), "snapshot cached");
        self.cache = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub fn load(&mut self, host: &mut HostLink) -> Result<LoadOutcome, HostError> {
        match self.cache.clone() {
            Some(snapshot) => {
                if self.import_state(host, snapshot)? {
                    Ok(LoadOutcome::Restored)
                } else {
                    Ok(LoadOutcome::Rejected)
                }
            }
            None => {
                host.engine()?.change_scene(0)?;
                Ok(LoadOutcome::Reset)
            }
        }
    }

    /// Hands `snapshot` to the host. Only an accepted snapshot replaces the
    /// cache.
    pub fn import_state(&mut self, host: &mut HostLink, snapshot: Vec<u8>) -> Result<bool, HostError> {
        let accepted = host.engine()?.import_snapshot(&snapshot)?;
        if accepted {
            info!(bytes = snapshot.len(), "snapshot imported");
            self.cache = Some(snapshot);
        } else {
            warn!(bytes = snapshot.len(), "host rejected snapshot");
        }
        Ok(accepted)
    }

    pub fn cached(&self) -> Option<&[u8]> {
        self.cache.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Starts a share. Returns the snapshot to upload, or `None` when an
    /// upload is already outstanding.
    pub fn begin_share(&mut self, host: &mut HostLink) -> Result<Option<Vec<u8>>, HostError> {
        if self.uploading {
            debug!("share already in flight, ignored");
            return Ok(None);
        }
        let snapshot = self.save(host)?;
        self.uploading = true;
        Ok(Some(snapshot))
    }

    /// An error ends the share at once. A success keeps it busy until the
    /// success dialog is closed.
    pub fn finish_share(&mut self, outcome: &Result<String, ShareError>) {
        if let Err(e) = outcome {
            warn!(error = %e, "share failed");
            self.uploading = false;
        }
    }

    pub fn share_dialog_closed(&mut self) {
        self.uploading = false;
    }
}
