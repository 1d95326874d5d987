use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::error::ShareError;
use crate::location;

/// Endpoint path, relative to the share base URL.
pub const SHARE_ENDPOINT: &str = "elementumstate.emb";

/// Where shared snapshots go and come back from.
#[async_trait]
pub trait ShareBackend: Send + Sync {
    /// Uploads `snapshot` and returns the server-issued id.
    async fn upload(&self, snapshot: Vec<u8>) -> Result<String, ShareError>;

    /// `Ok(None)` when the server has nothing (non-success status or an
    /// empty body).
    async fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>, ShareError>;
}

pub struct HttpShareClient {
    http: Client,
    base_url: String,
}

impl HttpShareClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, SHARE_ENDPOINT)
    }

    /// Full link a shared snapshot can be opened from.
    pub fn link_for(&self, id: &str) -> String {
        format!("{}{}", self.base_url, location::share_path(id))
    }
}

#[async_trait]
impl ShareBackend for HttpShareClient {
    async fn upload(&self, snapshot: Vec<u8>) -> Result<String, ShareError> {
        let len = snapshot.len();
        let resp = self
            .http
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header("Content-Size", len.to_string())
            .body(snapshot)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "share upload failed to send");
                ShareError::Unknown(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "share upload rejected");
            return Err(ShareError::from_status(status.as_u16()));
        }

        let id = resp
            .text()
            .await
            .map_err(|e| ShareError::Unknown(e.to_string()))?
            .trim()
            .to_string();
        info!(bytes = len, %id, "snapshot shared");
        Ok(id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Vec<u8>>, ShareError> {
        let mut url =
            Url::parse(&self.endpoint()).map_err(|e| ShareError::Unknown(e.to_string()))?;
        url.query_pairs_mut().append_pair("f", id);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ShareError::Unknown(e.to_string()))?;
        if !resp.status().is_success() {
            debug!(status = resp.status().as_u16(), id, "no shared snapshot");
            return Ok(None);
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| ShareError::Unknown(e.to_string()))?;
        if body.is_empty() {
            return Ok(None);
        }
        debug!(bytes = body.len(), id, "shared snapshot fetched");
        Ok(Some(body.to_vec()))
    }
}
