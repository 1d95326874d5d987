use thiserror::Error;

/// Why a share upload or fetch failed. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("server rejected the snapshot as invalid (400)")]
    InvalidPayload,

    #[error("share rate limit hit (429)")]
    RateLimited,

    #[error("snapshot exceeds the upload size limit (413)")]
    TooLarge,

    /// Any other status, or no response at all.
    #[error("share failed: {0}")]
    Unknown(String),
}

impl ShareError {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ShareError::InvalidPayload,
            413 => ShareError::TooLarge,
            429 => ShareError::RateLimited,
            other => ShareError::Unknown(format!("status {other}")),
        }
    }

    /// Text for the blocking alert shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ShareError::InvalidPayload => "You tried to upload an invalid file!",
            ShareError::RateLimited => {
                "You have hit the rate limit, please wait at least 3 minutes and try again!"
            }
            ShareError::TooLarge => "The file you tried to upload exceeds the file-size limit!",
            ShareError::Unknown(_) => "An Unknown Error has occurred, please try again later!",
        }
    }
}
