use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host module is not attached yet")]
    NotReady,

    #[error("export `{0}` is missing or has the wrong type")]
    MissingExport(String),

    #[error("{len} bytes at {offset:#x} exceed the {memory}-byte host memory")]
    OutOfBounds {
        offset: usize,
        len: usize,
        memory: usize,
    },

    /// Memory length changed since the view was built. Resolved inside the
    /// bridge by rebuilding every view; callers never see it.
    #[error("view predates a change of the host memory length")]
    ViewStale,

    #[error("unknown view handle")]
    UnknownView,

    #[error("view is not aligned for the requested element type")]
    Misaligned,

    #[error("host call `{name}` failed: {message}")]
    Call { name: String, message: String },

    #[error("failed to load host module: {0}")]
    Load(String),
}

impl HostError {
    pub(crate) fn call(name: &str, err: impl std::fmt::Display) -> Self {
        HostError::Call {
            name: name.to_string(),
            message: format!("{err:#}"),
        }
    }
}
