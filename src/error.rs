use thiserror::Error;

/// Reference data (name to id mappings) could not be loaded from either the
/// local store or the remote list endpoint.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the statistics API. Legitimately empty answers get their own
/// variants so the controller can word the reply instead of guessing from a
/// message string.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("fetch failed: {reason}")]
    Failed { reason: String },

    #[error("no standings published for this league")]
    NoStandings,

    #[error("no prediction published for this fixture")]
    NoPrediction,
}

impl FetchError {
    pub fn failed(reason: impl Into<String>) -> Self {
        FetchError::Failed {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("nothing to render")]
    EmptyTable,

    #[error("image write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode failed: {0}")]
    Encode(String),
}

/// Everything a conversation action can fail with. Each variant maps to one
/// apology message; none of them moves the conversation to another state.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no league selected")]
    NoLeague,

    #[error("no team selected")]
    NoTeam,
}
