use thiserror::Error;

use crate::provider::FeedId;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(
        "No API key configured for {0}.\n\
         Hint: run `severn configure` or set SEVERN_API_KEY."
    )]
    MissingApiKey(FeedId),

    #[error("{feed} request timed out")]
    Timeout { feed: FeedId },

    #[error("Failed to reach {feed}: {source}")]
    Transport {
        feed: FeedId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{feed} request failed: {message}")]
    Status { feed: FeedId, status: u16, message: String },

    #[error("{feed} returned an empty response")]
    EmptyBody { feed: FeedId },

    #[error("Failed to parse {feed} response: {message}")]
    Parse { feed: FeedId, message: String },
}

impl FeedError {
    pub fn transport(feed: FeedId, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FeedError::Timeout { feed }
        } else {
            FeedError::Transport { feed, source }
        }
    }

    pub fn feed(&self) -> FeedId {
        match self {
            FeedError::MissingApiKey(feed)
            | FeedError::Timeout { feed }
            | FeedError::Transport { feed, .. }
            | FeedError::Status { feed, .. }
            | FeedError::EmptyBody { feed }
            | FeedError::Parse { feed, .. } => *feed,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    /// Without the closures feed there is nothing meaningful to report.
    #[error("Closure data unavailable: {0}")]
    ClosuresUnavailable(#[source] FeedError),
}
