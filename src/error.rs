use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request to notification endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode notification listing: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid notification endpoint base url: {0}")]
    InvalidBaseUrl(String),

    #[error("platform call failed: {0}")]
    Platform(String),

    #[error("background service is no longer running")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, NotifyError>;
