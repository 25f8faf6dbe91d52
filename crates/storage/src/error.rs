use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Size or MIME validation failure; the message is safe to show clients
    #[error("{0}")]
    UploadRejected(String),
    #[error("Too many files. Maximum allowed: {max}, received: {received}")]
    TooManyFiles { max: usize, received: usize },
    #[error("invalid blob name")]
    InvalidBlobName,
    #[error("file not found")]
    NotFound,
    #[error("download link has expired")]
    LinkExpired,
    #[error("invalid download signature")]
    InvalidSignature,
    #[error("signing key rejected")]
    SigningKey,
    #[error("{0} is not set")]
    MissingConfig(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// True for failures caused by the request rather than the store itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UploadRejected(_)
                | Self::TooManyFiles { .. }
                | Self::InvalidBlobName
                | Self::LinkExpired
                | Self::InvalidSignature
        )
    }
}
