//! Error taxonomy for drive operations

use thiserror::Error;

/// Drive client errors
///
/// Every variant is terminal for the operation that produced it; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("No signing method available: configure a keypair or a wallet that can sign messages")]
    NoSigningMethod,

    #[error("No signer available: configure a keypair or a wallet with a public key")]
    NoSigner,

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload of part {part_number} failed: {message}")]
    PartUploadFailed { part_number: u32, message: String },

    #[error("Multipart completion failed: {0}")]
    CompletionFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Failed to parse response: {0}")]
    ResponseParseFailed(String),

    #[error("Invalid multipart session state: {0}")]
    InvalidSessionState(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        DriveError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DriveError>;
