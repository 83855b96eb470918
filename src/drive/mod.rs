//! shdwDrive protocol client
//!
//! This module provides:
//! - Ed25519 message signing (keypair or wallet adapter), base58 signatures
//! - Single-request and multipart uploads with progress events
//! - Existence-checked deletes and object listing

pub mod client;
pub mod error;
pub mod messages;
pub mod multipart;
pub mod progress;
pub mod signer;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{resolve_object_key, DriveClient, SINGLE_UPLOAD_LIMIT};
pub use error::{DriveError, Result};
pub use multipart::{MultipartSession, SessionState, PART_SIZE};
pub use progress::{ProgressEvent, ProgressStatus};
pub use signer::{MessageSigner, WalletAdapter};
pub use transport::{Form, FormField, HttpResponse, HttpTransport, RequestBody, Transport};
pub use types::{
    CompletedPart, DeleteOutcome, ListedObject, SignedEnvelope, UploadOutcome, UploadTarget,
};
