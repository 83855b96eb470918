//! Canonical sign-messages and object key construction
//!
//! The server rebuilds each message from the request fields and verifies the
//! signature against it, so every template here must stay byte-identical.
//! Nothing time- or nonce-dependent may enter a message.

use sha2::{Digest, Sha256};

/// Common first line of every signed message
pub const MESSAGE_PREFIX: &str = "shdwDrive Signed Message:\n";

/// Message for a single-request upload. Binds the file name hash, not the content.
pub fn upload_message(bucket: &str, file_name: &str) -> String {
    format!(
        "{}Storage Account: {}\nUpload file with hash: {}",
        MESSAGE_PREFIX,
        bucket,
        hash_file_name(file_name)
    )
}

/// Message that opens a multipart session
pub fn multipart_init_message(bucket: &str, key: &str, size: u64) -> String {
    format!(
        "{}Initialize multipart upload\nBucket: {}\nFilename: {}\nFile size: {}",
        MESSAGE_PREFIX, bucket, key, size
    )
}

pub fn delete_message(bucket: &str, key: &str) -> String {
    format!(
        "{}Delete file\nBucket: {}\nFilename: {}",
        MESSAGE_PREFIX, bucket, key
    )
}

/// Lowercase hex SHA-256 of the file name
pub fn hash_file_name(file_name: &str) -> String {
    hex::encode(Sha256::digest(file_name.as_bytes()))
}

/// Normalize an upload directory
///
/// Leading and trailing slashes are stripped and runs of slashes collapse to
/// one. An empty result means the bucket root.
pub fn normalize_directory(directory: &str) -> String {
    let mut result = String::with_capacity(directory.len());
    for segment in directory.split('/').filter(|s| !s.is_empty()) {
        if !result.is_empty() {
            result.push('/');
        }
        result.push_str(segment);
    }
    result
}

/// Object key for `file_name` under an already normalized directory
pub fn object_key(directory: &str, file_name: &str) -> String {
    if directory.is_empty() {
        file_name.to_string()
    } else {
        let mut key = String::with_capacity(directory.len() + 1 + file_name.len());
        key.push_str(directory);
        key.push('/');
        key.push_str(file_name);
        key
    }
}
