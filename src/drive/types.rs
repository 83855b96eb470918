//! Drive types and wire structures

use crate::drive::messages;
use serde::{Deserialize, Serialize};

/// A message together with its detached signature and the signer identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub message: String,
    /// Base58-encoded Ed25519 signature
    pub signature: String,
    /// Base58 public key of the signer
    pub signer: String,
}

/// Where an upload goes and how it is described
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    /// Normalized directory, empty for the bucket root
    pub directory: String,
    pub file_name: String,
    pub mime_type: String,
}

impl UploadTarget {
    pub fn new(
        bucket: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            directory: String::new(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Set the target directory (normalized on the way in)
    pub fn with_directory(mut self, directory: &str) -> Self {
        self.directory = messages::normalize_directory(directory);
        self
    }

    /// Directory as sent on the wire, normalized even when the field was set directly
    pub fn normalized_directory(&self) -> String {
        messages::normalize_directory(&self.directory)
    }

    /// Full object key: directory (when present) plus file name
    pub fn key(&self) -> String {
        messages::object_key(&self.normalized_directory(), &self.file_name)
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Public URL of the stored object
    pub finalized_location: String,
}

/// Result of a delete call
///
/// A missing object or a server-side rejection is a negative outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

impl DeleteOutcome {
    pub fn not_found() -> Self {
        Self {
            success: false,
            message: "File does not exist or has already been deleted".to_string(),
        }
    }
}

/// One part of a multipart session, as reported back on completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    pub e_tag: String,
    /// Part number (1-based)
    pub part_number: u32,
}

impl CompletedPart {
    pub fn new(part_number: u32, e_tag: String) -> Self {
        Self { e_tag, part_number }
    }
}

/// Object entry returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedObject {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ListedObject {
    pub fn new(key: String) -> Self {
        Self {
            key,
            size: None,
            last_modified: None,
        }
    }
}

// =============================================================================
// Request bodies
// =============================================================================

// `message` fields carry the base58 signature; the server rebuilds the
// signed text from the other fields.

#[derive(Debug, Serialize)]
pub(crate) struct CreateMultipartRequest<'a> {
    pub bucket: &'a str,
    pub filename: &'a str,
    pub message: &'a str,
    pub signer: &'a str,
    pub size: u64,
    pub file_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompleteMultipartRequest<'a> {
    pub bucket: &'a str,
    #[serde(rename = "uploadId")]
    pub upload_id: &'a str,
    pub key: &'a str,
    pub parts: &'a [CompletedPart],
    pub signer: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListObjectsRequest<'a> {
    pub bucket: &'a str,
    pub owner: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteObjectRequest<'a> {
    pub bucket: &'a str,
    pub filename: &'a str,
    pub message: &'a str,
    pub signer: &'a str,
}

// =============================================================================
// Response bodies
// =============================================================================

/// Body returned by single upload and multipart completion
#[derive(Debug, Deserialize)]
pub(crate) struct FinalizedResponse {
    #[serde(default, alias = "finalizedLocation", alias = "location")]
    pub finalized_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateMultipartResponse {
    #[serde(rename = "uploadId")]
    pub upload_id: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadPartResponse {
    #[serde(default, rename = "ETag", alias = "eTag", alias = "etag")]
    pub e_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEntry {
    Key(String),
    Object(ListedObject),
}

impl From<ListEntry> for ListedObject {
    fn from(entry: ListEntry) -> Self {
        match entry {
            ListEntry::Key(key) => ListedObject::new(key),
            ListEntry::Object(object) => object,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListObjectsResponse {
    #[serde(default)]
    pub objects: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteObjectResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape used by the server for rejected requests
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_target_key() {
        let target = UploadTarget::new("B", "x.txt", "text/plain");
        assert_eq!(target.key(), "x.txt");

        let target = target.with_directory("/a//b/");
        assert_eq!(target.directory, "a/b");
        assert_eq!(target.key(), "a/b/x.txt");
    }

    #[test]
    fn test_key_normalizes_literal_directory() {
        let target = UploadTarget {
            bucket: "B".to_string(),
            directory: "//a/b//".to_string(),
            file_name: "x.txt".to_string(),
            mime_type: "text/plain".to_string(),
        };
        assert_eq!(target.normalized_directory(), "a/b");
        assert_eq!(target.key(), "a/b/x.txt");
    }

    #[test]
    fn test_completed_part_wire_names() {
        let part = CompletedPart::new(1, "abc".to_string());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json, serde_json::json!({ "eTag": "abc", "partNumber": 1 }));
    }

    #[test]
    fn test_list_entries_accept_strings_and_objects() {
        let body = r#"{"objects": ["a.txt", {"key": "dir/b.txt", "size": 42}]}"#;
        let parsed: ListObjectsResponse = serde_json::from_str(body).unwrap();
        let objects: Vec<ListedObject> = parsed.objects.into_iter().map(Into::into).collect();

        assert_eq!(objects[0].key, "a.txt");
        assert_eq!(objects[1].key, "dir/b.txt");
        assert_eq!(objects[1].size, Some(42));
    }

    #[test]
    fn test_finalized_location_aliases() {
        for body in [
            r#"{"finalized_location": "https://x/y"}"#,
            r#"{"finalizedLocation": "https://x/y"}"#,
            r#"{"location": "https://x/y"}"#,
        ] {
            let parsed: FinalizedResponse = serde_json::from_str(body).unwrap();
            assert_eq!(parsed.finalized_location.as_deref(), Some("https://x/y"));
        }
    }

    #[test]
    fn test_part_response_etag_aliases() {
        for body in [r#"{"ETag": "e1"}"#, r#"{"eTag": "e1"}"#, r#"{"etag": "e1"}"#] {
            let parsed: UploadPartResponse = serde_json::from_str(body).unwrap();
            assert_eq!(parsed.e_tag.as_deref(), Some("e1"));
        }
    }
}
