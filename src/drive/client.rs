//! Drive client: signed uploads, deletes and listing
//!
//! Upload strategy is fixed by size: anything up to 5 MiB goes up in one
//! form POST, anything larger through a [`MultipartSession`]. The threshold is
//! part of the server contract.

use crate::drive::error::{DriveError, Result};
use crate::drive::messages;
use crate::drive::multipart::MultipartSession;
use crate::drive::progress::{ProgressReporter, ProgressSink};
use crate::drive::signer::MessageSigner;
use crate::drive::transport::{Form, HttpTransport, RequestBody, Transport};
use crate::drive::types::{
    DeleteObjectRequest, DeleteObjectResponse, DeleteOutcome, FinalizedResponse, ListObjectsRequest,
    ListObjectsResponse, ListedObject, UploadOutcome, UploadTarget,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const UPLOAD_PATH: &str = "/v1/object/upload";
pub const MULTIPART_CREATE_PATH: &str = "/v1/object/multipart/create";
pub const MULTIPART_PART_PATH: &str = "/v1/object/multipart/upload-part";
pub const MULTIPART_COMPLETE_PATH: &str = "/v1/object/multipart/complete";
pub const LIST_PATH: &str = "/v1/object/list";
pub const DELETE_PATH: &str = "/v1/object/delete";

/// Largest payload sent as a single request (5 MiB, inclusive)
pub const SINGLE_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// Client for one signer against one drive endpoint
///
/// Clone is cheap - the transport is shared behind an Arc.
pub struct DriveClient<T: Transport + ?Sized = HttpTransport> {
    transport: Arc<T>,
    signer: MessageSigner,
}

impl<T: Transport + ?Sized> Clone for DriveClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            signer: self.signer.clone(),
        }
    }
}

impl DriveClient<HttpTransport> {
    /// Create a client talking HTTPS to `endpoint`
    pub fn new(endpoint: &str, signer: MessageSigner) -> Result<Self> {
        let transport = HttpTransport::new(endpoint, false)?;
        Ok(Self::with_transport(Arc::new(transport), signer))
    }
}

impl<T: Transport + ?Sized> DriveClient<T> {
    pub fn with_transport(transport: Arc<T>, signer: MessageSigner) -> Self {
        Self { transport, signer }
    }

    pub fn signer(&self) -> &MessageSigner {
        &self.signer
    }

    /// Upload `data` to `target`
    ///
    /// On failure exactly one `error` progress event (0%) is emitted before
    /// the error is returned.
    pub async fn upload(
        &self,
        target: &UploadTarget,
        data: Bytes,
        on_progress: Option<ProgressSink<'_>>,
    ) -> Result<UploadOutcome> {
        let mut progress = ProgressReporter::new(on_progress);

        let result = if data.len() <= SINGLE_UPLOAD_LIMIT {
            self.upload_single(target, data).await
        } else {
            self.upload_multipart(target, data, &mut progress).await
        };

        match result {
            Ok(outcome) => {
                progress.complete();
                // The server may rename the object; the location is authoritative
                info!(
                    bucket = %target.bucket,
                    location = %outcome.finalized_location,
                    "upload_complete"
                );
                Ok(outcome)
            }
            Err(e) => {
                progress.error();
                warn!(bucket = %target.bucket, key = %target.key(), error = %e, "upload_failed");
                Err(e)
            }
        }
    }

    async fn upload_single(&self, target: &UploadTarget, data: Bytes) -> Result<UploadOutcome> {
        let message = messages::upload_message(&target.bucket, &target.file_name);
        let envelope = self.signer.sign_envelope(message).await?;

        debug!(
            bucket = %target.bucket,
            key = %target.key(),
            bytes = data.len(),
            "single_upload"
        );

        let form = Form::new()
            .file("file", &target.file_name, &target.mime_type, data)
            .text("message", envelope.signature)
            .text("signer", envelope.signer)
            .text("storage_account", target.bucket.as_str())
            .text("directory", target.normalized_directory());

        let response = self.transport.post(UPLOAD_PATH, RequestBody::Form(form)).await?;
        if !response.is_success() {
            return Err(DriveError::UploadFailed(response.error_message()));
        }

        let finalized: FinalizedResponse = response.json()?;
        let finalized_location = finalized.finalized_location.ok_or_else(|| {
            DriveError::ResponseParseFailed("upload response carried no location".to_string())
        })?;

        Ok(UploadOutcome { finalized_location })
    }

    async fn upload_multipart(
        &self,
        target: &UploadTarget,
        data: Bytes,
        progress: &mut ProgressReporter<'_>,
    ) -> Result<UploadOutcome> {
        let mut session =
            MultipartSession::initiate(self.transport.as_ref(), &self.signer, target, data.len() as u64)
                .await?;

        session
            .upload_all(&data, &mut |percent: f64| progress.uploading(percent))
            .await?;

        session.complete().await
    }

    /// List objects in `bucket` owned by this client's signer
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<ListedObject>> {
        let owner = self.signer.identity()?;
        let body = serde_json::to_value(ListObjectsRequest {
            bucket,
            owner: &owner,
        })
        .map_err(|e| DriveError::ListFailed(format!("Failed to encode request: {}", e)))?;

        let response = self.transport.post(LIST_PATH, RequestBody::Json(body)).await?;
        if !response.is_success() {
            return Err(DriveError::ListFailed(response.error_message()));
        }

        let listed: ListObjectsResponse = response.json()?;
        Ok(listed.objects.into_iter().map(ListedObject::from).collect())
    }

    /// Whether `key` exists in `bucket`
    ///
    /// Fails open: any listing error counts as "does not exist". A transient
    /// listing failure therefore turns a delete into a silent no-op; this is
    /// a known risk of the current protocol flow.
    async fn object_exists(&self, bucket: &str, key: &str) -> bool {
        match self.list_objects(bucket).await {
            Ok(objects) => objects.iter().any(|o| o.key == key),
            Err(e) => {
                warn!(bucket = %bucket, key = %key, error = %e, "delete_precheck_failed");
                false
            }
        }
    }

    /// Delete an object by URL or key
    ///
    /// A missing object yields a negative outcome without contacting the
    /// delete endpoint, which keeps repeated deletes harmless.
    pub async fn delete(&self, bucket: &str, file_url_or_path: &str) -> Result<DeleteOutcome> {
        let key = resolve_object_key(bucket, file_url_or_path);

        if !self.object_exists(bucket, &key).await {
            debug!(bucket = %bucket, key = %key, "delete_skipped_not_found");
            return Ok(DeleteOutcome::not_found());
        }

        let message = messages::delete_message(bucket, &key);
        let envelope = self.signer.sign_envelope(message).await?;

        let body = serde_json::to_value(DeleteObjectRequest {
            bucket,
            filename: &key,
            message: &envelope.signature,
            signer: &envelope.signer,
        })
        .map_err(|e| DriveError::DeleteFailed(format!("Failed to encode request: {}", e)))?;

        let response = self.transport.post(DELETE_PATH, RequestBody::Json(body)).await?;
        if !response.is_success() {
            return Err(DriveError::DeleteFailed(response.error_message()));
        }

        let parsed: DeleteObjectResponse = response
            .json()
            .map_err(|e| DriveError::DeleteFailed(e.to_string()))?;

        let outcome = if parsed.success {
            DeleteOutcome {
                success: true,
                message: parsed
                    .message
                    .unwrap_or_else(|| "File deleted successfully".to_string()),
            }
        } else {
            DeleteOutcome {
                success: false,
                message: parsed
                    .message
                    .unwrap_or_else(|| "Delete rejected by server".to_string()),
            }
        };

        info!(bucket = %bucket, key = %key, success = outcome.success, "delete_complete");
        Ok(outcome)
    }
}

/// Resolve the object key from a URL or a plain key
///
/// For an absolute URL, the key is everything after the first path segment
/// equal to `bucket`. A URL without that segment yields its whole path. Any
/// other input is taken verbatim.
pub fn resolve_object_key(bucket: &str, input: &str) -> String {
    let url = match url::Url::parse(input) {
        Ok(url) if !url.cannot_be_a_base() => url,
        _ => return input.to_string(),
    };

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .map(|s| {
                    urlencoding::decode(s)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| s.to_string())
                })
                .collect()
        })
        .unwrap_or_default();

    match segments.iter().position(|s| s == bucket) {
        Some(idx) => segments[idx + 1..].join("/"),
        None => segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_key_from_url() {
        assert_eq!(
            resolve_object_key("B", "https://cdn.example.com/B/folder/file.jpg"),
            "folder/file.jpg"
        );
        assert_eq!(
            resolve_object_key("B", "https://cdn.example.com/v1/B/my%20file.txt"),
            "my file.txt"
        );
    }

    #[test]
    fn test_resolve_key_url_without_bucket() {
        assert_eq!(
            resolve_object_key("B", "https://cdn.example.com/other/file.jpg"),
            "other/file.jpg"
        );
    }

    #[test]
    fn test_resolve_key_plain_path() {
        assert_eq!(resolve_object_key("B", "B/folder/file.jpg"), "B/folder/file.jpg");
        assert_eq!(resolve_object_key("B", "file.jpg"), "file.jpg");
    }

    #[test]
    fn test_threshold_is_exact() {
        assert_eq!(SINGLE_UPLOAD_LIMIT, 5_242_880);
    }
}
