//! Multipart upload session
//!
//! A session moves through `Created -> UploadingPart(n) -> Completed`, with
//! `Failed` reachable from anywhere. Only the initiating request is signed;
//! after that the `uploadId` plus signer identity carry the session.
//!
//! Parts go up one at a time in ascending order starting at 1. Any failure is
//! terminal and nothing is aborted server-side, so a failed session stays
//! orphaned on the remote end.

use crate::drive::client::{MULTIPART_COMPLETE_PATH, MULTIPART_CREATE_PATH, MULTIPART_PART_PATH};
use crate::drive::error::{DriveError, Result};
use crate::drive::messages;
use crate::drive::signer::MessageSigner;
use crate::drive::transport::{Form, RequestBody, Transport};
use crate::drive::types::{
    CompleteMultipartRequest, CompletedPart, CreateMultipartRequest, CreateMultipartResponse,
    FinalizedResponse, UploadOutcome, UploadPartResponse, UploadTarget,
};
use bytes::Bytes;
use tracing::{debug, info};

/// Fixed part size: 5 MiB. The last part carries the remainder.
pub const PART_SIZE: usize = 5 * 1024 * 1024;

/// Share of overall progress covered by part uploads
pub const PARTS_PROGRESS_SHARE: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Created,
    /// Part `n` was the last one stored
    UploadingPart(u32),
    Completed,
    Failed(String),
}

/// Number of parts needed for `size` bytes
pub fn part_count(size: usize) -> usize {
    size.div_ceil(PART_SIZE)
}

/// Split `data` into numbered parts (zero-copy slices)
pub fn split_parts(data: &Bytes) -> Vec<(u32, Bytes)> {
    let total = data.len();
    (0..part_count(total))
        .map(|idx| {
            let start = idx * PART_SIZE;
            let end = std::cmp::min(start + PART_SIZE, total);
            ((idx + 1) as u32, data.slice(start..end))
        })
        .collect()
}

/// Server-side multipart upload in progress
pub struct MultipartSession<'a, T: Transport + ?Sized> {
    transport: &'a T,
    bucket: String,
    signer: String,
    upload_id: String,
    key: String,
    /// Size signed into the init message
    size: u64,
    uploaded: u64,
    parts: Vec<CompletedPart>,
    state: SessionState,
}

impl<'a, T: Transport + ?Sized> MultipartSession<'a, T> {
    /// Open a session for `target` with a declared `size`
    ///
    /// The key returned by the server is authoritative and used for every
    /// later request, even when it differs from the locally computed one.
    /// `size` is binding: the parts must add up to exactly this many bytes.
    pub async fn initiate(
        transport: &'a T,
        signer: &MessageSigner,
        target: &UploadTarget,
        size: u64,
    ) -> Result<Self> {
        let local_key = target.key();
        let message = messages::multipart_init_message(&target.bucket, &local_key, size);
        let envelope = signer.sign_envelope(message).await?;

        let body = CreateMultipartRequest {
            bucket: &target.bucket,
            filename: &local_key,
            message: &envelope.signature,
            signer: &envelope.signer,
            size,
            file_type: &target.mime_type,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| DriveError::UploadFailed(format!("Failed to encode request: {}", e)))?;

        let response = transport
            .post(MULTIPART_CREATE_PATH, RequestBody::Json(body))
            .await?;
        if !response.is_success() {
            return Err(DriveError::UploadFailed(format!(
                "Failed to initialize multipart upload: {}",
                response.error_message()
            )));
        }
        let created: CreateMultipartResponse = response.json()?;

        info!(
            bucket = %target.bucket,
            key = %created.key,
            upload_id = %created.upload_id,
            size = size,
            "multipart_initiated"
        );

        Ok(Self {
            transport,
            bucket: target.bucket.clone(),
            signer: envelope.signer,
            upload_id: created.upload_id,
            key: created.key,
            size,
            uploaded: 0,
            parts: Vec::new(),
            state: SessionState::Created,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Server-assigned object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared total size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Parts stored so far, in part-number order
    pub fn parts(&self) -> &[CompletedPart] {
        &self.parts
    }

    fn next_part_number(&self) -> Result<u32> {
        match &self.state {
            SessionState::Created => Ok(1),
            SessionState::UploadingPart(n) => Ok(n + 1),
            SessionState::Completed => Err(DriveError::InvalidSessionState(
                "session already completed".to_string(),
            )),
            SessionState::Failed(reason) => Err(DriveError::InvalidSessionState(format!(
                "session failed: {}",
                reason
            ))),
        }
    }

    fn fail(&mut self, err: DriveError) -> DriveError {
        self.state = SessionState::Failed(err.to_string());
        err
    }

    /// Store one part; `part_number` must be the next one in sequence
    pub async fn upload_part(&mut self, part_number: u32, chunk: Bytes) -> Result<&CompletedPart> {
        let expected = self.next_part_number()?;
        if part_number != expected {
            return Err(DriveError::InvalidSessionState(format!(
                "expected part {}, got part {}",
                expected, part_number
            )));
        }

        let size = chunk.len();
        if self.uploaded + size as u64 > self.size {
            return Err(DriveError::InvalidSessionState(format!(
                "part {} exceeds declared size of {} bytes",
                part_number, self.size
            )));
        }

        let form = Form::new()
            .file("file", &self.key, "application/octet-stream", chunk)
            .text("bucket", self.bucket.as_str())
            .text("uploadId", self.upload_id.as_str())
            .text("partNumber", part_number.to_string())
            .text("key", self.key.as_str())
            .text("signer", self.signer.as_str());

        let part_failed = |message: String| DriveError::PartUploadFailed {
            part_number,
            message,
        };

        let response = match self.transport.post(MULTIPART_PART_PATH, RequestBody::Form(form)).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(part_failed(e.to_string()))),
        };
        if !response.is_success() {
            return Err(self.fail(part_failed(response.error_message())));
        }
        let e_tag = match response.json::<UploadPartResponse>() {
            Ok(UploadPartResponse { e_tag: Some(tag) }) if !tag.is_empty() => tag,
            Ok(_) => return Err(self.fail(part_failed("response carried no ETag".to_string()))),
            Err(e) => return Err(self.fail(part_failed(e.to_string()))),
        };

        debug!(
            upload_id = %self.upload_id,
            part_number = part_number,
            bytes = size,
            "part_uploaded"
        );

        self.state = SessionState::UploadingPart(part_number);
        self.uploaded += size as u64;
        self.parts.push(CompletedPart::new(part_number, e_tag));
        Ok(&self.parts[self.parts.len() - 1])
    }

    /// Upload every part of `data` sequentially
    ///
    /// `on_percent` receives `(completed / total) * 90` after each part.
    /// `data` must be exactly the declared size.
    pub async fn upload_all(
        &mut self,
        data: &Bytes,
        on_percent: &mut (dyn FnMut(f64) + Send),
    ) -> Result<()> {
        if data.len() as u64 != self.size {
            return Err(DriveError::InvalidSessionState(format!(
                "data is {} bytes but {} were declared",
                data.len(),
                self.size
            )));
        }

        let parts = split_parts(data);
        let total = parts.len();

        for (part_number, chunk) in parts {
            self.upload_part(part_number, chunk).await?;
            on_percent(part_number as f64 / total as f64 * PARTS_PROGRESS_SHARE);
        }

        Ok(())
    }

    /// Ask the server to stitch the stored parts into the final object
    pub async fn complete(&mut self) -> Result<UploadOutcome> {
        match &self.state {
            SessionState::UploadingPart(_) => {}
            SessionState::Created => {
                return Err(DriveError::InvalidSessionState(
                    "no parts uploaded".to_string(),
                ))
            }
            other => {
                return Err(DriveError::InvalidSessionState(format!(
                    "cannot complete from {:?}",
                    other
                )))
            }
        }
        if self.uploaded != self.size {
            return Err(DriveError::InvalidSessionState(format!(
                "{} of {} declared bytes uploaded",
                self.uploaded, self.size
            )));
        }

        let body = CompleteMultipartRequest {
            bucket: &self.bucket,
            upload_id: &self.upload_id,
            key: &self.key,
            parts: &self.parts,
            signer: &self.signer,
        };
        let body = serde_json::to_value(&body).map_err(|e| {
            DriveError::CompletionFailed(format!("Failed to encode request: {}", e))
        })?;

        let response = match self
            .transport
            .post(MULTIPART_COMPLETE_PATH, RequestBody::Json(body))
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };
        if !response.is_success() {
            let err = DriveError::CompletionFailed(response.error_message());
            return Err(self.fail(err));
        }
        let location = match response.json::<FinalizedResponse>() {
            Ok(FinalizedResponse {
                finalized_location: Some(location),
            }) => location,
            Ok(_) => {
                let err = DriveError::ResponseParseFailed(
                    "completion response carried no location".to_string(),
                );
                return Err(self.fail(err));
            }
            Err(e) => return Err(self.fail(e)),
        };

        info!(
            upload_id = %self.upload_id,
            key = %self.key,
            parts = self.parts.len(),
            "multipart_completed"
        );

        self.state = SessionState::Completed;
        Ok(UploadOutcome {
            finalized_location: location,
        })
    }
}
