use crate::core::Core;
use crate::drive::{ProgressEvent, ProgressStatus, UploadTarget};
use anyhow::{Context, Result};
use bytes::Bytes;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Upload command
pub async fn cmd_upload(
    core: &Core,
    file: &Path,
    bucket: Option<&str>,
    directory: Option<&str>,
    content_type: Option<&str>,
) -> Result<()> {
    let bucket = core.bucket(bucket)?;

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?
        .to_string();

    let data = tokio::fs::read(file)
        .await
        .context(format!("Failed to read {}", file.display()))?;
    let size = data.len() as u64;

    let mime_type = content_type
        .map(str::to_string)
        .unwrap_or_else(|| guess_mime_type(&file_name));

    let target = UploadTarget::new(bucket, file_name, mime_type)
        .with_directory(directory.unwrap_or_default());

    println!(
        "{} -> {}/{} ({})",
        file.display(),
        target.bucket,
        target.key(),
        format_bytes(size)
    );

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let progress_bar = bar.clone();
    let mut on_progress = move |event: ProgressEvent| match event.status {
        ProgressStatus::Uploading => progress_bar.set_position(event.percent.round() as u64),
        ProgressStatus::Complete => progress_bar.finish_with_message("done"),
        ProgressStatus::Error => progress_bar.abandon_with_message("failed"),
    };

    let outcome = core
        .client()
        .upload(&target, Bytes::from(data), Some(&mut on_progress))
        .await?;

    bar.finish_and_clear();
    println!("Uploaded: {}", outcome.finalized_location);

    Ok(())
}

/// Remove command
pub async fn cmd_rm(core: &Core, target: &str, bucket: Option<&str>) -> Result<()> {
    let bucket = core.bucket(bucket)?;
    let outcome = core.client().delete(&bucket, target).await?;

    if outcome.success {
        println!("Deleted: {}", target);
    } else {
        println!("Not deleted: {} ({})", target, outcome.message);
    }

    Ok(())
}

/// List command
pub async fn cmd_ls(core: &Core, bucket: Option<&str>) -> Result<()> {
    let bucket = core.bucket(bucket)?;
    let objects = core.client().list_objects(&bucket).await?;

    for object in &objects {
        match object.size {
            Some(size) => println!("{:>10}  {}", format_bytes(size), object.key),
            None => println!("{:>10}  {}", "-", object.key),
        }
    }
    println!("Total: {} objects", objects.len());

    Ok(())
}

/// Guess a MIME type from the file extension
pub fn guess_mime_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("photo.jpg"), "image/jpeg");
        assert_eq!(guess_mime_type("notes.txt"), "text/plain");
        assert_eq!(guess_mime_type("blob.unknownext"), "application/octet-stream");
    }
}
