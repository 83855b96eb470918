//! CLI module for shdw-drive
//!
//! # Usage
//!
//! ```bash
//! # Upload a file (multipart is chosen automatically above 5 MiB)
//! shdw-drive upload ./photo.jpg --bucket <STORAGE_ACCOUNT> --directory albums/2024
//!
//! # Delete by key or by URL
//! shdw-drive rm albums/2024/photo.jpg --bucket <STORAGE_ACCOUNT>
//!
//! # List objects
//! shdw-drive ls --bucket <STORAGE_ACCOUNT>
//! ```

pub mod commands;

use anyhow::Result;

/// Initialize logging: RUST_LOG wins over the given default level
pub fn init_logging(default_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
