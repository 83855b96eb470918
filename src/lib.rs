//! shdw-drive - signed upload/delete client for shdwDrive object storage

pub mod cli;
pub mod config;
pub mod core;
pub mod drive;

pub use crate::config::Config;
pub use crate::core::Core;
pub use drive::{DriveClient, DriveError, MessageSigner};
