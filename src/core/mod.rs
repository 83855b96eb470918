use crate::config::{self, Config, Profile};
use crate::drive::{DriveClient, HttpTransport};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Per-invocation overrides coming from the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub keypair: Option<PathBuf>,
    pub insecure_tls: bool,
}

/// Core shared by the CLI commands
///
/// The DriveClient is created once; clones share the same HTTP connection pool.
#[derive(Clone)]
pub struct Core {
    pub config: Arc<Config>,
    pub profile: Profile,
    client: DriveClient<HttpTransport>,
}

impl Core {
    pub fn new(config: Config, overrides: Overrides) -> Result<Self> {
        let mut profile = config
            .get_profile(None)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No profile found in configuration"))?;

        if let Some(endpoint) = overrides.endpoint {
            profile.endpoint = endpoint;
        }
        if let Some(keypair) = overrides.keypair {
            profile.keypair = Some(keypair);
        }
        profile.insecure_tls |= overrides.insecure_tls;

        let keypair_path = profile
            .keypair
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No keypair configured (use --keypair or SHDW_KEYPAIR)"))?;
        let signer = config::load_keypair(&keypair_path)?;

        let transport = HttpTransport::new(&profile.endpoint, profile.insecure_tls)
            .context("Failed to create HTTP transport")?;
        let client = DriveClient::with_transport(Arc::new(transport), signer);

        tracing::debug!(
            endpoint = %profile.endpoint,
            signer = %client.signer().identity().unwrap_or_default(),
            "core_initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            profile,
            client,
        })
    }

    /// Get a clone of the shared drive client (shares connection pool)
    pub fn client(&self) -> DriveClient<HttpTransport> {
        self.client.clone()
    }

    /// Bucket from the command line, falling back to the profile default
    pub fn bucket(&self, requested: Option<&str>) -> Result<String> {
        requested
            .map(str::to_string)
            .or_else(|| self.profile.bucket.clone())
            .ok_or_else(|| anyhow::anyhow!("No bucket given (use --bucket or SHDW_BUCKET)"))
    }
}
