//! Keypair file loading
//!
//! Files hold a JSON array of bytes, as written by `solana-keygen`: 64 bytes
//! (secret seed followed by public key) or a bare 32-byte seed.

use crate::drive::MessageSigner;
use anyhow::{Context, Result};
use std::path::Path;

/// Read a keypair file and build a signer from it
pub fn load_keypair<P: AsRef<Path>>(path: P) -> Result<MessageSigner> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read keypair file: {:?}", path.as_ref()))?;

    parse_keypair(&content).context(format!("Invalid keypair file: {:?}", path.as_ref()))
}

/// Parse keypair JSON (`[12, 34, ...]`)
pub fn parse_keypair(content: &str) -> Result<MessageSigner> {
    let bytes: Vec<u8> =
        serde_json::from_str(content.trim()).context("Keypair must be a JSON array of bytes")?;

    Ok(MessageSigner::from_keypair_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn test_parse_keypair_64_bytes() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let json = serde_json::to_string(&key.to_keypair_bytes().to_vec()).unwrap();

        let signer = parse_keypair(&json).unwrap();
        let expected = MessageSigner::from_keypair(key);
        assert_eq!(signer.identity().unwrap(), expected.identity().unwrap());
    }

    #[test]
    fn test_parse_keypair_rejects_garbage() {
        assert!(parse_keypair("not json").is_err());
        assert!(parse_keypair("[1, 2, 3]").is_err());
    }
}
