//! Message signer for shdwDrive requests
//!
//! Every mutating request carries a detached Ed25519 signature over a
//! canonical UTF-8 message. The signature travels base58-encoded; the server
//! rejects base64 or hex.
//!
//! Two signing mechanisms exist and exactly one is active per signer:
//! - a raw Ed25519 keypair held in process
//! - a wallet adapter that signs on our behalf and declares its own public key

use crate::drive::error::{DriveError, Result};
use crate::drive::types::SignedEnvelope;
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use std::fmt;
use std::sync::Arc;

/// External wallet capable of signing arbitrary messages
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Declared public key (base58), if the wallet is connected
    fn public_key(&self) -> Option<String>;

    /// Whether the wallet exposes message signing at all
    fn can_sign_message(&self) -> bool {
        true
    }

    /// Produce a detached signature over `message`
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Signing mechanism bound to one client instance
#[derive(Clone)]
pub enum MessageSigner {
    Keypair(SigningKey),
    Wallet(Arc<dyn WalletAdapter>),
}

impl fmt::Debug for MessageSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        match self {
            MessageSigner::Keypair(key) => f
                .debug_tuple("Keypair")
                .field(&bs58::encode(key.verifying_key().as_bytes()).into_string())
                .finish(),
            MessageSigner::Wallet(wallet) => {
                f.debug_tuple("Wallet").field(&wallet.public_key()).finish()
            }
        }
    }
}

impl MessageSigner {
    /// Create a signer from a raw keypair
    pub fn from_keypair(key: SigningKey) -> Self {
        MessageSigner::Keypair(key)
    }

    /// Create a signer from keypair bytes
    ///
    /// Accepts the 64-byte secret+public form (as written by `solana-keygen`)
    /// or a bare 32-byte seed.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self> {
        let key = match bytes.len() {
            64 => {
                let mut buf = [0u8; 64];
                buf.copy_from_slice(bytes);
                SigningKey::from_keypair_bytes(&buf)
                    .map_err(|e| DriveError::InvalidKeypair(e.to_string()))?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(bytes);
                SigningKey::from_bytes(&seed)
            }
            n => {
                return Err(DriveError::InvalidKeypair(format!(
                    "expected 32 or 64 bytes, got {}",
                    n
                )))
            }
        };
        Ok(MessageSigner::Keypair(key))
    }

    /// Create a signer that delegates to a wallet adapter
    pub fn from_wallet(wallet: Arc<dyn WalletAdapter>) -> Self {
        MessageSigner::Wallet(wallet)
    }

    /// Pick the single active mechanism from optional inputs
    ///
    /// A wallet that can sign wins over a keypair. A wallet that cannot sign is
    /// only kept when no keypair exists; signing then fails with
    /// [`DriveError::NoSigningMethod`].
    pub fn from_parts(
        keypair: Option<SigningKey>,
        wallet: Option<Arc<dyn WalletAdapter>>,
    ) -> Result<Self> {
        match (keypair, wallet) {
            (_, Some(wallet)) if wallet.can_sign_message() => Ok(MessageSigner::Wallet(wallet)),
            (Some(key), _) => Ok(MessageSigner::Keypair(key)),
            (None, Some(wallet)) => Ok(MessageSigner::Wallet(wallet)),
            (None, None) => Err(DriveError::NoSigner),
        }
    }

    /// Sign `message` and return the base58-encoded detached signature
    pub async fn sign(&self, message: &str) -> Result<String> {
        let signature = match self {
            MessageSigner::Wallet(wallet) => {
                if !wallet.can_sign_message() {
                    return Err(DriveError::NoSigningMethod);
                }
                wallet.sign_message(message.as_bytes()).await?
            }
            MessageSigner::Keypair(key) => key.sign(message.as_bytes()).to_bytes().to_vec(),
        };
        Ok(bs58::encode(signature).into_string())
    }

    /// Canonical signer identity (base58 public key)
    pub fn identity(&self) -> Result<String> {
        match self {
            MessageSigner::Wallet(wallet) => wallet.public_key().ok_or(DriveError::NoSigner),
            MessageSigner::Keypair(key) => {
                Ok(bs58::encode(key.verifying_key().as_bytes()).into_string())
            }
        }
    }

    /// Sign `message` and bundle it with the signature and identity
    pub async fn sign_envelope(&self, message: String) -> Result<SignedEnvelope> {
        let signature = self.sign(&message).await?;
        let signer = self.identity()?;
        Ok(SignedEnvelope {
            message,
            signature,
            signer,
        })
    }
}
