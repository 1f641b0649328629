//! Cryptographic Operations Module
//!
//! This module recovers and checks the signer of a canonical intent message.
//! Makers sign with their wallet using EIP-191 personal messages:
//!
//! `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
//!
//! Signatures are 65 bytes (`r || s || v`), hex encoded with an optional `0x`
//! prefix. `v` may be given as 0/1 or in Ethereum form 27/28.
//!
//! [`LocalSigner`] plays the wallet side for the `sign_intent` tool and tests.

use anyhow::Result;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Prefix of an EIP-191 version 0x45 ("personal_sign") message.
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Length of a recoverable signature: r (32) || s (32) || v (1).
const SIGNATURE_LEN: usize = 65;

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons a signature cannot be turned into a signer address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is not valid hex: {0}")]
    InvalidHex(String),
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid recovery byte {0}: expected 0, 1, 27 or 28")]
    InvalidRecoveryId(u8),
    #[error("malformed signature: {0}")]
    Malformed(String),
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),
}

/// Recovered signer differs from the address the submitter claimed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("signer mismatch: recovered {recovered}, claimed {claimed}")]
pub struct SignerMismatch {
    pub recovered: String,
    pub claimed: String,
}

/// Failure of [`verify`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error(transparent)]
    BadSignature(#[from] SignatureError),
    #[error(transparent)]
    SignerMismatch(#[from] SignerMismatch),
}

// ============================================================================
// HASHING AND ADDRESSES
// ============================================================================

/// Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// EIP-191 personal-message hash of `message`.
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Ethereum address of a secp256k1 public key, EIP-55 checksummed.
///
/// The address is the last 20 bytes of keccak256 over the uncompressed
/// point without its 0x04 tag.
pub fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    to_checksum_address(&hash[12..])
}

/// EIP-55 mixed-case encoding of a 20-byte address.
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut checksummed = String::with_capacity(2 + lower.len());
    checksummed.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// Whether `address` is a `0x`-prefixed 20-byte hex address (any casing).
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) => body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// ============================================================================
// SIGNATURE VERIFICATION
// ============================================================================

/// Recovers the address that signed `message` with EIP-191 hashing.
///
/// # Arguments
///
/// * `message` - The canonical message, exactly as signed
/// * `signature` - 65-byte hex signature (`0x` optional)
///
/// # Returns
///
/// * `Ok(String)` - EIP-55 checksummed signer address
/// * `Err(SignatureError)` - Signature malformed or recovery failed
pub fn recover_address(message: &str, signature: &str) -> Result<String, SignatureError> {
    let bytes = decode_signature(signature)?;

    let mut sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    let v = bytes[64];
    let recovery_byte = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(SignatureError::InvalidRecoveryId(other)),
    };
    let mut recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(SignatureError::InvalidRecoveryId(v))?;

    // Wallets may emit high-S signatures; flip to low-S and mirror the parity.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let prehash = hash_personal_message(message.as_bytes());
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    Ok(address_from_verifying_key(&key))
}

/// Recovers the signer of `message` and checks it against `claimed_address`.
///
/// Addresses are compared case-insensitively. Returns the recovered address
/// on success.
pub fn verify(message: &str, signature: &str, claimed_address: &str) -> Result<String, VerifyError> {
    let recovered = recover_address(message, signature)?;
    if !recovered.eq_ignore_ascii_case(claimed_address) {
        return Err(SignerMismatch {
            recovered,
            claimed: claimed_address.to_string(),
        }
        .into());
    }
    Ok(recovered)
}

/// Decodes a hex signature and checks its length.
fn decode_signature(signature: &str) -> Result<[u8; SIGNATURE_LEN], SignatureError> {
    let signature_hex = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(signature_hex).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| SignatureError::InvalidLength(len))
}

// ============================================================================
// LOCAL SIGNER
// ============================================================================

/// secp256k1 key that signs canonical messages like a maker's wallet.
pub struct LocalSigner {
    signing_key: SigningKey,
}

impl LocalSigner {
    /// Loads a signer from a 32-byte hex private key (`0x` optional).
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let key_hex = private_key.strip_prefix("0x").unwrap_or(private_key);
        let key_bytes = hex::decode(key_hex)
            .map_err(|e| anyhow::anyhow!("Invalid private key hex: {}", e))?;
        if key_bytes.len() != 32 {
            return Err(anyhow::anyhow!(
                "Invalid private key length: expected 32 bytes, got {}",
                key_bytes.len()
            ));
        }
        let signing_key = SigningKey::from_slice(&key_bytes)
            .map_err(|e| anyhow::anyhow!("Invalid secp256k1 private key: {}", e))?;
        Ok(Self { signing_key })
    }

    /// Generates a fresh random key.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Private key as 0x-prefixed hex.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// EIP-55 checksummed address of this key.
    pub fn address(&self) -> String {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Signs `message` as an EIP-191 personal message.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - 0x-prefixed hex `r || s || v` with `v` in {27, 28}
    /// * `Err(anyhow::Error)` - Signing failed
    pub fn sign_message(&self, message: &str) -> Result<String> {
        let prehash = hash_personal_message(message.as_bytes());
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| anyhow::anyhow!("Failed to sign message: {}", e))?;

        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(recovery_id.to_byte() + 27);

        Ok(format!("0x{}", hex::encode(bytes)))
    }
}
