//! Intent Submission Module
//!
//! Admits signed intents into the pool. A submission carries the structured
//! intent terms, a nonce and a signature; the canonical message is rebuilt
//! here from those fields and the recovered signer must equal the claimed
//! maker. Nothing is stored unless every check passes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crypto::{self, SignatureError, VerifyError};
use crate::signing::{self, IntentDraft};
use crate::storage::IntentPool;
use crate::types::{Asset, Constraints, GetSide, GiveSide, Intent};

// ============================================================================
// REQUEST STRUCTURE
// ============================================================================

/// Body of `POST /intents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitIntentRequest {
    /// Address the submitter claims signed the intent
    pub maker: String,
    pub give: GiveSide,
    pub get: GetSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// Client-chosen nonce included in the signed message
    pub nonce: String,
    /// EIP-191 signature over the canonical message
    pub signature: String,
}

impl SubmitIntentRequest {
    /// The intent terms without nonce and signature.
    pub fn draft(&self) -> IntentDraft {
        IntentDraft {
            maker: self.maker.clone(),
            give: self.give.clone(),
            get: self.get.clone(),
            constraints: self.constraints.clone(),
        }
    }

    /// Schema checks beyond what deserialization enforces.
    ///
    /// Rejects malformed maker addresses, non-positive amounts and price
    /// limits, empty nonces, whitespace in symbols and control characters in
    /// any field rendered into the canonical message.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if !crypto::is_valid_address(&self.maker) {
            return Err(SubmissionError::Validation(format!(
                "Invalid maker address '{}': expected 0x-prefixed 20-byte hex",
                self.maker
            )));
        }

        validate_asset("give", &self.give.asset)?;
        validate_asset("get", &self.get.asset)?;
        validate_positive("give.amountMax", self.give.amount_max)?;
        validate_positive("get.amountMin", self.get.amount_min)?;

        if let Some(limit) = self.constraints.as_ref().and_then(|c| c.price_limit) {
            validate_positive("constraints.priceLimit", limit)?;
        }

        if self.nonce.is_empty() {
            return Err(SubmissionError::Validation("nonce must not be empty".to_string()));
        }
        validate_message_field("nonce", &self.nonce)?;

        if self.signature.is_empty() {
            return Err(SubmissionError::Validation("signature must not be empty".to_string()));
        }

        Ok(())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons a submission is rejected. Nothing is stored in any case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Bad signature: {0}")]
    BadSignature(#[source] SignatureError),
    #[error("Signer mismatch: recovered {recovered}, claimed {claimed}")]
    SignerMismatch { recovered: String, claimed: String },
}

impl From<VerifyError> for SubmissionError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::BadSignature(e) => SubmissionError::BadSignature(e),
            VerifyError::SignerMismatch(m) => SubmissionError::SignerMismatch {
                recovered: m.recovered,
                claimed: m.claimed,
            },
        }
    }
}

// ============================================================================
// ADMISSION
// ============================================================================

/// Parses a raw request body into a [`SubmitIntentRequest`].
///
/// Any JSON or schema error (missing fields, unknown fields, wrong types,
/// malformed deadline) is a validation error.
pub fn parse_request(body: &[u8]) -> Result<SubmitIntentRequest, SubmissionError> {
    serde_json::from_slice(body)
        .map_err(|e| SubmissionError::Validation(format!("Invalid JSON: {}", e)))
}

/// Verifies a submission's signature against its own terms.
///
/// # Returns
///
/// * `Ok(String)` - The recovered (checksummed) maker address
/// * `Err(SubmissionError)` - Bad signature or signer mismatch
pub fn verify_submission(request: &SubmitIntentRequest) -> Result<String, SubmissionError> {
    let message = signing::canonical_message(&request.draft(), &request.nonce);
    Ok(crypto::verify(&message, &request.signature, &request.maker)?)
}

/// Validates, verifies and stores a submission.
///
/// # Arguments
///
/// * `request` - The parsed submission
/// * `pool` - Pool to admit into
///
/// # Returns
///
/// * `Ok(Intent)` - The stored intent with a fresh id and timestamp
/// * `Err(SubmissionError)` - Rejected; the pool is unchanged
pub async fn submit_intent(
    request: SubmitIntentRequest,
    pool: &IntentPool,
) -> Result<Intent, SubmissionError> {
    if let Err(e) = request.validate() {
        warn!("Rejected intent from {}: {}", request.maker, e);
        return Err(e);
    }

    let recovered = match verify_submission(&request) {
        Ok(recovered) => recovered,
        Err(e) => {
            warn!("Rejected intent from {}: {}", request.maker, e);
            return Err(e);
        }
    };

    let intent = Intent {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        maker: recovered,
        give: request.give,
        get: request.get,
        constraints: request.constraints,
        signature: Some(request.signature),
    };

    let stored = pool.add(intent).await;
    info!(
        "Admitted intent {} from {}: give {} {}, get {} {}",
        stored.id,
        stored.maker,
        stored.give.amount_max,
        stored.give.asset,
        stored.get.amount_min,
        stored.get.asset
    );
    Ok(stored)
}

// ============================================================================
// VALIDATION HELPERS
// ============================================================================

fn validate_positive(field: &str, value: f64) -> Result<(), SubmissionError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SubmissionError::Validation(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}

fn validate_asset(side: &str, asset: &Asset) -> Result<(), SubmissionError> {
    if asset.chain.is_empty() || asset.symbol.is_empty() {
        return Err(SubmissionError::Validation(format!(
            "{}.asset requires non-empty chain and symbol",
            side
        )));
    }
    // The message renders "<amount> <symbol> @ <chain>"; a symbol without
    // whitespace keeps the split unambiguous.
    if asset.symbol.chars().any(char::is_whitespace) {
        return Err(SubmissionError::Validation(format!(
            "{}.asset.symbol must not contain whitespace",
            side
        )));
    }
    validate_message_field(&format!("{}.asset.symbol", side), &asset.symbol)?;
    validate_message_field(&format!("{}.asset.chain", side), &asset.chain)
}

/// Control characters would let one message render from two different
/// sets of terms.
fn validate_message_field(field: &str, value: &str) -> Result<(), SubmissionError> {
    if value.chars().any(char::is_control) {
        return Err(SubmissionError::Validation(format!(
            "{} must not contain control characters",
            field
        )));
    }
    Ok(())
}
