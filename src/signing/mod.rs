//! Sign Payload Canonicalization Module
//!
//! Builds the single text message that a maker signs and the service
//! verifies. The server never accepts a message string from the client; it
//! always rebuilds the message from the structured intent fields, so the
//! signature covers exactly the terms that get stored.
//!
//! Message layout (lines joined by `\n`):
//!
//! ```text
//! Intent v1
//! maker:<lower-cased maker>
//! give:<amountMax> <symbol> @ <chain>
//! get:<amountMin> <symbol> @ <chain>
//! priceLimit:<priceLimit or ->
//! deadline:<deadline or ->
//! nonce:<nonce>
//! ```

use crate::types::{Constraints, GetSide, GiveSide};

/// Schema version embedded in every message.
pub const SIGN_PAYLOAD_VERSION: u32 = 1;

/// Placeholder rendered for an absent constraint.
const ABSENT: &str = "-";

// ============================================================================
// PAYLOAD STRUCTURES
// ============================================================================

/// Intent terms before admission (no id, timestamp or signature yet).
#[derive(Debug, Clone, PartialEq)]
pub struct IntentDraft {
    pub maker: String,
    pub give: GiveSide,
    pub get: GetSide,
    pub constraints: Option<Constraints>,
}

/// Normalized payload the message is rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct SignPayload {
    pub version: u32,
    /// Lower-cased maker address
    pub maker: String,
    pub give: GiveSide,
    pub get: GetSide,
    /// Empty constraints when the draft carried none
    pub constraints: Constraints,
    pub nonce: String,
}

// ============================================================================
// CANONICALIZATION
// ============================================================================

/// Normalizes a draft and nonce into a [`SignPayload`].
pub fn build_sign_payload(draft: &IntentDraft, nonce: &str) -> SignPayload {
    SignPayload {
        version: SIGN_PAYLOAD_VERSION,
        maker: draft.maker.to_lowercase(),
        give: draft.give.clone(),
        get: draft.get.clone(),
        constraints: draft.constraints.clone().unwrap_or_default(),
        nonce: nonce.to_string(),
    }
}

/// Renders the payload as the canonical message.
pub fn to_message(payload: &SignPayload) -> String {
    let price_limit = payload
        .constraints
        .price_limit
        .map(format_amount)
        .unwrap_or_else(|| ABSENT.to_string());
    let deadline = payload
        .constraints
        .deadline
        .as_ref()
        .map(|d| d.as_str().to_string())
        .unwrap_or_else(|| ABSENT.to_string());

    [
        format!("Intent v{}", payload.version),
        format!("maker:{}", payload.maker),
        format!(
            "give:{} {} @ {}",
            format_amount(payload.give.amount_max),
            payload.give.asset.symbol,
            payload.give.asset.chain
        ),
        format!(
            "get:{} {} @ {}",
            format_amount(payload.get.amount_min),
            payload.get.asset.symbol,
            payload.get.asset.chain
        ),
        format!("priceLimit:{}", price_limit),
        format!("deadline:{}", deadline),
        format!("nonce:{}", payload.nonce),
    ]
    .join("\n")
}

/// Builds the canonical message for a draft in one step.
pub fn canonical_message(draft: &IntentDraft, nonce: &str) -> String {
    to_message(&build_sign_payload(draft, nonce))
}

/// Renders a number the way wallets' JavaScript signers do.
///
/// Uses the shortest decimal that round-trips, switching to exponent form
/// (`1e+21`, `1e-7`) outside `[1e-6, 1e21)`. Independent of locale.
pub fn format_amount(value: f64) -> String {
    if value == 0.0 {
        // Also covers -0, which renders as "0"
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", value);
        match exp.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exp,
        }
    } else {
        format!("{}", value)
    }
}
