//! Intent and Match Data Types
//!
//! This module defines the data structures shared by the signing, storage,
//! solver and API layers: assets, the give/get legs of an intent, optional
//! constraints, admitted intents and cleared matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ASSETS AND INTENT LEGS
// ============================================================================

/// A tradable unit on a named chain.
///
/// Both fields are compared case-sensitively; `"Ethereum"` and `"ethereum"`
/// are different chains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Asset {
    /// Chain name (e.g. "Ethereum")
    pub chain: String,
    /// Token symbol (e.g. "USDC")
    pub symbol: String,
}

impl Asset {
    pub fn new(chain: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.symbol, self.chain)
    }
}

/// The side an intent gives up: at most `amount_max` of `asset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GiveSide {
    pub asset: Asset,
    /// Upper bound on the amount the maker gives
    pub amount_max: f64,
}

/// The side an intent wants in return: at least `amount_min` of `asset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetSide {
    pub asset: Asset,
    /// Lower bound on the amount the maker receives
    pub amount_min: f64,
}

// ============================================================================
// CONSTRAINTS
// ============================================================================

/// Absolute expiry of an intent.
///
/// Keeps the exact string the maker signed next to its parsed instant, since
/// the canonical message embeds the string verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Deadline {
    raw: String,
    at: DateTime<Utc>,
}

impl Deadline {
    /// The deadline as submitted and signed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed instant (UTC).
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Whether the deadline is strictly after `now`.
    pub fn is_after(&self, now: DateTime<Utc>) -> bool {
        self.at > now
    }
}

impl TryFrom<String> for Deadline {
    type Error = chrono::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let at = DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc);
        Ok(Self { raw, at })
    }
}

impl From<DateTime<Utc>> for Deadline {
    fn from(at: DateTime<Utc>) -> Self {
        Self {
            raw: at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            at,
        }
    }
}

impl From<Deadline> for String {
    fn from(deadline: Deadline) -> Self {
        deadline.raw
    }
}

/// Optional trading constraints attached to an intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Constraints {
    /// Intent is unmatchable at or after this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Deadline>,
    /// Upper bound on `give.amountMax / get.amountMin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_limit: Option<f64>,
}

// ============================================================================
// INTENTS AND MATCHES
// ============================================================================

/// An admitted intent, as held by the pool.
///
/// Only constructed after the signature over the canonical message recovered
/// to `maker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Identifier assigned at admission
    pub id: Uuid,
    /// Admission instant
    pub created_at: DateTime<Utc>,
    /// Recovered signer address (EIP-55 checksummed)
    pub maker: String,
    pub give: GiveSide,
    pub get: GetSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// EIP-191 personal_sign signature (0x-prefixed hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Intent {
    /// Price the maker pays: `give.amount_max / get.amount_min`.
    ///
    /// Returns `None` when the ratio is undefined (non-positive `amount_min`)
    /// or not finite.
    pub fn price(&self) -> Option<f64> {
        if !(self.get.amount_min > 0.0) {
            return None;
        }
        let price = self.give.amount_max / self.get.amount_min;
        price.is_finite().then_some(price)
    }

    pub fn price_limit(&self) -> Option<f64> {
        self.constraints.as_ref().and_then(|c| c.price_limit)
    }

    pub fn deadline(&self) -> Option<&Deadline> {
        self.constraints.as_ref().and_then(|c| c.deadline.as_ref())
    }

    /// Whether the intent is still open at `now`. Intents without a deadline
    /// never expire.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline().map_or(true, |deadline| deadline.is_after(now))
    }
}

/// A cleared pair of intents. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub intent_a: Intent,
    pub intent_b: Intent,
    /// Mean of both intents' prices
    pub clearing_price: f64,
    pub created_at: DateTime<Utc>,
}
