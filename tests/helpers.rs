//! Shared test helpers for integration tests
//!
//! The module is organized into several categories:
//! - **Constants**: Fixed maker keys and their addresses
//! - **Builders**: Intents, constraints and signed submissions
//! - **Configuration Builders**: Test configurations

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use intent_pool::config::{ApiConfig, Config, LoggingConfig, SolverConfig};
use intent_pool::crypto::LocalSigner;
use intent_pool::signing::{self, IntentDraft};
use intent_pool::submission::SubmitIntentRequest;
use intent_pool::types::{Asset, Constraints, Deadline, GetSide, GiveSide, Intent};
use uuid::Uuid;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Private key 1 (well-known test key)
pub const MAKER_A_PRIVATE_KEY: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

/// EIP-55 address of private key 1
pub const MAKER_A_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

/// Private key 2 (well-known test key)
pub const MAKER_B_PRIVATE_KEY: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002";

/// EIP-55 address of private key 2
pub const MAKER_B_ADDRESS: &str = "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF";

/// Dummy maker for unsigned intents placed directly in the pool
pub const DUMMY_MAKER_ADDR: &str = "0x0000000000000000000000000000000000000abc";

pub const DUMMY_NONCE: &str = "nonce-1";

// ============================================================================
// ASSETS
// ============================================================================

pub fn usdc() -> Asset {
    Asset::new("Ethereum", "USDC")
}

pub fn eth() -> Asset {
    Asset::new("Ethereum", "ETH")
}

// ============================================================================
// INTENT BUILDERS
// ============================================================================

/// Unsigned intent for pool and solver tests.
pub fn make_intent(
    give: Asset,
    amount_max: f64,
    get: Asset,
    amount_min: f64,
    constraints: Option<Constraints>,
) -> Intent {
    Intent {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        maker: DUMMY_MAKER_ADDR.to_string(),
        give: GiveSide {
            asset: give,
            amount_max,
        },
        get: GetSide {
            asset: get,
            amount_min,
        },
        constraints,
        signature: None,
    }
}

/// Intent A: give 2000 USDC, get 1 ETH.
pub fn usdc_for_eth(constraints: Option<Constraints>) -> Intent {
    make_intent(usdc(), 2000.0, eth(), 1.0, constraints)
}

/// Intent B: give 1 ETH, get 1800 USDC.
pub fn eth_for_usdc(constraints: Option<Constraints>) -> Intent {
    make_intent(eth(), 1.0, usdc(), 1800.0, constraints)
}

pub fn with_deadline(at: DateTime<Utc>) -> Option<Constraints> {
    Some(Constraints {
        deadline: Some(Deadline::from(at)),
        price_limit: None,
    })
}

pub fn with_price_limit(limit: f64) -> Option<Constraints> {
    Some(Constraints {
        deadline: None,
        price_limit: Some(limit),
    })
}

pub fn an_hour_ago() -> DateTime<Utc> {
    Utc::now() - Duration::hours(1)
}

pub fn in_an_hour() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

// ============================================================================
// SIGNED SUBMISSIONS
// ============================================================================

pub fn signer(private_key: &str) -> LocalSigner {
    LocalSigner::from_hex(private_key).expect("test key must be valid")
}

/// Signs a draft with `signer` and returns the submission body.
pub fn signed_request(signer: &LocalSigner, draft: IntentDraft, nonce: &str) -> SubmitIntentRequest {
    let message = signing::canonical_message(&draft, nonce);
    let signature = signer.sign_message(&message).expect("signing must succeed");
    SubmitIntentRequest {
        maker: draft.maker,
        give: draft.give,
        get: draft.get,
        constraints: draft.constraints,
        nonce: nonce.to_string(),
        signature,
    }
}

/// Draft giving `amount_max` of `give` for at least `amount_min` of `get`,
/// made by `maker`.
pub fn draft(
    maker: &str,
    give: Asset,
    amount_max: f64,
    get: Asset,
    amount_min: f64,
    constraints: Option<Constraints>,
) -> IntentDraft {
    IntentDraft {
        maker: maker.to_string(),
        give: GiveSide {
            asset: give,
            amount_max,
        },
        get: GetSide {
            asset: get,
            amount_min,
        },
        constraints,
    }
}

/// Maker A signs "give 2000 USDC, get 1 ETH".
pub fn signed_usdc_for_eth() -> SubmitIntentRequest {
    let maker = signer(MAKER_A_PRIVATE_KEY);
    let d = draft(&maker.address(), usdc(), 2000.0, eth(), 1.0, None);
    signed_request(&maker, d, DUMMY_NONCE)
}

/// Maker B signs "give 1 ETH, get 1800 USDC".
pub fn signed_eth_for_usdc() -> SubmitIntentRequest {
    let maker = signer(MAKER_B_PRIVATE_KEY);
    let d = draft(&maker.address(), eth(), 1.0, usdc(), 1800.0, None);
    signed_request(&maker, d, DUMMY_NONCE)
}

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Configuration with the background solver disabled.
pub fn build_test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3333,
            cors_origins: vec!["*".to_string()],
        },
        solver: SolverConfig::default(),
        logging: LoggingConfig::default(),
    }
}
