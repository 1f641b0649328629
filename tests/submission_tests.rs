//! Unit tests for intent admission
//!
//! These tests verify that signed submissions are admitted with the
//! recovered maker, and that every tampered or malformed submission is
//! rejected without touching the pool.

use intent_pool::storage::IntentPool;
use intent_pool::submission::{parse_request, submit_intent, verify_submission, SubmissionError};
use intent_pool::types::{Asset, Constraints, Deadline};

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{
    draft, eth, in_an_hour, signed_eth_for_usdc, signed_request, signed_usdc_for_eth, signer, usdc,
    DUMMY_NONCE, MAKER_A_ADDRESS, MAKER_A_PRIVATE_KEY, MAKER_B_ADDRESS,
};

async fn assert_rejected_as_mismatch_or_bad(request: intent_pool::SubmitIntentRequest) {
    let pool = IntentPool::new();
    let err = submit_intent(request, &pool).await.unwrap_err();
    assert!(
        matches!(
            err,
            SubmissionError::SignerMismatch { .. } | SubmissionError::BadSignature(_)
        ),
        "unexpected error: {:?}",
        err
    );
    assert!(pool.is_empty().await);
}

async fn assert_validation_error(request: intent_pool::SubmitIntentRequest) {
    let pool = IntentPool::new();
    let err = submit_intent(request, &pool).await.unwrap_err();
    assert!(
        matches!(err, SubmissionError::Validation(_)),
        "unexpected error: {:?}",
        err
    );
    assert!(pool.is_empty().await);
}

// ============================================================================
// ADMISSION
// ============================================================================

/// Test admitting a correctly signed intent
/// What is tested: The stored intent carries the recovered maker, terms and signature
/// Why: Only verified intents may enter the pool
#[tokio::test]
async fn test_submit_valid_intent() {
    let pool = IntentPool::new();
    let request = signed_usdc_for_eth();
    let signature = request.signature.clone();

    let intent = submit_intent(request, &pool).await.unwrap();
    assert_eq!(intent.maker, MAKER_A_ADDRESS);
    assert_eq!(intent.give.asset, usdc());
    assert_eq!(intent.give.amount_max, 2000.0);
    assert_eq!(intent.get.asset, eth());
    assert_eq!(intent.get.amount_min, 1.0);
    assert_eq!(intent.signature, Some(signature));

    assert_eq!(pool.list().await, vec![intent]);
}

/// Test that each admission gets a fresh id
/// What is tested: Two submissions of the same signed body get distinct ids
/// Why: Ids identify pool entries; nonces are not deduplicated
#[tokio::test]
async fn test_ids_are_unique() {
    let pool = IntentPool::new();
    let first = submit_intent(signed_usdc_for_eth(), &pool).await.unwrap();
    let second = submit_intent(signed_usdc_for_eth(), &pool).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(pool.len().await, 2);
}

/// Test lower-case maker claims
/// What is tested: A lower-cased maker is accepted and stored checksummed
/// Why: Address casing is not part of identity
#[tokio::test]
async fn test_lowercase_maker_accepted() {
    let pool = IntentPool::new();
    let maker = signer(MAKER_A_PRIVATE_KEY);
    let d = draft(&MAKER_A_ADDRESS.to_lowercase(), usdc(), 10.0, eth(), 0.005, None);
    let request = signed_request(&maker, d, DUMMY_NONCE);

    let intent = submit_intent(request, &pool).await.unwrap();
    assert_eq!(intent.maker, MAKER_A_ADDRESS);
}

/// Test admission with constraints
/// What is tested: Deadline and price limit are signed, verified and stored
/// Why: Constraints are part of the signed terms
#[tokio::test]
async fn test_submit_with_constraints() {
    let pool = IntentPool::new();
    let maker = signer(MAKER_A_PRIVATE_KEY);
    let constraints = Constraints {
        deadline: Some(Deadline::from(in_an_hour())),
        price_limit: Some(2100.0),
    };
    let d = draft(MAKER_A_ADDRESS, usdc(), 2000.0, eth(), 1.0, Some(constraints.clone()));

    let intent = submit_intent(signed_request(&maker, d, "n-2"), &pool).await.unwrap();
    assert_eq!(intent.constraints, Some(constraints));
}

// ============================================================================
// TAMPERING
// ============================================================================

/// Test claiming another maker
/// What is tested: Maker A's signature submitted under maker B's address
/// Why: The recovered signer must equal the claimed maker
#[tokio::test]
async fn test_claimed_maker_mismatch() {
    let mut request = signed_usdc_for_eth();
    request.maker = MAKER_B_ADDRESS.to_string();

    let pool = IntentPool::new();
    match submit_intent(request, &pool).await {
        Err(SubmissionError::SignerMismatch { recovered, claimed }) => {
            assert_ne!(recovered, MAKER_B_ADDRESS);
            assert_eq!(claimed, MAKER_B_ADDRESS);
        }
        other => panic!("expected signer mismatch, got {:?}", other),
    }
    assert!(pool.is_empty().await);
}

/// Test tampering with the amount
/// What is tested: Raising amountMax after signing
/// Why: Every term is bound by the signature
#[tokio::test]
async fn test_tampered_amount() {
    let mut request = signed_usdc_for_eth();
    request.give.amount_max = 2000.5;
    assert_rejected_as_mismatch_or_bad(request).await;
}

/// Test tampering with an asset
/// What is tested: Changing the get symbol and the give chain after signing
/// Why: Every term is bound by the signature
#[tokio::test]
async fn test_tampered_asset() {
    let mut request = signed_eth_for_usdc();
    request.get.asset = Asset::new("Ethereum", "USDT");
    assert_rejected_as_mismatch_or_bad(request).await;

    let mut request = signed_eth_for_usdc();
    request.give.asset.chain = "Base".to_string();
    assert_rejected_as_mismatch_or_bad(request).await;
}

/// Test tampering with the nonce
/// What is tested: Replacing the nonce after signing
/// Why: The nonce is part of the signed message
#[tokio::test]
async fn test_tampered_nonce() {
    let mut request = signed_usdc_for_eth();
    request.nonce = "nonce-2".to_string();
    assert_rejected_as_mismatch_or_bad(request).await;
}

/// Test adding constraints after signing
/// What is tested: A deadline or price limit added to an unconstrained signed body
/// Why: Constraints are part of the signed message
#[tokio::test]
async fn test_tampered_constraints() {
    let mut request = signed_usdc_for_eth();
    request.constraints = Some(Constraints {
        deadline: Some(Deadline::from(in_an_hour())),
        price_limit: None,
    });
    assert_rejected_as_mismatch_or_bad(request).await;

    let mut request = signed_usdc_for_eth();
    request.constraints = Some(Constraints {
        deadline: None,
        price_limit: Some(5000.0),
    });
    assert_rejected_as_mismatch_or_bad(request).await;
}

/// Test a garbage signature
/// What is tested: A signature of the wrong length
/// Why: Malformed signatures are rejected as bad, not as a mismatch
#[tokio::test]
async fn test_malformed_signature() {
    let mut request = signed_usdc_for_eth();
    request.signature = "0xdeadbeef".to_string();

    let pool = IntentPool::new();
    assert!(matches!(
        submit_intent(request, &pool).await,
        Err(SubmissionError::BadSignature(_))
    ));
    assert!(pool.is_empty().await);
}

/// Test verification without admission
/// What is tested: verify_submission returns the recovered address
/// Why: The signer check is usable independently of the pool
#[test]
fn test_verify_submission() {
    assert_eq!(verify_submission(&signed_usdc_for_eth()).unwrap(), MAKER_A_ADDRESS);
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Test maker address validation
/// What is tested: Missing prefix and wrong length
/// Why: Malformed addresses are a validation error before any recovery
#[tokio::test]
async fn test_invalid_maker_address() {
    let mut request = signed_usdc_for_eth();
    request.maker = MAKER_A_ADDRESS.trim_start_matches("0x").to_string();
    assert_validation_error(request).await;

    let mut request = signed_usdc_for_eth();
    request.maker = "0x1234".to_string();
    assert_validation_error(request).await;
}

/// Test amount validation
/// What is tested: Zero, negative and non-finite amounts
/// Why: Prices are undefined for non-positive amounts
#[tokio::test]
async fn test_invalid_amounts() {
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut request = signed_usdc_for_eth();
        request.give.amount_max = bad;
        assert_validation_error(request).await;

        let mut request = signed_usdc_for_eth();
        request.get.amount_min = bad;
        assert_validation_error(request).await;
    }
}

/// Test price limit validation
/// What is tested: A zero price limit
/// Why: A limit of zero could never be satisfied and is not "absent"
#[tokio::test]
async fn test_invalid_price_limit() {
    let mut request = signed_usdc_for_eth();
    request.constraints = Some(Constraints {
        deadline: None,
        price_limit: Some(0.0),
    });
    assert_validation_error(request).await;
}

/// Test asset field validation
/// What is tested: Empty symbol, whitespace in symbol, control character in chain
/// Why: Such fields make the canonical message ambiguous
#[tokio::test]
async fn test_invalid_asset_fields() {
    let mut request = signed_usdc_for_eth();
    request.give.asset.symbol = String::new();
    assert_validation_error(request).await;

    let mut request = signed_usdc_for_eth();
    request.get.asset.symbol = "E TH".to_string();
    assert_validation_error(request).await;

    let mut request = signed_usdc_for_eth();
    request.give.asset.chain = "Ethereum\nnonce:x".to_string();
    assert_validation_error(request).await;
}

/// Test nonce and signature presence
/// What is tested: Empty nonce, nonce with a newline, empty signature
/// Why: Both are required to rebuild and check the message
#[tokio::test]
async fn test_empty_nonce_and_signature() {
    let mut request = signed_usdc_for_eth();
    request.nonce = String::new();
    assert_validation_error(request).await;

    let mut request = signed_usdc_for_eth();
    request.nonce = "a\nb".to_string();
    assert_validation_error(request).await;

    let mut request = signed_usdc_for_eth();
    request.signature = String::new();
    assert_validation_error(request).await;
}

// ============================================================================
// PARSING
// ============================================================================

/// Test request parsing
/// What is tested: A serialized request parses back; broken JSON and schema errors do not
/// Why: All body errors surface as validation errors
#[test]
fn test_parse_request() {
    let request = signed_usdc_for_eth();
    let body = serde_json::to_vec(&request).unwrap();
    let parsed = parse_request(&body).unwrap();
    assert_eq!(parsed.signature, request.signature);
    assert_eq!(parsed.maker, request.maker);

    assert!(matches!(parse_request(b"{not json"), Err(SubmissionError::Validation(_))));

    let mut value = serde_json::to_value(&request).unwrap();
    value["extra"] = serde_json::json!(1);
    let body = serde_json::to_vec(&value).unwrap();
    assert!(matches!(parse_request(&body), Err(SubmissionError::Validation(_))));

    let mut value = serde_json::to_value(&request).unwrap();
    value.as_object_mut().unwrap().remove("nonce");
    let body = serde_json::to_vec(&value).unwrap();
    assert!(matches!(parse_request(&body), Err(SubmissionError::Validation(_))));
}

/// Test camelCase wire names
/// What is tested: A hand-written body with amountMax/amountMin/priceLimit parses
/// Why: Clients write JSON by hand, not through this crate
#[test]
fn test_parse_wire_names() {
    let body = br#"{
        "maker": "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        "give": {"asset": {"chain": "Ethereum", "symbol": "USDC"}, "amountMax": 2000},
        "get": {"asset": {"chain": "Ethereum", "symbol": "ETH"}, "amountMin": 1},
        "constraints": {"priceLimit": 2100, "deadline": "2030-01-01T00:00:00Z"},
        "nonce": "abc",
        "signature": "0x00"
    }"#;
    let parsed = parse_request(body).unwrap();
    assert_eq!(parsed.give.amount_max, 2000.0);
    assert_eq!(parsed.get.amount_min, 1.0);
    let constraints = parsed.constraints.unwrap();
    assert_eq!(constraints.price_limit, Some(2100.0));
    assert_eq!(constraints.deadline.unwrap().as_str(), "2030-01-01T00:00:00Z");

    let bad_deadline = br#"{
        "maker": "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        "give": {"asset": {"chain": "Ethereum", "symbol": "USDC"}, "amountMax": 2000},
        "get": {"asset": {"chain": "Ethereum", "symbol": "ETH"}, "amountMin": 1},
        "constraints": {"deadline": "tomorrow"},
        "nonce": "abc",
        "signature": "0x00"
    }"#;
    assert!(matches!(parse_request(bad_deadline), Err(SubmissionError::Validation(_))));
}
