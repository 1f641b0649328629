//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    an_hour_ago, build_test_config, draft, eth, eth_for_usdc, in_an_hour, make_intent,
    signed_eth_for_usdc, signed_request, signed_usdc_for_eth, signer, usdc, usdc_for_eth,
    with_deadline, with_price_limit, DUMMY_MAKER_ADDR, DUMMY_NONCE, MAKER_A_ADDRESS,
    MAKER_A_PRIVATE_KEY, MAKER_B_ADDRESS, MAKER_B_PRIVATE_KEY,
};
