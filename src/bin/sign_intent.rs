//! Intent Signing Utility
//!
//! Builds the canonical message for an intent, signs it as an EIP-191
//! personal message and prints the JSON body accepted by `POST /intents`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin sign_intent -- \
//!   --private-key 0x<32-byte hex> \
//!   --give-amount 2000 --give-symbol USDC --give-chain Ethereum \
//!   --get-amount 1 --get-symbol ETH --get-chain Ethereum \
//!   --price-limit 2100 \
//!   --deadline 2030-01-01T00:00:00Z
//! ```
//!
//! Without `--private-key` a fresh key is generated and reported on stderr.

use anyhow::{Context, Result};
use clap::Parser;

use intent_pool::crypto::LocalSigner;
use intent_pool::signing::{self, IntentDraft};
use intent_pool::submission::SubmitIntentRequest;
use intent_pool::types::{Asset, Constraints, Deadline, GetSide, GiveSide};

#[derive(Debug, Parser)]
#[command(name = "sign_intent", about = "Sign an intent for the intent pool service")]
struct Args {
    /// Maker private key (32-byte hex, 0x optional)
    #[arg(long, env = "INTENT_MAKER_PRIVATE_KEY")]
    private_key: Option<String>,

    /// Maximum amount given
    #[arg(long)]
    give_amount: f64,
    #[arg(long)]
    give_symbol: String,
    #[arg(long)]
    give_chain: String,

    /// Minimum amount received
    #[arg(long)]
    get_amount: f64,
    #[arg(long)]
    get_symbol: String,
    #[arg(long)]
    get_chain: String,

    /// Upper bound on give_amount / get_amount
    #[arg(long)]
    price_limit: Option<f64>,

    /// RFC 3339 expiry, e.g. 2030-01-01T00:00:00Z
    #[arg(long)]
    deadline: Option<String>,

    /// Nonce (defaults to a random UUID)
    #[arg(long)]
    nonce: Option<String>,

    /// Print the canonical message to stderr
    #[arg(long)]
    show_message: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let signer = match &args.private_key {
        Some(key) => LocalSigner::from_hex(key)?,
        None => {
            let signer = LocalSigner::random();
            eprintln!("Generated private key: {}", signer.private_key_hex());
            signer
        }
    };

    let deadline = args
        .deadline
        .map(Deadline::try_from)
        .transpose()
        .context("--deadline must be an RFC 3339 timestamp")?;
    let constraints = (deadline.is_some() || args.price_limit.is_some()).then(|| Constraints {
        deadline,
        price_limit: args.price_limit,
    });

    let draft = IntentDraft {
        maker: signer.address(),
        give: GiveSide {
            asset: Asset::new(args.give_chain, args.give_symbol),
            amount_max: args.give_amount,
        },
        get: GetSide {
            asset: Asset::new(args.get_chain, args.get_symbol),
            amount_min: args.get_amount,
        },
        constraints,
    };
    let nonce = args
        .nonce
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let message = signing::canonical_message(&draft, &nonce);
    if args.show_message {
        eprintln!("Canonical message:\n{}\n", message);
    }
    let signature = signer.sign_message(&message)?;

    let request = SubmitIntentRequest {
        maker: draft.maker,
        give: draft.give,
        get: draft.get,
        constraints: draft.constraints,
        nonce,
        signature,
    };
    println!("{}", serde_json::to_string_pretty(&request)?);

    Ok(())
}
