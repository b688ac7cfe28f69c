// src/account.rs
use std::time::Duration;

use ed25519_dalek::SigningKey;
use log::{debug, info};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};

use crate::catalog::Network;

/// Default faucet grant, in octas (1 APT).
const FUND_AMOUNT_OCTAS: &str = "100000000";

const FAUCET_TIMEOUT: Duration = Duration::from_secs(30);

/// The module publisher key pair embedded in the generated project's
/// environment file. Created once per scaffold run; the tool keeps no
/// reference after the env file is written.
#[derive(Debug, Clone)]
pub struct PublisherAccount {
  /// `0x`-prefixed account address (single-signature auth key).
  pub address: String,
  /// `0x`-prefixed ed25519 private key.
  pub private_key: String,
}

impl PublisherAccount {
  pub fn generate() -> Self {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_key = signing_key.verifying_key();

    // Single-signature scheme: auth key = SHA3-256(public key || 0x00),
    // and the account address of a fresh account equals its auth key.
    let mut hasher = Sha3_256::new();
    hasher.update(public_key.as_bytes());
    hasher.update([0u8]);
    let auth_key = hasher.finalize();

    Self {
      address: format!("0x{}", hex::encode(auth_key)),
      private_key: format!("0x{}", hex::encode(signing_key.to_bytes())),
    }
  }
}

/// What happened to the faucet request for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
  Funded,
  /// Mainnet: no faucet exists and none is attempted.
  SkippedMainnet,
  /// The faucet call failed; scaffolding continues with an unfunded account.
  Failed(String),
}

/// Funds the publisher account on networks that have a faucet. Failure is
/// reported, never fatal: the caller still embeds the credentials and tells
/// the user to fund manually.
pub fn fund_publisher(account: &PublisherAccount, network: Network) -> FundingOutcome {
  let Some(faucet_url) = network.faucet_url() else {
    return FundingOutcome::SkippedMainnet;
  };

  info!(
    "Requesting {} faucet funds for {}...",
    network, account.address
  );
  match request_funding(faucet_url, &account.address) {
    Ok(()) => {
      info!("Publisher account funded on {}.", network);
      FundingOutcome::Funded
    }
    Err(err) => FundingOutcome::Failed(err.to_string()),
  }
}

fn request_funding(faucet_url: &str, address: &str) -> Result<(), reqwest::Error> {
  let client = reqwest::blocking::Client::builder()
    .timeout(FAUCET_TIMEOUT)
    .build()?;

  let response = client
    .post(format!("{}/mint", faucet_url))
    .query(&[("amount", FUND_AMOUNT_OCTAS), ("address", address)])
    .send()?
    .error_for_status()?;

  // The faucet answers with the submitted transaction hashes.
  let txn_hashes: Vec<String> = response.json()?;
  debug!("Faucet submitted {} funding transaction(s)", txn_hashes.len());
  Ok(())
}
