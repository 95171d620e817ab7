//! Anonymous electronic cash with double-spender identification.
//!
//! A purchaser builds a [`Coin`] holding redundant identity shares, has the
//! [`Bank`] blind-sign its commitment, and unblinds the signature. A
//! [`Merchant`] verifies the coin and asks for one half of every share. Two
//! redemptions of the same coin almost surely reveal opposite halves of some
//! share, which [`adjudicate`] combines into the spender's identity.

mod adjudicate;
mod blind_sigs;
mod coin;
mod commitment;
mod curve;
mod error;
mod params;
mod redeem;
mod shares;
pub mod utils;

pub use crate::adjudicate::{adjudicate, AdjudicationPolicy, Adjudicator, Verdict};
pub use crate::blind_sigs::{
    check_issuer_key, parse_issuer_key, verify_commitment_signature, Bank, BlindSignature,
    BlindedCommitment, BlindingFactor, ISSUER_KEY_SIZE,
};
pub use crate::coin::Coin;
pub use crate::commitment::Commitment;
pub use crate::error::{EcashError, Error, Result};
pub use crate::params::{ProtocolParams, BANK_TAG, DEFAULT_SHARE_COUNT, IDENT_TAG};
pub use crate::redeem::{Challenge, Disclosure, DisclosureRecord, Merchant, Redemption};
pub use crate::shares::{IdentityShare, ShareHashes, Side};
pub use blsttc::{PublicKey, SecretKey, Signature};
