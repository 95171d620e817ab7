//! Double-spend adjudication.
//!
//! Two redemptions of one coin each reveal one half of every identity share.
//! Wherever they revealed opposite halves, XORing the two recovers
//! `IDENT:<purchaser>`. Honest coins are only ever redeemed once, so their
//! owners stay anonymous.

use crate::error::{Error, Result};
use crate::params::IDENT_TAG;
use crate::redeem::DisclosureRecord;
use crate::utils::xor_decode;
use serde::{Deserialize, Serialize};

/// Outcome of comparing two disclosure records for the same coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every share disclosed the same half both times.
    SameDisclosure,
    /// The recovered `IDENT:<purchaser>` plaintext.
    DoubleSpenderIdentified(String),
    /// The records differ but do not combine into an identity.
    MerchantCheating,
}

/// How many differing shares must agree before a spender is named.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjudicationPolicy {
    /// Decide on the first differing share.
    FirstMatch,
    /// Every differing share must recover the same identity.
    Unanimous,
}

impl Default for AdjudicationPolicy {
    fn default() -> Self {
        AdjudicationPolicy::FirstMatch
    }
}

/// Compares two disclosure records of coin `guid` under the default policy.
pub fn adjudicate(
    guid: &str,
    first: &DisclosureRecord,
    second: &DisclosureRecord,
) -> Result<Verdict> {
    Adjudicator::default().adjudicate(guid, first, second)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Adjudicator {
    policy: AdjudicationPolicy,
}

impl Adjudicator {
    pub fn new(policy: AdjudicationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AdjudicationPolicy {
        self.policy
    }

    pub fn adjudicate(
        &self,
        guid: &str,
        first: &DisclosureRecord,
        second: &DisclosureRecord,
    ) -> Result<Verdict> {
        for record in [first, second].iter() {
            if record.guid != guid {
                return Err(Error::GuidMismatch {
                    expected: guid.to_string(),
                    found: record.guid.clone(),
                });
            }
        }
        if first.len() != second.len() {
            return Err(Error::LengthMismatch {
                left: first.len(),
                right: second.len(),
            });
        }

        let mut identified: Option<String> = None;
        let differing = first
            .disclosures
            .iter()
            .zip(&second.disclosures)
            .enumerate()
            .filter(|(_, (a, b))| a.value_hex != b.value_hex);

        for (index, (a, b)) in differing {
            let identity = match recover_identity(&a.value_hex, &b.value_hex) {
                Some(identity) => identity,
                None => return Ok(cheating(guid, index)),
            };
            match self.policy {
                AdjudicationPolicy::FirstMatch => return Ok(identified_spender(guid, identity)),
                AdjudicationPolicy::Unanimous => match &identified {
                    Some(previous) if *previous != identity => return Ok(cheating(guid, index)),
                    Some(_) => {}
                    None => identified = Some(identity),
                },
            }
        }

        Ok(match identified {
            Some(identity) => identified_spender(guid, identity),
            None => {
                tracing::info!(%guid, "both records disclosed the same halves");
                Verdict::SameDisclosure
            }
        })
    }
}

/// XORs two hex-encoded halves and keeps the result only if it is an
/// identity plaintext.
fn recover_identity(a_hex: &str, b_hex: &str) -> Option<String> {
    let a = hex::decode(a_hex).ok()?;
    let b = hex::decode(b_hex).ok()?;
    let plaintext = xor_decode(&a, &b).ok()?;
    let plaintext = String::from_utf8(plaintext).ok()?;
    if plaintext.starts_with(IDENT_TAG) {
        Some(plaintext)
    } else {
        None
    }
}

fn identified_spender(guid: &str, identity: String) -> Verdict {
    tracing::warn!(%guid, %identity, "double-spender identified");
    Verdict::DoubleSpenderIdentified(identity)
}

fn cheating(guid: &str, index: usize) -> Verdict {
    tracing::warn!(%guid, index, "disclosures do not combine into an identity");
    Verdict::MerchantCheating
}
