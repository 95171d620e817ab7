use crate::blind_sigs::{check_issuer_key, verify_commitment_signature};
use crate::coin::Coin;
use crate::commitment::Commitment;
use crate::error::{Error, Result};
use crate::params::ProtocolParams;
use crate::shares::Side;
use crate::utils::uniform_int;
use blsttc::PublicKey;
use serde::{Deserialize, Serialize};

/// The per-share halves a merchant asks a coin to reveal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge(Vec<Side>);

impl Challenge {
    /// Picks left or right for each of `n` shares with a fair coin flip.
    pub fn random(n: usize) -> Result<Self> {
        let sides = (0..n)
            .map(|_| {
                uniform_int(2).map(|bit| if bit == 0 { Side::Left } else { Side::Right })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(sides))
    }

    pub fn sides(&self) -> &[Side] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Side>> for Challenge {
    fn from(sides: Vec<Side>) -> Self {
        Self(sides)
    }
}

/// One revealed half of an identity share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    pub side: Side,
    pub value_hex: String,
}

/// Everything a merchant learns about the spender from one redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureRecord {
    pub guid: String,
    pub disclosures: Vec<Disclosure>,
}

impl DisclosureRecord {
    pub fn len(&self) -> usize {
        self.disclosures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disclosures.is_empty()
    }
}

/// An accepted coin: its parsed commitment and the disclosed halves.
#[derive(Clone, Debug)]
pub struct Redemption {
    pub commitment: Commitment,
    pub record: DisclosureRecord,
}

/// A merchant accepting coins in one commitment format.
///
/// Signatures are checked against the issuer key carried by each coin. A
/// merchant built with `trusting` additionally refuses coins whose key is
/// not the given bank's.
#[derive(Clone, Debug, Default)]
pub struct Merchant {
    params: ProtocolParams,
    trusted_issuer: Option<PublicKey>,
}

impl Merchant {
    pub fn new(params: ProtocolParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            trusted_issuer: None,
        })
    }

    /// Pins the bank whose key every accepted coin must carry.
    pub fn trusting(mut self, issuer_key: PublicKey) -> Result<Self> {
        check_issuer_key(&issuer_key)?;
        self.trusted_issuer = Some(issuer_key);
        Ok(self)
    }

    pub fn trusted_issuer(&self) -> Option<&PublicKey> {
        self.trusted_issuer.as_ref()
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Verifies `coin` and challenges it with a fresh random side per share.
    pub fn redeem(&self, coin: &Coin) -> Result<Redemption> {
        let commitment = self.check_coin(coin)?;
        let challenge = Challenge::random(commitment.share_count())?;
        self.collect(coin, commitment, &challenge)
    }

    /// Like `redeem`, with the merchant choosing the challenge.
    pub fn redeem_with_challenge(
        &self,
        coin: &Coin,
        challenge: &Challenge,
    ) -> Result<Redemption> {
        let commitment = self.check_coin(coin)?;
        if challenge.len() != commitment.share_count() {
            return Err(Error::LengthMismatch {
                left: challenge.len(),
                right: commitment.share_count(),
            });
        }
        self.collect(coin, commitment, challenge)
    }

    fn check_coin(&self, coin: &Coin) -> Result<Commitment> {
        let sig = coin.signature().ok_or_else(|| {
            tracing::warn!(guid = coin.guid(), "rejected unsigned coin");
            Error::InvalidSignature
        })?;

        if let Some(trusted) = &self.trusted_issuer {
            if trusted != coin.issuer_key() {
                tracing::warn!(guid = coin.guid(), "rejected coin from an untrusted issuer");
                return Err(Error::InvalidSignature);
            }
        }

        let message = coin.commitment().to_string();
        if !verify_commitment_signature(message.as_bytes(), sig, coin.issuer_key()) {
            tracing::warn!(guid = coin.guid(), "rejected coin with invalid signature");
            return Err(Error::InvalidSignature);
        }

        let commitment = Commitment::parse(&message, &self.params.bank_tag).map_err(|e| {
            tracing::warn!(guid = coin.guid(), error = %e, "rejected malformed coin");
            e
        })?;
        if commitment.share_count() != coin.share_count() {
            return Err(Error::MalformedCommitment(format!(
                "commitment lists {} shares but coin holds {}",
                commitment.share_count(),
                coin.share_count()
            )));
        }
        Ok(commitment)
    }

    fn collect(
        &self,
        coin: &Coin,
        commitment: Commitment,
        challenge: &Challenge,
    ) -> Result<Redemption> {
        let mut disclosures = Vec::with_capacity(challenge.len());
        for (index, (&side, hashes)) in challenge
            .sides()
            .iter()
            .zip(&commitment.shares)
            .enumerate()
        {
            let half = coin
                .disclose(side, index)
                .ok_or(Error::RisVerificationFailed { index })?;
            if !hashes.matches(side, half) {
                tracing::warn!(guid = coin.guid(), index, "identity share failed verification");
                return Err(Error::RisVerificationFailed { index });
            }
            disclosures.push(Disclosure {
                side,
                value_hex: hex::encode(half),
            });
        }

        tracing::info!(guid = coin.guid(), amount = commitment.amount, "coin redeemed");

        let record = DisclosureRecord {
            guid: commitment.guid.clone(),
            disclosures,
        };
        Ok(Redemption { commitment, record })
    }
}
