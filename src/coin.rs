use crate::blind_sigs::{
    check_issuer_key, verify_commitment_signature, BlindSignature, BlindedCommitment,
    BlindingFactor,
};
use crate::commitment::Commitment;
use crate::error::{Error, Result};
use crate::params::ProtocolParams;
use crate::shares::{IdentityShare, Side};
use crate::utils::opaque_id;
use blsttc::{PublicKey, Signature};
use std::fmt;

/// A single electronic coin.
///
/// The purchaser builds it, has the bank sign its blinded commitment, then
/// unblinds the signature. From then on anyone holding the coin can spend it,
/// and each spend discloses one half of every identity share.
#[derive(Clone)]
pub struct Coin {
    amount: u64,
    guid: String,
    issuer_key: PublicKey,
    pub(crate) shares: Vec<IdentityShare>,
    commitment: Commitment,
    blinding_factor: Option<BlindingFactor>,
    blinded: BlindedCommitment,
    signature: Option<Signature>,
}

impl Coin {
    /// Builds an unsigned coin for `purchaser` and blinds its commitment
    /// against `issuer_key`.
    pub fn new(
        purchaser: &str,
        amount: u64,
        issuer_key: &PublicKey,
        params: &ProtocolParams,
    ) -> Result<Self> {
        params.validate()?;
        check_issuer_key(issuer_key)?;
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }

        let guid = opaque_id();
        // every share gets its own pad; reusing one would link disclosures
        let shares: Vec<IdentityShare> = (0..params.share_count)
            .map(|_| IdentityShare::new(purchaser))
            .collect();

        let commitment = Commitment {
            bank_tag: params.bank_tag.clone(),
            amount,
            guid: guid.clone(),
            shares: shares.iter().map(IdentityShare::hashes).collect(),
        };

        let blinding_factor = BlindingFactor::random()?;
        let blinded = blinding_factor.blind(&commitment.to_bytes())?;

        tracing::debug!(%guid, amount, shares = shares.len(), "coin minted");

        Ok(Self {
            amount,
            guid,
            issuer_key: issuer_key.clone(),
            shares,
            commitment,
            blinding_factor: Some(blinding_factor),
            blinded,
            signature: None,
        })
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn issuer_key(&self) -> &PublicKey {
        &self.issuer_key
    }

    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    /// What the purchaser hands to the bank for signing.
    pub fn blinded(&self) -> &BlindedCommitment {
        &self.blinded
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn share_count(&self) -> usize {
        self.shares.len()
    }

    /// Replaces the bank's blind signature with a signature on the
    /// commitment itself and drops the blinding factor.
    ///
    /// Fails with `InvalidSignature` if the result does not verify, which
    /// means the bank signed something other than this coin's blinded
    /// commitment or used a different key.
    pub fn unblind(&mut self, blind_sig: &BlindSignature) -> Result<()> {
        let factor = self.blinding_factor.as_ref().ok_or(Error::InvalidSignature)?;
        let signature = factor.unblind(blind_sig)?;
        if !verify_commitment_signature(&self.commitment.to_bytes(), &signature, &self.issuer_key)
        {
            tracing::warn!(guid = %self.guid, "unblinded signature does not verify");
            return Err(Error::InvalidSignature);
        }

        self.signature = Some(signature);
        self.blinding_factor = None;
        tracing::debug!(guid = %self.guid, "coin unblinded");
        Ok(())
    }

    /// Whether the coin carries a valid bank signature on its commitment.
    pub fn is_valid(&self) -> bool {
        match &self.signature {
            Some(sig) => {
                verify_commitment_signature(&self.commitment.to_bytes(), sig, &self.issuer_key)
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_amount_for_test(&mut self, amount: u64) {
        self.amount = amount;
        self.commitment.amount = amount;
    }

    /// The requested half of identity share `index`.
    pub fn disclose(&self, side: Side, index: usize) -> Option<&[u8]> {
        self.shares.get(index).map(|share| share.half(side))
    }
}

// share halves and the blinding factor stay out of logs
impl fmt::Debug for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coin")
            .field("amount", &self.amount)
            .field("guid", &self.guid)
            .field("shares", &self.shares.len())
            .field("blinded", &self.blinding_factor.is_some())
            .field("signed", &self.signature.is_some())
            .finish()
    }
}
