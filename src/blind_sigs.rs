use crate::curve::*;
use crate::error::{Error, Result};
use blsttc::pairing::bls12_381::{Fr, G2};
use blsttc::{PublicKey, SecretKey, Signature};
use std::convert::TryFrom;
use std::convert::TryInto;
use std::fmt;

/// Size of a compressed issuer public key.
pub const ISSUER_KEY_SIZE: usize = 48;

/// Decodes an issuer public key, failing fast on anything malformed.
pub fn parse_issuer_key(bytes: &[u8]) -> Result<PublicKey> {
    let bytes: [u8; ISSUER_KEY_SIZE] = bytes.try_into().map_err(|_| Error::InvalidKey)?;
    let pk = PublicKey::from_bytes(bytes).map_err(|_| Error::InvalidKey)?;
    check_issuer_key(&pk)?;
    Ok(pk)
}

/// Rejects the G1 identity, under which every signature verifies.
pub fn check_issuer_key(pk: &PublicKey) -> Result<()> {
    let bytes = pk.to_bytes();
    // compressed point-at-infinity encoding
    if bytes[0] == 0xc0 && bytes[1..].iter().all(|&b| b == 0) {
        return Err(Error::InvalidKey);
    }
    Ok(())
}

/// Checks that `sig` is the bank's signature on `commitment`.
pub fn verify_commitment_signature(commitment: &[u8], sig: &Signature, pk: &PublicKey) -> bool {
    verify_signature_on_commitment(commitment, sig, pk)
}

/// The purchaser's secret scalar that hides a commitment from the bank.
#[derive(Clone)]
pub struct BlindingFactor {
    r: Fr,
}

impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(..)")
    }
}

impl BlindingFactor {
    pub fn random() -> Result<Self> {
        let sk = SecretKey::random();
        Ok(Self {
            r: fr_from_be_bytes(sk.to_bytes())?,
        })
    }

    pub fn blind(&self, commitment: &[u8]) -> Result<BlindedCommitment> {
        let msg_g2 = hash_g2_with_dst(commitment)?;

        Ok(BlindedCommitment::from(blind(msg_g2, self.r)))
    }

    /// Strips the blinding from the bank's signature, leaving a plain
    /// signature on the commitment itself.
    pub fn unblind(&self, blind_sig: &BlindSignature) -> Result<Signature> {
        let blinded_sig_g2 = be_bytes_to_g2(blind_sig.signature.to_bytes())?;
        let unblinded_sig_g2 = unblind(blinded_sig_g2, self.r)?;

        let unblinded_bytes = g2_to_be_bytes(unblinded_sig_g2);
        Ok(Signature::from_bytes(unblinded_bytes)?)
    }
}

impl TryFrom<[u8; 32]> for BlindingFactor {
    type Error = Error;

    fn try_from(b: [u8; 32]) -> Result<Self> {
        Ok(Self {
            r: fr_from_be_bytes(b)?,
        })
    }
}

/// A commitment after blinding: all the bank ever sees of a coin.
#[derive(Clone, Debug)]
pub struct BlindedCommitment {
    blinded_msg: G2,
}

impl BlindedCommitment {
    pub fn blinded_msg(&self) -> G2 {
        self.blinded_msg
    }

    pub fn to_bytes(&self) -> [u8; 96] {
        g2_to_be_bytes(self.blinded_msg)
    }
}

impl From<G2> for BlindedCommitment {
    fn from(blinded_msg: G2) -> Self {
        Self { blinded_msg }
    }
}

impl TryFrom<[u8; 96]> for BlindedCommitment {
    type Error = Error;

    fn try_from(b: [u8; 96]) -> Result<Self> {
        Ok(Self::from(be_bytes_to_g2(b)?))
    }
}

impl TryFrom<&[u8]> for BlindedCommitment {
    type Error = Error;

    fn try_from(b: &[u8]) -> Result<Self> {
        let bytes: [u8; 96] = b.try_into()?;
        Self::try_from(bytes)
    }
}

/// The bank's signature over a blinded commitment.
#[derive(Clone, Debug)]
pub struct BlindSignature {
    signature: Signature,
}

impl BlindSignature {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl From<Signature> for BlindSignature {
    fn from(signature: Signature) -> Self {
        Self { signature }
    }
}

/// The issuing bank. Holds its secret key and nothing about the coins it
/// signs.
pub struct Bank {
    sk: SecretKey,
}

impl Bank {
    pub fn random() -> Self {
        Self {
            sk: SecretKey::random(),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.sk.public_key()
    }

    fn sk_bendian(&self) -> Result<Fr> {
        fr_from_be_bytes(self.sk.to_bytes())
    }

    /// Signs an opaque blinded commitment. A pure function of the input and
    /// the bank key.
    pub fn blind_sign(&self, blinded: &BlindedCommitment) -> Result<BlindSignature> {
        // The input is already a G2 point, so SecretKey::sign(msg) would
        // hash it a second time.
        let bs_sig_g2 = sign_g2(blinded.blinded_msg(), self.sk_bendian()?);

        let bs_sig_bytes = g2_to_be_bytes(bs_sig_g2);
        tracing::debug!("bank signed a blinded commitment");

        Ok(BlindSignature {
            signature: Signature::from_bytes(bs_sig_bytes)?,
        })
    }

    /// Checks the bank's own signature on the blinded point it was handed.
    pub fn verify_blind_signature(
        &self,
        blinded: &BlindedCommitment,
        sig: &BlindSignature,
    ) -> bool {
        self.public_key()
            .verify_g2(sig.signature(), blinded.blinded_msg())
    }
}

impl TryFrom<[u8; 32]> for Bank {
    type Error = Error;

    fn try_from(b: [u8; 32]) -> Result<Self> {
        let sk = SecretKey::from_bytes(b).map_err(|_| Error::InvalidKey)?;
        Self::try_from(sk)
    }
}

impl TryFrom<SecretKey> for Bank {
    type Error = Error;

    /// A zero secret key maps to the identity public key and is refused.
    fn try_from(sk: SecretKey) -> Result<Self> {
        check_issuer_key(&sk.public_key())?;
        Ok(Self { sk })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMITMENT: &[u8] = b"ELECTRONIC_PIGGYBANK-20-00ff-aa-bb";

    #[test]
    fn blind_sign_round_trip() -> Result<()> {
        let bank = Bank::try_from(*b"********************************")?;

        let purchaser = BlindingFactor::try_from(*b"11111111111111111111111111111111")?;
        let blinded = purchaser.blind(COMMITMENT)?;

        let blind_sig = bank.blind_sign(&blinded)?;
        assert!(bank.verify_blind_signature(&blinded, &blind_sig));

        let sig = purchaser.unblind(&blind_sig)?;
        assert!(verify_commitment_signature(COMMITMENT, &sig, &bank.public_key()));
        assert!(!verify_commitment_signature(
            b"ELECTRONIC_PIGGYBANK-21-00ff-aa-bb",
            &sig,
            &bank.public_key()
        ));

        Ok(())
    }

    #[test]
    fn random_factors_hide_the_commitment() -> Result<()> {
        let a = BlindingFactor::random()?.blind(COMMITMENT)?;
        let b = BlindingFactor::random()?.blind(COMMITMENT)?;
        assert_ne!(a.to_bytes().to_vec(), b.to_bytes().to_vec());
        Ok(())
    }

    #[test]
    fn signature_from_another_bank_fails() -> Result<()> {
        let bank = Bank::random();
        let other = Bank::random();
        let purchaser = BlindingFactor::random()?;

        let blind_sig = bank.blind_sign(&purchaser.blind(COMMITMENT)?)?;
        let sig = purchaser.unblind(&blind_sig)?;
        assert!(!verify_commitment_signature(COMMITMENT, &sig, &other.public_key()));
        Ok(())
    }

    #[test]
    fn blinded_commitment_survives_the_wire() -> Result<()> {
        let blinded = BlindingFactor::random()?.blind(COMMITMENT)?;
        let bytes = blinded.to_bytes();
        let decoded = BlindedCommitment::try_from(&bytes[..])?;
        assert_eq!(decoded.to_bytes().to_vec(), bytes.to_vec());
        assert!(BlindedCommitment::try_from(&bytes[..95]).is_err());
        Ok(())
    }

    #[test]
    fn malformed_issuer_keys_are_rejected() -> Result<()> {
        assert!(matches!(parse_issuer_key(&[1u8; 10]), Err(Error::InvalidKey)));
        assert!(matches!(parse_issuer_key(&[0xffu8; 48]), Err(Error::InvalidKey)));

        let pk = Bank::random().public_key();
        assert_eq!(parse_issuer_key(&pk.to_bytes())?, pk);
        Ok(())
    }

    #[test]
    fn blinding_factor_debug_is_redacted() -> Result<()> {
        let factor = BlindingFactor::try_from(*b"11111111111111111111111111111111")?;
        assert_eq!(format!("{:?}", factor), "BlindingFactor(..)");
        Ok(())
    }

    #[test]
    fn identity_issuer_key_is_rejected() {
        let mut identity = [0u8; ISSUER_KEY_SIZE];
        identity[0] = 0xc0;
        assert!(matches!(parse_issuer_key(&identity), Err(Error::InvalidKey)));
    }

    #[test]
    fn zero_secret_key_is_rejected() -> Result<()> {
        assert!(matches!(Bank::try_from([0u8; 32]), Err(Error::InvalidKey)));

        let zero = SecretKey::from_bytes([0u8; 32])?;
        assert_eq!(zero.public_key().to_bytes()[0], 0xc0);
        assert!(matches!(Bank::try_from(zero), Err(Error::InvalidKey)));

        let bank = Bank::try_from(SecretKey::random())?;
        check_issuer_key(&bank.public_key())?;
        Ok(())
    }
}
