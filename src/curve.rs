use crate::error::{Error, Result};
use blst::{blst_hash_to_g2, blst_p2, blst_p2_compress};
use blsttc::ff::{Field, PrimeField}; // for Fr trait
use blsttc::group::{CurveAffine, CurveProjective, EncodedPoint};
use blsttc::pairing::bls12_381::{Fr, FrRepr, G2Affine, G2};
use blsttc::{PublicKey, Signature};
use std::borrow::Borrow;

const COMMITMENT_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// Checks an unblinded signature against the commitment bytes it claims to sign.
///
/// The commitment is mapped onto G2 first, so this is the same check a
/// plain BLS verification performs:
/// pair(pk_as_g1, commitment_as_g2) == pair(1_as_g1, sig_as_g2)
pub(crate) fn verify_signature_on_commitment(
    commitment: &[u8],
    sig: &Signature,
    pk: &PublicKey,
) -> bool {
    match hash_g2_with_dst(commitment) {
        Ok(msg_g2) => pk.verify_g2(sig, msg_g2),
        Err(_) => false,
    }
}

// blst hash-to-curve with the standard G2 ciphersuite tag
pub(crate) fn hash_g2_with_dst(msg: &[u8]) -> Result<G2> {
    let mut msg_hash: blst_p2 = Default::default();
    let aug = b"";
    unsafe {
        blst_hash_to_g2(
            &mut msg_hash,
            msg.as_ptr(),
            msg.len(),
            COMMITMENT_DST.as_ptr(),
            COMMITMENT_DST.len(),
            aug.as_ptr(),
            aug.len(),
        )
    };
    let mut msg_g2_bytes = [0u8; 96];
    unsafe { blst_p2_compress(&mut msg_g2_bytes[0], &msg_hash) }
    be_bytes_to_g2(msg_g2_bytes)
}

// see blsttc util.rs
pub(crate) fn fr_from_be_bytes(bytes: [u8; 32]) -> Result<Fr> {
    let mut le_bytes = bytes;
    le_bytes.reverse();
    let mut fr_u64s = [0u64; 4];
    for (i, limb) in fr_u64s.iter_mut().enumerate() {
        let mut next_u64_bytes = [0u8; 8];
        next_u64_bytes.copy_from_slice(&le_bytes[i * 8..(i + 1) * 8]);
        *limb = u64::from_le_bytes(next_u64_bytes);
    }
    Fr::from_repr(FrRepr(fr_u64s)).map_err(|_| Error::InvalidKey)
}

// y = x * r
pub(crate) fn blind(g2: G2, r: Fr) -> G2 {
    g2.into_affine().mul(r)
}

// x = y * 1/r
pub(crate) fn unblind(g2: G2, r: Fr) -> Result<G2> {
    let r_inv = r.inverse().ok_or(Error::InvalidKey)?;
    Ok(g2.into_affine().mul(r_inv))
}

// see blsttc Signature from_bytes
pub(crate) fn be_bytes_to_g2(bytes: [u8; 96]) -> Result<G2> {
    let mut compressed: <G2Affine as CurveAffine>::Compressed = EncodedPoint::empty();
    compressed.as_mut().copy_from_slice(bytes.borrow());
    let affine = compressed
        .into_affine()
        .map_err(|_| Error::InvalidSignature)?;
    Ok(affine.into_projective())
}

// see blsttc Signature to_bytes
pub(crate) fn g2_to_be_bytes(g2: G2) -> [u8; 96] {
    let mut bytes = [0u8; 96];
    bytes.copy_from_slice(g2.into_affine().into_compressed().as_ref());
    bytes
}

// Equivalent to blsttc SecretKey::sign_g2, kept here so the bank signs a
// blinded point with the same scalar abstraction used for the blinding factor.
pub(crate) fn sign_g2(g2: G2, fr: Fr) -> G2 {
    g2.into_affine().mul(fr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blinding_is_reversible() -> Result<()> {
        let msg = hash_g2_with_dst(b"ELECTRONIC_PIGGYBANK-20-ab")?;
        let r = fr_from_be_bytes(*b"11111111111111111111111111111111")?;

        let blinded = blind(msg, r);
        assert_ne!(g2_to_be_bytes(blinded), g2_to_be_bytes(msg));
        assert_eq!(g2_to_be_bytes(unblind(blinded, r)?), g2_to_be_bytes(msg));
        Ok(())
    }

    #[test]
    fn hash_to_g2_is_deterministic() -> Result<()> {
        let a = hash_g2_with_dst(b"commitment")?;
        let b = hash_g2_with_dst(b"commitment")?;
        let c = hash_g2_with_dst(b"commitment!")?;
        assert_eq!(g2_to_be_bytes(a), g2_to_be_bytes(b));
        assert_ne!(g2_to_be_bytes(a), g2_to_be_bytes(c));
        Ok(())
    }

    #[test]
    fn zero_scalar_cannot_unblind() -> Result<()> {
        let msg = hash_g2_with_dst(b"commitment")?;
        assert!(unblind(msg, Fr::zero()).is_err());
        Ok(())
    }
}
