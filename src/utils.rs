use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Largest range `uniform_int` can sample from a single byte.
pub const MAX_RANGE: usize = 256;

/// Bytes of entropy in an opaque coin identifier (384 bits).
pub const GUID_BYTES: usize = 48;

/// Fills a fresh buffer of `n` bytes from the operating system CSPRNG.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    OsRng.fill_bytes(&mut buf);
    buf
}

fn sample() -> u8 {
    let mut byte = [0u8; 1];
    OsRng.fill_bytes(&mut byte);
    byte[0]
}

/// Draws an unbiased integer in `[0, range)`.
///
/// A single byte is sampled and rejected when it falls in the tail above the
/// largest multiple of `range` that fits in a byte, so every residue is
/// equally likely.
pub fn uniform_int(range: usize) -> Result<usize> {
    if range == 0 || range > MAX_RANGE {
        return Err(Error::RangeError { range });
    }
    let max = (MAX_RANGE / range) * range;
    loop {
        let n = sample() as usize;
        if n < max {
            return Ok(n % range);
        }
    }
}

/// A one-time pad over some plaintext: `key ^ ciphertext == plaintext`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneTimePad {
    pub key: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Encrypts `plaintext` under a fresh random key of the same length.
pub fn one_time_pad(plaintext: &[u8]) -> OneTimePad {
    let key = random_bytes(plaintext.len());
    let ciphertext = plaintext.iter().zip(&key).map(|(p, k)| p ^ k).collect();
    OneTimePad { key, ciphertext }
}

/// XORs two equal-length byte strings.
pub fn xor_decode(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}

/// SHA-256 digest rendered as lowercase hex.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Random hex identifier used as a coin guid.
pub fn opaque_id() -> String {
    hex::encode(random_bytes(GUID_BYTES))
}
