use crate::error::Result;
use crate::params::IDENT_TAG;
use crate::utils::{content_hash, one_time_pad, xor_decode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of an identity share a merchant asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One redundant identity share (RIS).
///
/// `left` is a one-time-pad key and `right` the purchaser identity encrypted
/// under it. Either half alone is uniformly random; both halves together
/// reveal `IDENT:<purchaser>`.
#[derive(Clone)]
pub struct IdentityShare {
    pub(crate) left: Vec<u8>,
    pub(crate) right: Vec<u8>,
}

impl fmt::Debug for IdentityShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityShare")
            .field("len", &self.left.len())
            .finish()
    }
}

impl IdentityShare {
    /// Splits `IDENT:<purchaser>` under a fresh pad.
    pub fn new(purchaser: &str) -> Self {
        let plaintext = identity_plaintext(purchaser);
        let pad = one_time_pad(plaintext.as_bytes());
        Self {
            left: pad.key,
            right: pad.ciphertext,
        }
    }

    pub fn half(&self, side: Side) -> &[u8] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// The committed hashes of both halves.
    pub fn hashes(&self) -> ShareHashes {
        ShareHashes {
            left: hash_half(&self.left),
            right: hash_half(&self.right),
        }
    }

    /// Recombines both halves into the hidden plaintext.
    pub fn reveal(&self) -> Result<Vec<u8>> {
        xor_decode(&self.left, &self.right)
    }
}

/// Hashes of both halves of one share, as they appear in a commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareHashes {
    pub left: String,
    pub right: String,
}

impl ShareHashes {
    pub fn expected(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Whether `half` is the preimage committed for `side`.
    pub fn matches(&self, side: Side, half: &[u8]) -> bool {
        hash_half(half) == self.expected(side)
    }
}

/// Share halves are committed by hashing their lowercase hex text.
pub(crate) fn hash_half(half: &[u8]) -> String {
    content_hash(hex::encode(half).as_bytes())
}

pub(crate) fn identity_plaintext(purchaser: &str) -> String {
    format!("{}{}", IDENT_TAG, purchaser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_recombine_to_identity() -> Result<()> {
        let share = IdentityShare::new("alice");
        assert_eq!(share.left.len(), "IDENT:alice".len());
        assert_eq!(share.right.len(), "IDENT:alice".len());
        assert_eq!(share.reveal()?, b"IDENT:alice".to_vec());
        Ok(())
    }

    #[test]
    fn hashes_match_their_own_half_only() {
        let share = IdentityShare::new("alice");
        let hashes = share.hashes();
        assert!(hashes.matches(Side::Left, share.half(Side::Left)));
        assert!(hashes.matches(Side::Right, share.half(Side::Right)));
        assert!(!hashes.matches(Side::Left, share.half(Side::Right)));
        assert_eq!(hashes.left.len(), 64);
    }

    #[test]
    fn hash_covers_hex_text_of_half() {
        assert_eq!(hash_half(&[0xab, 0x01]), content_hash(b"ab01"));
    }

    #[test]
    fn debug_output_hides_both_halves() {
        let share = IdentityShare::new("alice");
        let printed = format!("{:?}", share);
        assert_eq!(printed, "IdentityShare { len: 11 }");
    }

    #[test]
    fn opposite_side() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}
