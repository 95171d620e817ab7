//! The canonical string a bank blind-signs for each coin.
//!
//! Wire format: `TAG-amount-guid-l0,l1,..-r0,r1,..` where `l_i`/`r_i` are the
//! lowercase hex SHA-256 hashes of the left/right halves of identity share `i`.

use crate::error::{Error, Result};
use crate::shares::ShareHashes;
use serde::{Deserialize, Serialize};
use std::fmt;

const FIELD_SEPARATOR: char = '-';
const HASH_SEPARATOR: &str = ",";
const FIELD_COUNT: usize = 5;
const HASH_HEX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub bank_tag: String,
    pub amount: u64,
    pub guid: String,
    /// Per-share hash pairs; index `i` is share `i`.
    pub shares: Vec<ShareHashes>,
}

impl Commitment {
    /// Strictly parses a commitment string issued under `expected_tag`.
    pub fn parse(s: &str, expected_tag: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }
        if fields[0] != expected_tag {
            return Err(malformed(format!(
                "{} received, but {} expected",
                fields[0], expected_tag
            )));
        }

        // canonical positive decimal only: no sign, no leading zero
        let not_decimal = || malformed(format!("amount {:?} is not a decimal", fields[1]));
        if !fields[1].bytes().all(|b| b.is_ascii_digit()) || fields[1].starts_with('0') {
            return Err(not_decimal());
        }
        let amount: u64 = fields[1].parse().map_err(|_| not_decimal())?;

        let guid = fields[2];
        if guid.is_empty() || !is_lower_hex(guid) {
            return Err(malformed("guid is not lowercase hex".to_string()));
        }

        let left = parse_hash_list(fields[3])?;
        let right = parse_hash_list(fields[4])?;
        if left.len() != right.len() {
            return Err(malformed(format!(
                "{} left hashes but {} right hashes",
                left.len(),
                right.len()
            )));
        }

        let shares = left
            .into_iter()
            .zip(right)
            .map(|(left, right)| ShareHashes { left, right })
            .collect();

        Ok(Self {
            bank_tag: fields[0].to_string(),
            amount,
            guid: guid.to_string(),
            shares,
        })
    }

    pub fn share_count(&self) -> usize {
        self.shares.len()
    }

    /// The exact bytes the bank signs.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left: Vec<&str> = self.shares.iter().map(|s| s.left.as_str()).collect();
        let right: Vec<&str> = self.shares.iter().map(|s| s.right.as_str()).collect();
        write!(
            f,
            "{tag}{d}{amount}{d}{guid}{d}{left}{d}{right}",
            tag = self.bank_tag,
            amount = self.amount,
            guid = self.guid,
            left = left.join(HASH_SEPARATOR),
            right = right.join(HASH_SEPARATOR),
            d = FIELD_SEPARATOR,
        )
    }
}

fn parse_hash_list(field: &str) -> Result<Vec<String>> {
    field
        .split(HASH_SEPARATOR)
        .map(|h| {
            if h.len() == HASH_HEX_LEN && is_lower_hex(h) {
                Ok(h.to_string())
            } else {
                Err(malformed(format!("{:?} is not a share hash", h)))
            }
        })
        .collect()
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn malformed(reason: String) -> Error {
    Error::MalformedCommitment(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BANK_TAG;

    fn sample() -> Commitment {
        Commitment {
            bank_tag: BANK_TAG.to_string(),
            amount: 20,
            guid: "00ff".to_string(),
            shares: vec![
                ShareHashes {
                    left: "a".repeat(64),
                    right: "b".repeat(64),
                },
                ShareHashes {
                    left: "c".repeat(64),
                    right: "d".repeat(64),
                },
            ],
        }
    }

    #[test]
    fn display_uses_wire_separators() {
        let expected = format!(
            "ELECTRONIC_PIGGYBANK-20-00ff-{},{}-{},{}",
            "a".repeat(64),
            "c".repeat(64),
            "b".repeat(64),
            "d".repeat(64)
        );
        assert_eq!(sample().to_string(), expected);
    }

    #[test]
    fn parse_inverts_display() -> Result<()> {
        let c = sample();
        assert_eq!(Commitment::parse(&c.to_string(), BANK_TAG)?, c);
        Ok(())
    }

    #[test]
    fn foreign_tag_is_rejected() {
        let s = sample().to_string();
        match Commitment::parse(&s, "OTHER_BANK") {
            Err(Error::MalformedCommitment(reason)) => assert!(reason.contains("OTHER_BANK")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn structural_deviations_are_rejected() {
        let good = sample().to_string();
        let bad = vec![
            format!("{}-extra", good),
            good.replacen("-20-", "-twenty-", 1),
            good.replacen("-20-", "-0-", 1),
            good.replacen("-20-", "-+20-", 1),
            good.replacen("-20-", "-020-", 1),
            good.replacen("-20-", "--", 1),
            good.replacen("-00ff-", "-00FF-", 1),
            good.replacen(&"a".repeat(64), &"a".repeat(63), 1),
            good.replacen(&format!(",{}", "d".repeat(64)), "", 1),
        ];
        for s in bad {
            assert!(
                matches!(Commitment::parse(&s, BANK_TAG), Err(Error::MalformedCommitment(_))),
                "accepted {}",
                s
            );
        }
    }
}
