use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tag prefixed to every commitment this bank signs.
pub const BANK_TAG: &str = "ELECTRONIC_PIGGYBANK";

/// Prefix of the plaintext hidden in every identity share.
pub const IDENT_TAG: &str = "IDENT:";

/// Default number of redundant identity shares per coin.
pub const DEFAULT_SHARE_COUNT: usize = 20;

/// Parameters the purchaser, bank and merchant must agree on.
///
/// The share count bounds how likely a double-spend slips past
/// adjudication: both redemptions pick the same half of every share with
/// probability `2^-share_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Literal leading every commitment string.
    #[serde(default = "default_bank_tag")]
    pub bank_tag: String,
    /// Identity shares embedded in each coin.
    #[serde(default = "default_share_count")]
    pub share_count: usize,
}

impl ProtocolParams {
    pub fn validate(&self) -> Result<()> {
        if self.bank_tag.is_empty() {
            return Err(Error::InvalidParams("bank tag is empty".to_string()));
        }
        if self.bank_tag.contains(|c| c == '-' || c == ',') {
            return Err(Error::InvalidParams(format!(
                "bank tag {:?} contains a commitment separator",
                self.bank_tag
            )));
        }
        if self.share_count == 0 {
            return Err(Error::InvalidParams(
                "share count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            bank_tag: default_bank_tag(),
            share_count: default_share_count(),
        }
    }
}

fn default_bank_tag() -> String {
    BANK_TAG.to_string()
}

fn default_share_count() -> usize {
    DEFAULT_SHARE_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = ProtocolParams::default();
        assert_eq!(params.bank_tag, "ELECTRONIC_PIGGYBANK");
        assert_eq!(params.share_count, 20);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let params: ProtocolParams = serde_json::from_str(r#"{"share_count": 8}"#).unwrap();
        assert_eq!(params.bank_tag, BANK_TAG);
        assert_eq!(params.share_count, 8);
    }

    #[test]
    fn separators_in_tag_are_rejected() {
        for tag in &["", "MY-BANK", "A,B"] {
            let params = ProtocolParams {
                bank_tag: tag.to_string(),
                ..Default::default()
            };
            assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
        }
    }

    #[test]
    fn zero_shares_are_rejected() {
        let params = ProtocolParams {
            share_count: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
