use blsttc::error::FromBytesError;
use std::array::TryFromSliceError;
use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = EcashError> = std::result::Result<T, E>;
pub type Error = EcashError;

#[derive(Error, Debug)]
/// error variants.
pub enum EcashError {
    #[error("issuer key is malformed")]
    InvalidKey,

    #[error("coin signature does not verify under the issuer key")]
    InvalidSignature,

    #[error("malformed commitment: {0}")]
    MalformedCommitment(String),

    #[error("identity share {index} does not match its committed hash")]
    RisVerificationFailed { index: usize },

    #[error("length mismatch: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("range {range} is outside the sampler bound of 1..=256")]
    RangeError { range: usize },

    #[error("coin amount must be positive")]
    InvalidAmount,

    #[error("invalid protocol parameters: {0}")]
    InvalidParams(String),

    #[error("disclosure record belongs to coin {found}, expected {expected}")]
    GuidMismatch { expected: String, found: String },

    #[error("deserialization from bytes failed")]
    BlsttcFromBytes(#[from] FromBytesError),

    #[error("deserialization from bytes failed")]
    InvalidBytes(#[from] TryFromSliceError),
}
