//! One-time codes for the in-person buyer/seller handoff
//!
//! Codes are six decimal digits drawn uniformly from the OS CSPRNG and stored
//! only as salted bcrypt hashes. Transaction IDs come from the same source.

use rand::{rngs::OsRng, Rng, RngCore};
use thiserror::Error;
use tracing::warn;

/// Number of digits in a code, leading zeros included
pub const OTP_LENGTH: usize = 6;

/// Codes are uniform over 000000..=999999
const OTP_SPACE: u32 = 1_000_000;

/// bcrypt work factor used unless configured otherwise
pub const DEFAULT_HASH_COST: u32 = 11;

/// bcrypt accepts work factors in this range
pub const MIN_HASH_COST: u32 = 4;
pub const MAX_HASH_COST: u32 = 31;

/// Random bytes in a transaction ID (hex-encoded to 32 characters)
const TRANSACTION_ID_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("hash cost {0} outside 4..=31")]
    InvalidCost(u32),
    #[error("failed to hash code: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Plaintext code handed to the buyer exactly once.
///
/// `Debug` is redacted so a stray `{:?}` cannot leak it into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextCode(String);

impl PlaintextCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for PlaintextCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlaintextCode(******)")
    }
}

/// Generates, hashes and verifies one-time codes
#[derive(Debug, Clone, Copy)]
pub struct OtpIssuer {
    cost: u32,
}

impl OtpIssuer {
    pub fn new(cost: u32) -> Result<Self, OtpError> {
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&cost) {
            return Err(OtpError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn generate_code(&self) -> PlaintextCode {
        let value = OsRng.gen_range(0..OTP_SPACE);
        PlaintextCode(format!("{:0width$}", value, width = OTP_LENGTH))
    }

    /// Salted, so hashing the same code twice yields different outputs
    pub fn hash(&self, code: &PlaintextCode) -> Result<String, OtpError> {
        Ok(bcrypt::hash(code.as_str(), self.cost)?)
    }

    /// Constant-time comparison through bcrypt. Fails closed: a malformed
    /// hash or any other bcrypt error counts as a mismatch.
    pub fn verify(&self, code: &str, hash: &str) -> bool {
        match bcrypt::verify(code, hash) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(error = %e, "OTP verification errored, treating as mismatch");
                false
            }
        }
    }

    /// Fresh code plus its hash, computed on the blocking pool
    pub async fn issue(&self) -> Result<(PlaintextCode, String), OtpError> {
        let issuer = *self;
        tokio::task::spawn_blocking(move || -> Result<(PlaintextCode, String), OtpError> {
            let code = issuer.generate_code();
            let hash = issuer.hash(&code)?;
            Ok((code, hash))
        })
        .await
        .map_err(|e| OtpError::Task(e.to_string()))?
    }

    /// `verify` on the blocking pool; a failed task is a mismatch
    pub async fn verify_blocking(&self, code: String, hash: String) -> bool {
        let issuer = *self;
        match tokio::task::spawn_blocking(move || issuer.verify(&code, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                warn!(error = %e, "OTP verification task failed, treating as mismatch");
                false
            }
        }
    }
}

/// 128 random bits, lowercase hex
pub fn generate_transaction_id() -> String {
    let mut bytes = [0u8; TRANSACTION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> OtpIssuer {
        OtpIssuer::new(MIN_HASH_COST).unwrap()
    }

    #[test]
    fn test_code_is_six_digits() {
        let issuer = issuer();
        for _ in 0..200 {
            let code = issuer.generate_code();
            assert_eq!(code.as_str().len(), OTP_LENGTH);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_verify_accepts_original_code() {
        let issuer = issuer();
        let code = issuer.generate_code();
        let hash = issuer.hash(&code).unwrap();

        assert!(issuer.verify(code.as_str(), &hash));
    }

    #[test]
    fn test_verify_rejects_other_code() {
        let issuer = issuer();
        let code = issuer.generate_code();
        let hash = issuer.hash(&code).unwrap();

        let other = if code.as_str() == "000000" { "000001" } else { "000000" };
        assert!(!issuer.verify(other, &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let issuer = issuer();
        let code = issuer.generate_code();

        let first = issuer.hash(&code).unwrap();
        let second = issuer.hash(&code).unwrap();

        assert_ne!(first, second);
        assert!(issuer.verify(code.as_str(), &first));
        assert!(issuer.verify(code.as_str(), &second));
    }

    #[test]
    fn test_verify_fails_closed_on_malformed_hash() {
        let issuer = issuer();
        assert!(!issuer.verify("123456", "not-a-bcrypt-hash"));
        assert!(!issuer.verify("123456", ""));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(OtpIssuer::new(3).is_err());
        assert!(OtpIssuer::new(32).is_err());
        assert_eq!(OtpIssuer::new(DEFAULT_HASH_COST).unwrap().cost(), 11);
    }

    #[test]
    fn test_debug_redacts_code() {
        let code = issuer().generate_code();
        let rendered = format!("{:?}", code);
        assert!(!rendered.contains(code.as_str()));
    }

    #[test]
    fn test_transaction_id_is_32_hex_chars() {
        let id = generate_transaction_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_transaction_id());
    }

    #[tokio::test]
    async fn test_issue_and_verify_on_blocking_pool() {
        let issuer = issuer();
        let (code, hash) = issuer.issue().await.unwrap();

        assert!(issuer.verify_blocking(code.as_str().to_string(), hash.clone()).await);
        assert!(!issuer.verify_blocking("abcdef".to_string(), hash).await);
    }
}
