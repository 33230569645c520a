//! Configuration types for a BatchMint pool deployment.

use serde::{Deserialize, Serialize};

use crate::{Address, BatchMintError, Result, constants};

/// Pool-level configuration applied at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMintConfig {
    /// Destination of swept auxiliary reward tokens.
    #[serde(default = "default_fee_treasury")]
    pub fee_treasury: Address,
    /// Trusted forwarder to install at initialization. When set, this
    /// counts as the one-time forwarder initialization.
    #[serde(default)]
    pub forwarder: Option<ForwarderConfig>,
}

/// The single trusted forwarder and its version tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwarderConfig {
    /// Human-readable version tag reported as `version_recipient`.
    pub version: String,
    /// The forwarder contract address.
    pub address: Address,
}

fn default_fee_treasury() -> Address {
    constants::FEE_TREASURY
}

impl Default for BatchMintConfig {
    fn default() -> Self {
        Self {
            fee_treasury: constants::FEE_TREASURY,
            forwarder: None,
        }
    }
}

impl BatchMintConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns `Configuration` if the document is malformed or invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| BatchMintError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that would strand swept funds or trust nobody.
    ///
    /// # Errors
    /// Returns `Configuration` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.fee_treasury.is_zero() {
            return Err(BatchMintError::Configuration(
                "fee_treasury must not be the zero address".to_string(),
            ));
        }
        if let Some(fwd) = &self.forwarder {
            if fwd.address.is_zero() {
                return Err(BatchMintError::Configuration(
                    "forwarder.address must not be the zero address".to_string(),
                ));
            }
            if fwd.version.trim().is_empty() {
                return Err(BatchMintError::Configuration(
                    "forwarder.version must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_fixed_treasury() {
        let cfg = BatchMintConfig::default();
        assert_eq!(cfg.fee_treasury, constants::FEE_TREASURY);
        assert!(cfg.forwarder.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_document_takes_defaults() {
        let cfg = BatchMintConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, BatchMintConfig::default());
    }

    #[test]
    fn parses_forwarder_section() {
        let json = r#"{
            "forwarder": {
                "version": "2.0.0-alpha.1+opengsn.test.recipient",
                "address": "0x0000000000000000000000000000000000000abc"
            }
        }"#;
        let cfg = BatchMintConfig::from_json_str(json).unwrap();
        let fwd = cfg.forwarder.unwrap();
        assert_eq!(fwd.version, "2.0.0-alpha.1+opengsn.test.recipient");
        assert_eq!(fwd.address.0[19], 0xbc);
    }

    #[test]
    fn zero_treasury_rejected() {
        let json = r#"{ "fee_treasury": "0x0000000000000000000000000000000000000000" }"#;
        let err = BatchMintConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, BatchMintError::Configuration(_)));
    }

    #[test]
    fn malformed_document_rejected() {
        let err = BatchMintConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, BatchMintError::Configuration(_)));
    }
}
