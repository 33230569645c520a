//! Trusted forwarder registry.
//!
//! Exactly one forwarder may be trusted. It is set once by an
//! administrative call; every later attempt fails.

use batchmint_types::{Address, BatchMintError, Result};
use serde::{Deserialize, Serialize};

/// The trusted forwarder and the version tag reported to relayers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedForwarder {
    pub address: Address,
    pub version: String,
}

/// Holds the one-time trusted forwarder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwarderRegistry {
    trusted: Option<TrustedForwarder>,
}

impl ForwarderRegistry {
    /// Create a registry that trusts nobody.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the trusted forwarder.
    ///
    /// # Errors
    /// Returns `ForwarderAlreadyInitialized` on any call after the first.
    pub fn initialize(&mut self, version: impl Into<String>, address: Address) -> Result<()> {
        if self.trusted.is_some() {
            return Err(BatchMintError::ForwarderAlreadyInitialized);
        }
        self.trusted = Some(TrustedForwarder {
            address,
            version: version.into(),
        });
        Ok(())
    }

    /// Whether `address` is the trusted forwarder.
    #[must_use]
    pub fn is_trusted(&self, address: Address) -> bool {
        self.trusted.as_ref().is_some_and(|f| f.address == address)
    }

    /// Guard a relayed call arriving from `sender`.
    ///
    /// # Errors
    /// Returns `UntrustedForwarder` if `sender` isn't the trusted forwarder
    /// (including when none is configured yet).
    pub fn ensure_trusted(&self, sender: Address) -> Result<()> {
        if self.is_trusted(sender) {
            Ok(())
        } else {
            Err(BatchMintError::UntrustedForwarder(sender))
        }
    }

    /// The version tag of the trusted forwarder, if configured.
    #[must_use]
    pub fn version_recipient(&self) -> Option<&str> {
        self.trusted.as_ref().map(|f| f.version.as_str())
    }

    #[must_use]
    pub fn trusted(&self) -> Option<&TrustedForwarder> {
        self.trusted.as_ref()
    }
}
