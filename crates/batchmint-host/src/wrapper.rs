//! Yield-bearing wrapper model.
//!
//! A wrapper holds an underlying token and issues its own shares against
//! it at an exchange rate. Its holders also accrue auxiliary governance
//! tokens, listed here so the pool can sweep them.

use batchmint_types::{Address, Amount, BatchMintError, Result};

/// Shares issued per unit of underlying, as a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate {
    pub shares: Amount,
    pub underlying: Amount,
}

impl ExchangeRate {
    /// One share per unit of underlying.
    pub const PAR: Self = Self {
        shares: 1,
        underlying: 1,
    };

    /// # Errors
    /// Returns `Configuration` if either side is zero.
    pub fn new(shares: Amount, underlying: Amount) -> Result<Self> {
        if shares == 0 || underlying == 0 {
            return Err(BatchMintError::Configuration(
                "exchange rate sides must be non-zero".into(),
            ));
        }
        Ok(Self { shares, underlying })
    }

    /// Shares minted for `amount` of underlying, rounded down.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if `amount * shares` overflows.
    pub fn shares_for(&self, amount: Amount) -> Result<Amount> {
        amount
            .checked_mul(self.shares)
            .map(|scaled| scaled / self.underlying)
            .ok_or_else(|| BatchMintError::ArithmeticOverflow("wrapper share conversion".into()))
    }
}

/// Configuration of one wrapper token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperMarket {
    pub underlying: Address,
    pub rate: ExchangeRate,
    pub gov_tokens: Vec<Address>,
    /// When set, every mint fails with this reason.
    pub halted: Option<String>,
}

impl WrapperMarket {
    #[must_use]
    pub fn new(underlying: Address) -> Self {
        Self {
            underlying,
            rate: ExchangeRate::PAR,
            gov_tokens: Vec::new(),
            halted: None,
        }
    }

    /// Reject the mint if the market is halted.
    ///
    /// # Errors
    /// Returns `MintFailed` with the halt reason.
    pub fn ensure_open(&self) -> Result<()> {
        match &self.halted {
            Some(reason) => Err(BatchMintError::MintFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn par_rate_is_identity() {
        assert_eq!(ExchangeRate::PAR.shares_for(21).unwrap(), 21);
    }

    #[test]
    fn rate_rounds_down() {
        let rate = ExchangeRate::new(9, 10).unwrap();
        assert_eq!(rate.shares_for(21).unwrap(), 18);
    }

    #[test]
    fn zero_sided_rate_rejected() {
        assert!(ExchangeRate::new(0, 1).is_err());
        assert!(ExchangeRate::new(1, 0).is_err());
    }

    #[test]
    fn conversion_overflow_reported() {
        let rate = ExchangeRate::new(2, 1).unwrap();
        assert!(matches!(
            rate.shares_for(Amount::MAX),
            Err(BatchMintError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn halted_market_refuses() {
        let mut market = WrapperMarket::new(Address::from_label("DAI"));
        assert!(market.ensure_open().is_ok());
        market.halted = Some("paused by governance".into());
        assert!(matches!(
            market.ensure_open(),
            Err(BatchMintError::MintFailed { reason }) if reason == "paused by governance"
        ));
    }
}
