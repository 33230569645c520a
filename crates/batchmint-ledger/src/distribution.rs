//! Pro-rata distribution of a batch's minted shares.
//!
//! ```text
//! owed_i = floor(total_minted * deposit_i / total_deposited)
//! ```
//!
//! Flooring means `Σ owed_i <= total_minted`; the remainder stays in the
//! pool as dust and is never reclaimed.

use batchmint_types::{Amount, BatchMintError, Result};

/// A user's share of a batch's minted total.
///
/// Returns 0 for an empty batch.
///
/// # Errors
/// Returns `Internal` if `share > total_deposited` (a broken ledger).
pub fn pro_rata_share(
    total_minted: Amount,
    share: Amount,
    total_deposited: Amount,
) -> Result<Amount> {
    if total_deposited == 0 {
        return Ok(0);
    }
    if share > total_deposited {
        return Err(BatchMintError::Internal(format!(
            "share {share} exceeds batch total {total_deposited}"
        )));
    }
    mul_div_floor(total_minted, share, total_deposited)
}

/// `floor(a * b / d)` with a 256-bit intermediate product.
///
/// # Errors
/// Returns `ArithmeticOverflow` if `d == 0` or the quotient exceeds `u128`.
pub fn mul_div_floor(a: Amount, b: Amount, d: Amount) -> Result<Amount> {
    if d == 0 {
        return Err(BatchMintError::ArithmeticOverflow(
            "division by zero".to_string(),
        ));
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / d);
    }
    let (hi, lo) = widening_mul(a, b);
    div_wide(hi, lo, d).ok_or_else(|| {
        BatchMintError::ArithmeticOverflow(format!("{a} * {b} / {d} exceeds u128"))
    })
}

/// Full 256-bit product of two `u128`s as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = (1u128 << 64) - 1;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_hi = a_hi * b_hi;

    let cross = (lo_lo >> 64) + (hi_lo & MASK) + (lo_hi & MASK);
    let lo = (cross << 64) | (lo_lo & MASK);
    let hi = hi_hi + (hi_lo >> 64) + (lo_hi >> 64) + (cross >> 64);
    (hi, lo)
}

/// Divide the 256-bit value `(hi, lo)` by `d`, or `None` if the quotient
/// does not fit in 128 bits.
fn div_wide(hi: u128, lo: u128, d: u128) -> Option<u128> {
    if hi >= d {
        return None;
    }
    // Restoring long division; `rem < d` holds at the top of every step.
    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1;
        }
    }
    Some(quot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_to_one_pays_deposit() {
        assert_eq!(pro_rata_share(21, 10, 21).unwrap(), 10);
        assert_eq!(pro_rata_share(21, 5, 21).unwrap(), 5);
        assert_eq!(pro_rata_share(21, 6, 21).unwrap(), 6);
    }

    #[test]
    fn floors_and_leaves_dust() {
        // 100 shares over deposits 1, 1, 1 → 33 each, 1 dust.
        let paid: Amount = (0..3).map(|_| pro_rata_share(100, 1, 3).unwrap()).sum();
        assert_eq!(pro_rata_share(100, 1, 3).unwrap(), 33);
        assert_eq!(paid, 99);
        assert!(paid <= 100);
    }

    #[test]
    fn payouts_never_exceed_minted() {
        let deposits: [Amount; 5] = [7, 13, 1, 29, 50];
        let total: Amount = deposits.iter().sum();
        for minted in [0, 1, 99, 100, 101, 12_345, 1_000_003] {
            let paid: Amount = deposits
                .iter()
                .map(|d| pro_rata_share(minted, *d, total).unwrap())
                .sum();
            assert!(paid <= minted, "minted={minted} paid={paid}");
            assert!(minted - paid < deposits.len() as Amount);
        }
    }

    #[test]
    fn empty_batch_pays_nothing() {
        assert_eq!(pro_rata_share(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn share_above_total_is_internal_error() {
        let err = pro_rata_share(10, 11, 10).unwrap_err();
        assert!(matches!(err, BatchMintError::Internal(_)));
    }

    #[test]
    fn wide_product_does_not_overflow() {
        let big = u128::MAX / 3;
        // big * big overflows u128, but big * big / big == big.
        assert_eq!(mul_div_floor(big, big, big).unwrap(), big);
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, u128::MAX).unwrap(), u128::MAX);
        assert_eq!(mul_div_floor(u128::MAX, 2, 4).unwrap(), u128::MAX / 2);
    }

    #[test]
    fn quotient_overflow_is_reported() {
        let err = mul_div_floor(u128::MAX, u128::MAX, 1).unwrap_err();
        assert!(matches!(err, BatchMintError::ArithmeticOverflow(_)));
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert!(mul_div_floor(1, 1, 0).is_err());
    }
}
