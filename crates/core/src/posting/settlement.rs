//! Settlement tolerance policy for No-Win-No-Fee payments.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::PostingError;

/// Tolerance band for reported settlement amounts.
///
/// A reported amount is accepted when it lies within
/// `expected * (1 - d) ..= expected * (1 + d)` where `d` is the configured
/// fractional divergence allowance. The comparison uses the unrounded bounds;
/// the bounds carried in the rejection are rounded to the nearest whole
/// amount, half away from zero.
#[derive(Debug, Clone, Copy)]
pub struct SettlementPolicy {
    max_divergence: Decimal,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        // 0.10 = plus or minus 10%
        Self::new(Decimal::new(10, 2))
    }
}

impl SettlementPolicy {
    /// Creates a policy with the given fractional divergence allowance.
    #[must_use]
    pub const fn new(max_divergence: Decimal) -> Self {
        Self { max_divergence }
    }

    /// Returns the configured fractional divergence allowance.
    #[must_use]
    pub const fn max_divergence(&self) -> Decimal {
        self.max_divergence
    }

    /// Validates a reported settlement amount against the expected estimate.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::SettlementOutOfRange` carrying the rounded
    /// bounds when the reported amount falls outside the band.
    pub fn validate(&self, expected: Decimal, reported: Decimal) -> Result<(), PostingError> {
        let min = expected * (Decimal::ONE - self.max_divergence);
        let max = expected * (Decimal::ONE + self.max_divergence);

        if reported < min || reported > max {
            return Err(PostingError::SettlementOutOfRange {
                min: round_to_whole(min),
                max: round_to_whole(max),
            });
        }

        Ok(())
    }
}

/// Rounds a bound to the nearest whole amount, half away from zero.
fn round_to_whole(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if value.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}
