//! Money rounding and allocation
//!
//! All monetary values in the engine are 2-decimal [`Decimal`]s. Every arithmetic
//! boundary that can produce extra precision goes through [`round2`], so rounding
//! drift cannot accumulate across lines.

use rust_decimal::{Decimal, RoundingStrategy};
use smallvec::SmallVec;

/// Rounds a monetary value to 2 decimal places, midpoints away from zero.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits `total` across participants proportionally to their `weights`.
///
/// Each share is rounded to 2 decimal places; the final participant absorbs the
/// rounding remainder so the returned shares always sum to exactly `total`.
/// Weights must be non-negative. If all weights are zero the whole `total` is
/// assigned to the last participant.
#[must_use]
pub fn allocate(total: Decimal, weights: &[Decimal]) -> SmallVec<[Decimal; 4]> {
    let mut shares: SmallVec<[Decimal; 4]> = SmallVec::with_capacity(weights.len());

    if weights.is_empty() {
        return shares;
    }

    let weight_sum: Decimal = weights.iter().copied().sum();
    let mut assigned = Decimal::ZERO;

    for (idx, weight) in weights.iter().enumerate() {
        let share = if idx + 1 == weights.len() {
            // Remainder-to-last keeps the invariant sum(shares) == total.
            total - assigned
        } else if weight_sum.is_zero() {
            Decimal::ZERO
        } else {
            round2(total * *weight / weight_sum)
        };

        assigned += share;
        shares.push(share);
    }

    shares
}
