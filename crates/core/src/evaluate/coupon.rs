//! Coupon evaluation
//!
//! At most one coupon participates in a calculation. Before it is evaluated the
//! whole calculation is rejected if the coupon targets a product that any active
//! combo also addresses; coupons and combos never stack on the same product.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::{
    catalog::{ConditionRole, CouponTarget, ProductId, Promotion, PromotionRule},
    evaluate::{CalculationError, LineState},
    money::allocate,
    summary::{AppliedPromotion, AppliedPromotionItem},
};

/// Reject the calculation when a specific-products coupon shares a product with
/// any loaded combo promotion.
///
/// The check runs against the promotion catalog rather than the triggered result:
/// a shopper must not be able to qualify for a combo after pricing was computed
/// with the coupon already applied.
///
/// # Errors
///
/// [`CalculationError::CouponComboOverlap`] naming the first overlapping product.
pub(crate) fn check_overlap(
    coupon: &Promotion,
    combos: &[Promotion],
) -> Result<(), CalculationError> {
    let PromotionRule::Coupon {
        target: CouponTarget::SpecificProducts,
        ..
    } = &coupon.rule
    else {
        return Ok(());
    };

    for condition in coupon.conditions_with_role(ConditionRole::AppliesTo) {
        if let Some(combo) = combos
            .iter()
            .find(|combo| combo.involves_product(condition.product_id))
        {
            return Err(CalculationError::CouponComboOverlap {
                product_id: condition.product_id,
                coupon_id: coupon.id,
                combo_id: combo.id,
            });
        }
    }

    Ok(())
}

/// Evaluate the matched coupon against the working lines.
///
/// Returns `None` when the coupon contributes nothing for this cart (below the
/// order-total minimum, or no matching lines); that is not an error.
pub(crate) fn evaluate(
    promotion: &Promotion,
    lines: &mut [LineState<'_>],
) -> Option<AppliedPromotion> {
    let PromotionRule::Coupon { target, .. } = &promotion.rule else {
        return None;
    };

    let participants: Vec<usize> = match target {
        CouponTarget::OrderTotal => (0..lines.len()).collect(),
        CouponTarget::SpecificProducts => {
            let products: FxHashSet<ProductId> = promotion
                .conditions_with_role(ConditionRole::AppliesTo)
                .map(|condition| condition.product_id)
                .collect();

            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| products.contains(&line.variant.product_id))
                .map(|(idx, _)| idx)
                .collect()
        }
    };

    if participants.is_empty() {
        return None;
    }

    let base: Decimal = participants
        .iter()
        .filter_map(|&idx| lines.get(idx))
        .map(|line| line.sub_total)
        .sum();

    if base <= Decimal::ZERO {
        return None;
    }

    // Below the minimum the coupon is simply inactive for this cart.
    if *target == CouponTarget::OrderTotal && base < promotion.min_order_value {
        return None;
    }

    let mut amount = promotion.discount.amount_for(base, 1);

    if let Some(cap) = promotion.max_discount {
        amount = amount.min(cap);
    }

    amount = amount.min(base);

    if amount <= Decimal::ZERO {
        return None;
    }

    let weights: Vec<Decimal> = participants
        .iter()
        .filter_map(|&idx| lines.get(idx))
        .map(|line| line.sub_total)
        .collect();

    let shares = allocate(amount, &weights);

    let mut items = Vec::with_capacity(participants.len());
    let mut applied_total = Decimal::ZERO;

    for (&line_idx, share) in participants.iter().zip(shares) {
        let Some(line) = lines.get_mut(line_idx) else {
            continue;
        };

        let granted = line.apply_discount(promotion.id, share, false);

        applied_total += granted;

        items.push(AppliedPromotionItem {
            variant_id: line.variant.id,
            amount: granted,
            is_gift: false,
        });
    }

    if applied_total <= Decimal::ZERO {
        return None;
    }

    Some(AppliedPromotion {
        promotion_id: promotion.id,
        promotion_name: promotion.name.clone(),
        rule: promotion.rule.clone(),
        amount: applied_total,
        items,
        suggestions: Vec::new(),
    })
}
