//! Combo evaluation
//!
//! Each combo promotion is evaluated once, independently of the others. Product
//! combos discount the qualifying bundle itself; buy-x-get-y combos discount only
//! the granted `Get` lines and emit an upsell suggestion for every `Get` product
//! the cart is short on.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{
    catalog::{ConditionRole, ProductId, Promotion, PromotionCondition, PromotionRule},
    evaluate::LineState,
    money::{allocate, round2},
    summary::{AppliedPromotion, AppliedPromotionItem, PromotionSuggestion},
};

/// Evaluate one combo promotion against the working lines.
///
/// Returns `None` when the promotion neither applies discount nor produces a
/// suggestion; such promotions are omitted from the summary entirely.
pub(crate) fn evaluate(
    promotion: &Promotion,
    lines: &mut [LineState<'_>],
) -> Option<AppliedPromotion> {
    match promotion.rule {
        PromotionRule::ProductCombo => product_combo(promotion, lines),
        PromotionRule::BuyXGetY => buy_x_get_y(promotion, lines),
        // Coupons are routed to the coupon evaluator by the catalog partition.
        PromotionRule::Coupon { .. } => None,
    }
}

/// Cart lines grouped by owning product, in cart order.
struct ProductIndex {
    by_product: FxHashMap<ProductId, SmallVec<[usize; 2]>>,
}

impl ProductIndex {
    fn build(lines: &[LineState<'_>]) -> Self {
        let mut by_product: FxHashMap<ProductId, SmallVec<[usize; 2]>> = FxHashMap::default();

        for (idx, line) in lines.iter().enumerate() {
            by_product
                .entry(line.variant.product_id)
                .or_default()
                .push(idx);
        }

        Self { by_product }
    }

    fn line_indices(&self, product_id: ProductId) -> &[usize] {
        self.by_product
            .get(&product_id)
            .map_or(&[], |indices| indices.as_slice())
    }

    fn present_quantity(&self, lines: &[LineState<'_>], product_id: ProductId) -> i64 {
        self.line_indices(product_id)
            .iter()
            .filter_map(|&idx| lines.get(idx))
            .map(|line| line.quantity)
            .sum()
    }
}

/// Units taken from one line for a condition, valued at that line's own price.
struct Take {
    line_idx: usize,
    value: Decimal,
}

/// Consume `needed` units of a product greedily across its lines, in cart order.
///
/// `remaining` tracks per-line unconsumed units so repeated conditions on the same
/// product cannot double-count a unit.
fn consume_units(
    lines: &[LineState<'_>],
    index: &ProductIndex,
    remaining: &mut [i64],
    product_id: ProductId,
    needed: i64,
) -> SmallVec<[Take; 2]> {
    let mut takes: SmallVec<[Take; 2]> = SmallVec::new();
    let mut needed = needed;

    for &line_idx in index.line_indices(product_id) {
        if needed == 0 {
            break;
        }

        let Some(line) = lines.get(line_idx) else {
            continue;
        };

        let Some(rest) = remaining.get_mut(line_idx) else {
            continue;
        };

        let units = needed.min(*rest);

        if units == 0 {
            continue;
        }

        *rest -= units;
        needed -= units;

        takes.push(Take {
            line_idx,
            value: round2(line.variant.unit_price * Decimal::from(units)),
        });
    }

    takes
}

/// How many times the buy conditions are simultaneously satisfied.
fn times_applied(
    lines: &[LineState<'_>],
    index: &ProductIndex,
    conditions: &[&PromotionCondition],
) -> i64 {
    conditions
        .iter()
        .map(|condition| {
            index.present_quantity(lines, condition.product_id) / condition.required_quantity()
        })
        .min()
        .unwrap_or(0)
}

fn product_combo(promotion: &Promotion, lines: &mut [LineState<'_>]) -> Option<AppliedPromotion> {
    let index = ProductIndex::build(lines);

    let conditions: Vec<&PromotionCondition> = promotion
        .conditions_with_role(ConditionRole::Buy)
        .collect();

    if conditions.is_empty() {
        return None;
    }

    let times = times_applied(lines, &index, &conditions);

    if times < 1 {
        // A product combo needs every buy item at once; a partially present bundle
        // is not a useful upsell target, so no suggestion is emitted either.
        return None;
    }

    let mut remaining: Vec<i64> = lines.iter().map(|line| line.quantity).collect();
    let mut takes: Vec<Take> = Vec::new();

    for condition in &conditions {
        let needed = condition.required_quantity() * times;

        takes.extend(consume_units(
            lines,
            &index,
            &mut remaining,
            condition.product_id,
            needed,
        ));
    }

    let base_amount: Decimal = takes.iter().map(|take| take.value).sum();

    if base_amount <= Decimal::ZERO {
        return None;
    }

    let mut amount = promotion.discount.amount_for(base_amount, times);

    if let Some(cap) = promotion.max_discount {
        amount = amount.min(cap);
    }

    // The discount can never exceed the value it discounts.
    amount = amount.min(base_amount);

    if amount <= Decimal::ZERO {
        return None;
    }

    // Merge takes per line so a line participating through several conditions gets
    // one allocation weight, then split the amount proportionally.
    let mut merged: FxHashMap<usize, Decimal> = FxHashMap::default();

    for take in &takes {
        *merged.entry(take.line_idx).or_default() += take.value;
    }

    let mut participants: Vec<(usize, Decimal)> = merged.into_iter().collect();
    participants.sort_unstable_by_key(|(line_idx, _)| *line_idx);

    let weights: Vec<Decimal> = participants.iter().map(|(_, value)| *value).collect();
    let shares = allocate(amount, &weights);

    let mut items = Vec::with_capacity(participants.len());
    let mut applied_total = Decimal::ZERO;

    for ((line_idx, _), share) in participants.iter().zip(shares) {
        let Some(line) = lines.get_mut(*line_idx) else {
            continue;
        };

        let granted = line.apply_discount(promotion.id, share, false);

        line.mark_in_combo();
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

fn buy_x_get_y(promotion: &Promotion, lines: &mut [LineState<'_>]) -> Option<AppliedPromotion> {
    let index = ProductIndex::build(lines);

    let buys: Vec<&PromotionCondition> = promotion
        .conditions_with_role(ConditionRole::Buy)
        .collect();

    let gets: Vec<&PromotionCondition> = promotion
        .conditions_with_role(ConditionRole::Get)
        .collect();

    if buys.is_empty() || gets.is_empty() {
        return None;
    }

    let times = times_applied(lines, &index, &buys);

    if times < 1 {
        // The buyer has not started qualifying: no discount and no suggestion.
        return None;
    }

    let mut items = Vec::new();
    let mut suggestions = Vec::new();
    let mut amount = Decimal::ZERO;
    let mut any_granted = false;

    for get in &gets {
        let required = get.required_quantity() * times;
        let available = index.present_quantity(lines, get.product_id);
        let granted = required.min(available);

        if granted > 0 {
            any_granted = true;

            let mut remaining: Vec<i64> = lines.iter().map(|line| line.quantity).collect();

            let takes = consume_units(lines, &index, &mut remaining, get.product_id, granted);
            let gift_base: Decimal = takes.iter().map(|take| take.value).sum();

            if gift_base > Decimal::ZERO {
                let condition_amount = promotion
                    .discount
                    .amount_for(gift_base, granted)
                    .min(gift_base);

                if condition_amount > Decimal::ZERO {
                    let weights: Vec<Decimal> = takes.iter().map(|take| take.value).collect();
                    let shares = allocate(condition_amount, &weights);

                    for (take, share) in takes.iter().zip(shares) {
                        let Some(line) = lines.get_mut(take.line_idx) else {
                            continue;
                        };

                        let applied = line.apply_discount(promotion.id, share, true);

                        if applied > Decimal::ZERO {
                            line.mark_in_combo();
                            amount += applied;

                            items.push(AppliedPromotionItem {
                                variant_id: line.variant.id,
                                amount: applied,
                                is_gift: true,
                            });
                        }
                    }
                }
            }
        }

        if available < required {
            suggestions.push(PromotionSuggestion {
                product_id: get.product_id,
                product_name: get.product.as_ref().map(|product| product.name.clone()),
                product_image: get
                    .product
                    .as_ref()
                    .and_then(|product| product.image.clone()),
                product_price: get.product.as_ref().and_then(|product| product.price),
                required_quantity: required,
                current_quantity: available,
                missing_quantity: (required - available).max(0),
                auto_add: true,
            });
        }
    }

    // Buy lines count as combo participants only once a gift was actually granted;
    // qualifying without any realised discount leaves them untouched.
    if any_granted {
        for buy in &buys {
            for &line_idx in index.line_indices(buy.product_id) {
                if let Some(line) = lines.get_mut(line_idx) {
                    line.mark_in_combo();
                }
            }
        }
    }

    if amount <= Decimal::ZERO && suggestions.is_empty() {
        return None;
    }

    Some(AppliedPromotion {
        promotion_id: promotion.id,
        promotion_name: promotion.name.clone(),
        rule: promotion.rule.clone(),
        amount,
        items,
        suggestions,
    })
}
