//! Calculation pipeline
//!
//! `calculate` is a pure function of (aggregated cart, promotion snapshot, coupon
//! code) -> [`PricingSummary`]. All input errors are raised before any discount is
//! computed; a summary is never returned alongside an error.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::AggregatedCart,
    catalog::{
        ProductId, Promotion, PromotionCatalog, PromotionId, PromotionRule, ResolvedVariant,
        VariantId,
    },
    money::round2,
    summary::{
        AppliedPromotion, LinePromotion, PricingLineItem, PricingSummary, RequestContext,
        SummaryMeta, Totals,
    },
};

mod combo;
mod coupon;

/// Everything one calculation needs, loaded up front.
#[derive(Debug, Clone)]
pub struct CalculationInput {
    /// The aggregated cart.
    pub cart: AggregatedCart,

    /// Resolved variants for the cart's distinct variant ids.
    pub variants: Vec<ResolvedVariant>,

    /// Snapshot of currently relevant promotions, with conditions.
    pub promotions: Vec<Promotion>,

    /// Promotion resolved from the supplied coupon code, when one was found.
    pub coupon: Option<Promotion>,

    /// Coupon code supplied with the request.
    pub coupon_code: Option<String>,

    /// Evaluation instant for validity windows.
    pub now: Timestamp,

    /// Request identifiers echoed into the summary.
    pub context: RequestContext,
}

/// Why a calculation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    /// The cart contained no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more requested variant ids could not be resolved.
    ///
    /// Carries every offending id; a partially resolved cart would silently
    /// misprice the order, so resolution fails closed.
    #[error("unknown variant ids: {}", join_ids(.0))]
    UnknownVariants(Vec<VariantId>),

    /// A coupon code was supplied but matches no live coupon promotion.
    #[error("coupon code `{0}` does not match any active coupon")]
    CouponNotFound(String),

    /// A coupon target product also participates in an active combo.
    ///
    /// Checked against the promotion catalog, not just the triggered result, so a
    /// shopper cannot race the check by adding qualifying items after pricing.
    #[error(
        "coupon {coupon_id} cannot stack with combo {combo_id}: product {product_id} participates in both"
    )]
    CouponComboOverlap {
        /// Product addressed by both promotions.
        product_id: ProductId,

        /// The rejected coupon.
        coupon_id: PromotionId,

        /// The overlapping combo.
        combo_id: PromotionId,
    },
}

fn join_ids(ids: &[VariantId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Mutable per-line working state threaded through the evaluators.
#[derive(Debug)]
pub(crate) struct LineState<'a> {
    pub(crate) variant: &'a ResolvedVariant,
    pub(crate) quantity: i64,
    pub(crate) sub_total: Decimal,
    pub(crate) discount_total: Decimal,
    pub(crate) is_in_combo: bool,
    pub(crate) is_gift: bool,
    pub(crate) promotions: Vec<LinePromotion>,
}

impl<'a> LineState<'a> {
    fn new(variant: &'a ResolvedVariant, quantity: i64) -> Self {
        Self {
            variant,
            quantity,
            sub_total: round2(variant.unit_price * Decimal::from(quantity)),
            discount_total: Decimal::ZERO,
            is_in_combo: false,
            is_gift: false,
            promotions: Vec::new(),
        }
    }

    /// Apply a discount to this line, clamped so `discount_total` never exceeds
    /// `sub_total`. Returns the amount actually applied.
    pub(crate) fn apply_discount(
        &mut self,
        promotion_id: PromotionId,
        amount: Decimal,
        is_gift: bool,
    ) -> Decimal {
        let remaining = self.sub_total - self.discount_total;
        let granted = amount.min(remaining).max(Decimal::ZERO);

        if granted.is_zero() {
            return Decimal::ZERO;
        }

        self.discount_total += granted;

        if is_gift {
            self.is_gift = true;
        }

        self.promotions.push(LinePromotion {
            promotion_id,
            amount: granted,
            is_gift,
        });

        granted
    }

    pub(crate) fn mark_in_combo(&mut self) {
        self.is_in_combo = true;
    }

    fn into_item(self) -> PricingLineItem {
        let total_amount = self.sub_total - self.discount_total;

        PricingLineItem {
            variant_id: self.variant.id,
            product_id: self.variant.product_id,
            product_name: self.variant.product_name.clone(),
            quantity: self.quantity,
            unit_price: self.variant.unit_price,
            sub_total: self.sub_total,
            discount_total: self.discount_total,
            total_amount,
            is_in_combo: self.is_in_combo,
            is_gift: self.is_gift,
            applied_promotions: self.promotions,
        }
    }
}

/// Run one pricing calculation.
///
/// # Errors
///
/// - [`CalculationError::EmptyCart`]: the aggregated cart has no lines.
/// - [`CalculationError::UnknownVariants`]: some cart variant ids did not resolve.
/// - [`CalculationError::CouponNotFound`]: a code was supplied but no live coupon
///   matches it.
/// - [`CalculationError::CouponComboOverlap`]: the coupon targets a product that
///   participates in an active combo.
pub fn calculate(input: CalculationInput) -> Result<PricingSummary, CalculationError> {
    let CalculationInput {
        cart,
        variants,
        promotions,
        coupon,
        coupon_code,
        now,
        context,
    } = input;

    if cart.is_empty() {
        return Err(CalculationError::EmptyCart);
    }

    let by_id: FxHashMap<VariantId, &ResolvedVariant> = variants
        .iter()
        .map(|variant| (variant.id, variant))
        .collect();

    let unknown: Vec<VariantId> = cart
        .iter()
        .filter(|entry| !by_id.contains_key(&entry.variant_id))
        .map(|entry| entry.variant_id)
        .collect();

    if !unknown.is_empty() {
        return Err(CalculationError::UnknownVariants(unknown));
    }

    let catalog = PromotionCatalog::partition(promotions, now);

    // Resolve the coupon before any discount is computed so a bad code aborts the
    // whole calculation.
    let coupon = match &coupon_code {
        Some(code) => Some(resolve_coupon(code, coupon, &catalog, now)?),
        None => None,
    };

    if let Some(coupon) = &coupon {
        coupon::check_overlap(coupon, &catalog.combos)?;
    }

    let mut lines: Vec<LineState<'_>> = cart
        .iter()
        .filter_map(|entry| {
            by_id
                .get(&entry.variant_id)
                .map(|variant| LineState::new(variant, entry.quantity))
        })
        .collect();

    let mut applied: Vec<AppliedPromotion> = Vec::new();

    for promotion in &catalog.combos {
        if let Some(outcome) = combo::evaluate(promotion, &mut lines) {
            applied.push(outcome);
        }
    }

    if let Some(coupon) = &coupon {
        if let Some(outcome) = coupon::evaluate(coupon, &mut lines) {
            applied.push(outcome);
        }
    }

    Ok(build_summary(lines, applied, context))
}

fn resolve_coupon(
    code: &str,
    fetched: Option<Promotion>,
    catalog: &PromotionCatalog,
    now: Timestamp,
) -> Result<Promotion, CalculationError> {
    let candidate = fetched
        .filter(|promotion| promotion.coupon_code() == Some(code) && promotion.is_live(now))
        .or_else(|| catalog.coupon_by_code(code).cloned());

    candidate.ok_or_else(|| CalculationError::CouponNotFound(code.to_string()))
}

fn build_summary(
    lines: Vec<LineState<'_>>,
    applied: Vec<AppliedPromotion>,
    context: RequestContext,
) -> PricingSummary {
    let items: Vec<PricingLineItem> = lines.into_iter().map(LineState::into_item).collect();

    let sub_total = round2(items.iter().map(|item| item.sub_total).sum());

    // A promotion earns its place by contributing discount or a suggestion.
    let applied_promotions: Vec<AppliedPromotion> = applied
        .into_iter()
        .filter(|promotion| promotion.amount > Decimal::ZERO || !promotion.suggestions.is_empty())
        .collect();

    let auto_discount_total = round2(
        applied_promotions
            .iter()
            .filter(|promotion| {
                matches!(
                    promotion.rule,
                    PromotionRule::ProductCombo | PromotionRule::BuyXGetY
                )
            })
            .map(|promotion| promotion.amount)
            .sum(),
    );

    let coupon_discount_total = round2(
        applied_promotions
            .iter()
            .filter(|promotion| matches!(promotion.rule, PromotionRule::Coupon { .. }))
            .map(|promotion| promotion.amount)
            .sum(),
    );

    let discount_total = auto_discount_total + coupon_discount_total;

    // Shipping and tax are external hook points; the engine always prices them at 0.
    let shipping_fee = Decimal::ZERO;
    let tax_total = Decimal::ZERO;

    let total_amount = round2(sub_total - discount_total + shipping_fee + tax_total);

    PricingSummary {
        items,
        totals: Totals {
            sub_total,
            auto_discount_total,
            coupon_discount_total,
            discount_total,
            shipping_fee,
            tax_total,
            total_amount,
        },
        applied_promotions,
        context,
        meta: SummaryMeta {
            total_auto_discount: auto_discount_total,
            total_coupon_discount: coupon_discount_total,
        },
    }
}
