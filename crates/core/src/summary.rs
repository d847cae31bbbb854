//! Pricing summary model
//!
//! The result of one calculation: per-line breakdowns, per-promotion applications
//! and suggestions, and the folded totals. Everything derives `PartialEq`, so two
//! runs over identical inputs can be asserted identical.

use rust_decimal::Decimal;

use crate::catalog::{ProductId, PromotionId, PromotionRule, VariantId};

/// A promotion's contribution to a single line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePromotion {
    /// Contributing promotion.
    pub promotion_id: PromotionId,

    /// Discount amount this promotion applied to the line.
    pub amount: Decimal,

    /// Whether the amount was granted to this line as a gift.
    pub is_gift: bool,
}

/// One output line per distinct variant in the resolved cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingLineItem {
    /// Variant id.
    pub variant_id: VariantId,

    /// Owning product id.
    pub product_id: ProductId,

    /// Owning product display name.
    pub product_name: String,

    /// Aggregated quantity.
    pub quantity: i64,

    /// Unit price.
    pub unit_price: Decimal,

    /// `unit_price * quantity`.
    pub sub_total: Decimal,

    /// Total discount applied to this line, `0 <= discount_total <= sub_total`.
    pub discount_total: Decimal,

    /// `sub_total - discount_total`.
    pub total_amount: Decimal,

    /// True only when a combo discount was actually applied to this line.
    pub is_in_combo: bool,

    /// True when the line was (partly) granted as a free gift.
    pub is_gift: bool,

    /// Per-promotion contributions to this line.
    pub applied_promotions: Vec<LinePromotion>,
}

/// A promotion's per-line allocation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotionItem {
    /// Affected line's variant id.
    pub variant_id: VariantId,

    /// Discount allocated to the line.
    pub amount: Decimal,

    /// Whether the allocation is a gift grant.
    pub is_gift: bool,
}

/// An upsell hint for an almost-qualifying buy-x-get-y promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionSuggestion {
    /// Product the shopper is missing.
    pub product_id: ProductId,

    /// Product display name, when the catalog carries one.
    pub product_name: Option<String>,

    /// Product image URL, when the catalog carries one.
    pub product_image: Option<String>,

    /// Product unit price, when the catalog carries one.
    pub product_price: Option<Decimal>,

    /// Quantity required to fully unlock the grant.
    pub required_quantity: i64,

    /// Quantity currently in the cart.
    pub current_quantity: i64,

    /// `max(0, required_quantity - current_quantity)`.
    pub missing_quantity: i64,

    /// Hint that the UI may offer to add the missing quantity automatically.
    pub auto_add: bool,
}

/// A promotion that applied discount or produced at least one suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotion {
    /// Promotion id.
    pub promotion_id: PromotionId,

    /// Promotion display name.
    pub promotion_name: String,

    /// Mechanic of the promotion.
    pub rule: PromotionRule,

    /// Total discount contributed, may be zero when only suggestions exist.
    pub amount: Decimal,

    /// Per-line discount allocation.
    pub items: Vec<AppliedPromotionItem>,

    /// Upsell suggestions, buy-x-get-y only.
    pub suggestions: Vec<PromotionSuggestion>,
}

/// Folded monetary totals of a calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    /// Sum of all line subtotals.
    pub sub_total: Decimal,

    /// Total combo (automatic) discount.
    pub auto_discount_total: Decimal,

    /// Total coupon discount.
    pub coupon_discount_total: Decimal,

    /// `auto_discount_total + coupon_discount_total`.
    pub discount_total: Decimal,

    /// Shipping fee hook point, currently always zero.
    pub shipping_fee: Decimal,

    /// Tax hook point, currently always zero.
    pub tax_total: Decimal,

    /// `sub_total - discount_total + shipping_fee + tax_total`.
    pub total_amount: Decimal,
}

/// Echo of the request identifiers the calculation was made for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Coupon code supplied with the request.
    pub promotion_code: Option<String>,

    /// Branch the order would be placed against.
    pub branch_id: Option<i64>,

    /// Delivery address.
    pub address_id: Option<i64>,

    /// Requesting user.
    pub user_id: Option<i64>,
}

/// Aggregate discount metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMeta {
    /// Total combo (automatic) discount.
    pub total_auto_discount: Decimal,

    /// Total coupon discount.
    pub total_coupon_discount: Decimal,
}

/// The complete result of one pricing calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSummary {
    /// One entry per distinct variant, in cart order.
    pub items: Vec<PricingLineItem>,

    /// Folded monetary totals.
    pub totals: Totals,

    /// Promotions that applied discount or carry suggestions.
    pub applied_promotions: Vec<AppliedPromotion>,

    /// Echo of the request identifiers.
    pub context: RequestContext,

    /// Aggregate discount metadata.
    pub meta: SummaryMeta,
}
