//! Pricing Summary Response
//!
//! Wire shape of a pricing summary. Monetary values are emitted as plain
//! 2-decimal numbers; the engine has already rounded every amount, so the
//! conversion here is lossless.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use tally::{
    catalog::{CouponTarget, PromotionRule},
    summary::{
        AppliedPromotion, AppliedPromotionItem, LinePromotion, PricingLineItem, PricingSummary,
        PromotionSuggestion, RequestContext, SummaryMeta, Totals,
    },
};

fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn rule_labels(
    rule: &PromotionRule,
) -> (&'static str, Option<&'static str>, Option<&'static str>) {
    match rule {
        PromotionRule::ProductCombo => ("COMBO", Some("PRODUCT_COMBO"), None),
        PromotionRule::BuyXGetY => ("COMBO", Some("BUY_X_GET_Y"), None),
        PromotionRule::Coupon {
            target: CouponTarget::OrderTotal,
            ..
        } => ("COUPON", None, Some("ORDER_TOTAL")),
        PromotionRule::Coupon {
            target: CouponTarget::SpecificProducts,
            ..
        } => ("COUPON", None, Some("SPECIFIC_PRODUCTS")),
    }
}

/// A promotion's contribution to one line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinePromotionResponse {
    /// Contributing promotion id.
    pub promotion_id: i64,

    /// Discount amount applied to the line.
    pub amount: f64,

    /// Whether the amount was granted as a gift.
    pub is_gift: bool,
}

impl From<LinePromotion> for LinePromotionResponse {
    fn from(applied: LinePromotion) -> Self {
        Self {
            promotion_id: applied.promotion_id.get(),
            amount: money(applied.amount),
            is_gift: applied.is_gift,
        }
    }
}

/// One priced cart line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LineItemResponse {
    /// Variant id.
    pub variant_id: i64,

    /// Owning product id.
    pub product_id: i64,

    /// Owning product display name.
    pub product_name: String,

    /// Aggregated quantity.
    pub quantity: i64,

    /// Unit price.
    pub unit_price: f64,

    /// Line subtotal before discount.
    pub sub_total: f64,

    /// Total discount applied to the line.
    pub discount_total: f64,

    /// Line total after discount.
    pub total_amount: f64,

    /// Whether a combo discount was actually applied to this line.
    pub is_in_combo: bool,

    /// Whether the line was (partly) granted as a free gift.
    pub is_gift: bool,

    /// Per-promotion contributions.
    pub applied_promotions: Vec<LinePromotionResponse>,
}

impl From<PricingLineItem> for LineItemResponse {
    fn from(item: PricingLineItem) -> Self {
        Self {
            variant_id: item.variant_id.get(),
            product_id: item.product_id.get(),
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: money(item.unit_price),
            sub_total: money(item.sub_total),
            discount_total: money(item.discount_total),
            total_amount: money(item.total_amount),
            is_in_combo: item.is_in_combo,
            is_gift: item.is_gift,
            applied_promotions: item
                .applied_promotions
                .into_iter()
                .map(LinePromotionResponse::from)
                .collect(),
        }
    }
}

/// A promotion's per-line allocation entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppliedItemResponse {
    /// Affected line's variant id.
    pub variant_id: i64,

    /// Discount allocated to the line.
    pub amount: f64,

    /// Whether the allocation is a gift grant.
    pub is_gift: bool,
}

impl From<AppliedPromotionItem> for AppliedItemResponse {
    fn from(item: AppliedPromotionItem) -> Self {
        Self {
            variant_id: item.variant_id.get(),
            amount: money(item.amount),
            is_gift: item.is_gift,
        }
    }
}

/// An upsell hint for an almost-qualifying promotion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SuggestionResponse {
    /// Product the shopper is missing.
    pub product_id: i64,

    /// Product display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,

    /// Product unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_price: Option<f64>,

    /// Quantity required to fully unlock the grant.
    pub required_quantity: i64,

    /// Quantity currently in the cart.
    pub current_quantity: i64,

    /// Quantity still missing.
    pub missing_quantity: i64,

    /// Hint that the UI may add the missing quantity automatically.
    pub auto_add: bool,
}

impl From<PromotionSuggestion> for SuggestionResponse {
    fn from(suggestion: PromotionSuggestion) -> Self {
        Self {
            product_id: suggestion.product_id.get(),
            product_name: suggestion.product_name,
            product_image: suggestion.product_image,
            product_price: suggestion.product_price.map(money),
            required_quantity: suggestion.required_quantity,
            current_quantity: suggestion.current_quantity,
            missing_quantity: suggestion.missing_quantity,
            auto_add: suggestion.auto_add,
        }
    }
}

/// A promotion that applied discount or carries suggestions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppliedPromotionResponse {
    /// Promotion id.
    pub promotion_id: i64,

    /// Promotion display name.
    pub promotion_name: String,

    /// COMBO or COUPON.
    pub promotion_type: String,

    /// PRODUCT_COMBO or BUY_X_GET_Y, for combos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_type: Option<String>,

    /// ORDER_TOTAL or SPECIFIC_PRODUCTS, for coupons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_type: Option<String>,

    /// Total discount contributed.
    pub amount: f64,

    /// Per-line allocation.
    pub items: Vec<AppliedItemResponse>,

    /// Upsell suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<SuggestionResponse>,
}

impl From<AppliedPromotion> for AppliedPromotionResponse {
    fn from(applied: AppliedPromotion) -> Self {
        let (promotion_type, combo_type, coupon_type) = rule_labels(&applied.rule);

        Self {
            promotion_id: applied.promotion_id.get(),
            promotion_name: applied.promotion_name,
            promotion_type: promotion_type.to_string(),
            combo_type: combo_type.map(str::to_string),
            coupon_type: coupon_type.map(str::to_string),
            amount: money(applied.amount),
            items: applied
                .items
                .into_iter()
                .map(AppliedItemResponse::from)
                .collect(),
            suggestions: applied
                .suggestions
                .into_iter()
                .map(SuggestionResponse::from)
                .collect(),
        }
    }
}

/// Folded monetary totals.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TotalsResponse {
    /// Sum of all line subtotals.
    pub sub_total: f64,

    /// Total combo discount.
    pub auto_discount_total: f64,

    /// Total coupon discount.
    pub coupon_discount_total: f64,

    /// Combined discount.
    pub discount_total: f64,

    /// Shipping fee hook point, currently always zero.
    pub shipping_fee: f64,

    /// Tax hook point, currently always zero.
    pub tax_total: f64,

    /// Final payable amount.
    pub total_amount: f64,
}

impl From<Totals> for TotalsResponse {
    fn from(totals: Totals) -> Self {
        Self {
            sub_total: money(totals.sub_total),
            auto_discount_total: money(totals.auto_discount_total),
            coupon_discount_total: money(totals.coupon_discount_total),
            discount_total: money(totals.discount_total),
            shipping_fee: money(totals.shipping_fee),
            tax_total: money(totals.tax_total),
            total_amount: money(totals.total_amount),
        }
    }
}

/// Echo of the request identifiers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContextResponse {
    /// Coupon code supplied with the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_code: Option<String>,

    /// Branch id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,

    /// Address id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,

    /// User id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl From<RequestContext> for ContextResponse {
    fn from(context: RequestContext) -> Self {
        Self {
            promotion_code: context.promotion_code,
            branch_id: context.branch_id,
            address_id: context.address_id,
            user_id: context.user_id,
        }
    }
}

/// Aggregate discount metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetaResponse {
    /// Total combo discount.
    pub total_auto_discount: f64,

    /// Total coupon discount.
    pub total_coupon_discount: f64,
}

impl From<SummaryMeta> for MetaResponse {
    fn from(meta: SummaryMeta) -> Self {
        Self {
            total_auto_discount: money(meta.total_auto_discount),
            total_coupon_discount: money(meta.total_coupon_discount),
        }
    }
}

/// Calculate Pricing Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PricingSummaryResponse {
    /// One entry per distinct variant, in cart order.
    pub items: Vec<LineItemResponse>,

    /// Folded monetary totals.
    pub totals: TotalsResponse,

    /// Promotions that applied discount or carry suggestions.
    pub applied_promotions: Vec<AppliedPromotionResponse>,

    /// Echo of the request identifiers.
    pub context: ContextResponse,

    /// Aggregate discount metadata.
    pub meta: MetaResponse,
}

impl From<PricingSummary> for PricingSummaryResponse {
    fn from(summary: PricingSummary) -> Self {
        Self {
            items: summary
                .items
                .into_iter()
                .map(LineItemResponse::from)
                .collect(),
            totals: summary.totals.into(),
            applied_promotions: summary
                .applied_promotions
                .into_iter()
                .map(AppliedPromotionResponse::from)
                .collect(),
            context: summary.context.into(),
            meta: summary.meta.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tally::catalog::{ProductId, PromotionId, VariantId};

    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    #[test]
    fn monetary_fields_serialize_as_two_decimal_numbers() {
        let totals = TotalsResponse::from(Totals {
            sub_total: dec("550.00"),
            auto_discount_total: dec("150.00"),
            coupon_discount_total: dec("0.00"),
            discount_total: dec("150.00"),
            shipping_fee: dec("0.00"),
            tax_total: dec("0.00"),
            total_amount: dec("400.00"),
        });

        let json = serde_json::to_value(&totals).expect("serialize totals");

        assert_eq!(json["subTotal"], serde_json::json!(550.0));
        assert_eq!(json["totalAmount"], serde_json::json!(400.0));
    }

    #[test]
    fn combo_rules_expose_combo_type_only() {
        let applied = AppliedPromotionResponse::from(AppliedPromotion {
            promotion_id: PromotionId::new(1),
            promotion_name: "Bundle".to_string(),
            rule: PromotionRule::BuyXGetY,
            amount: dec("10.00"),
            items: vec![AppliedPromotionItem {
                variant_id: VariantId::new(2),
                amount: dec("10.00"),
                is_gift: true,
            }],
            suggestions: Vec::new(),
        });

        assert_eq!(applied.promotion_type, "COMBO");
        assert_eq!(applied.combo_type.as_deref(), Some("BUY_X_GET_Y"));
        assert_eq!(applied.coupon_type, None);

        let json = serde_json::to_value(&applied).expect("serialize promotion");

        assert_eq!(json["comboType"], serde_json::json!("BUY_X_GET_Y"));
        assert!(json.get("couponType").is_none());
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn coupon_rules_expose_coupon_type_only() {
        let applied = AppliedPromotionResponse::from(AppliedPromotion {
            promotion_id: PromotionId::new(4),
            promotion_name: "SAVE20".to_string(),
            rule: PromotionRule::Coupon {
                code: "SAVE20".to_string(),
                target: CouponTarget::SpecificProducts,
            },
            amount: dec("30.00"),
            items: Vec::new(),
            suggestions: Vec::new(),
        });

        assert_eq!(applied.promotion_type, "COUPON");
        assert_eq!(applied.combo_type, None);
        assert_eq!(applied.coupon_type.as_deref(), Some("SPECIFIC_PRODUCTS"));
    }

    #[test]
    fn suggestions_carry_the_condition_product_reference() {
        let suggestion = SuggestionResponse::from(PromotionSuggestion {
            product_id: ProductId::new(602),
            product_name: Some("Premium Gift".to_string()),
            product_image: None,
            product_price: Some(dec("99000.00")),
            required_quantity: 1,
            current_quantity: 0,
            missing_quantity: 1,
            auto_add: true,
        });

        let json = serde_json::to_value(&suggestion).expect("serialize suggestion");

        assert_eq!(json["productId"], serde_json::json!(602));
        assert_eq!(json["productPrice"], serde_json::json!(99000.0));
        assert_eq!(json["missingQuantity"], serde_json::json!(1));
        assert_eq!(json["autoAdd"], serde_json::json!(true));
        assert!(json.get("productImage").is_none());
    }
}
