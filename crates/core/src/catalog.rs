//! Promotion catalog model
//!
//! Value objects returned by the read-only catalog port: resolved product variants
//! and promotions with their per-product conditions. Promotion mechanics are closed
//! enums, so evaluation dispatches by exhaustive matching and a new mechanic is a
//! compile-time decision point.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::money::round2;

macro_rules! id_type {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw id value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type! {
    /// Product variant identifier.
    VariantId
}

id_type! {
    /// Product identifier.
    ProductId
}

id_type! {
    /// Promotion identifier.
    PromotionId
}

/// A cart variant resolved against the product catalog.
///
/// Loaded once per distinct variant id and immutable for the duration of one
/// calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    /// Variant id.
    pub id: VariantId,

    /// Owning product id.
    pub product_id: ProductId,

    /// Unit price, 2-decimal money, >= 0.
    pub unit_price: Decimal,

    /// Owning product display name.
    pub product_name: String,

    /// Owning product image URL, when one exists.
    pub product_image: Option<String>,
}

/// Which lines a coupon discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponTarget {
    /// The whole order subtotal.
    OrderTotal,

    /// Only lines whose product is enumerated by `AppliesTo` conditions.
    SpecificProducts,
}

/// The mechanic of a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionRule {
    /// Buy all listed products together; the whole bundle is discounted.
    ProductCombo,

    /// Buy the listed `Buy` products, the listed `Get` products are discounted.
    BuyXGetY,

    /// Code-gated discount, never combined with a combo on the same product.
    Coupon {
        /// Code the shopper must supply.
        code: String,

        /// Which lines the coupon discounts.
        target: CouponTarget,
    },
}

/// How a promotion's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discount {
    /// Percentage of the discounted base, 0-100.
    Percent(Decimal),

    /// Fixed amount per occurrence.
    Fixed(Decimal),
}

impl Discount {
    /// Discount amount for a base value and a number of occurrences.
    ///
    /// Percentage discounts apply to the full base (which already scales with
    /// occurrences); fixed discounts are granted once per occurrence.
    #[must_use]
    pub fn amount_for(&self, base: Decimal, occurrences: i64) -> Decimal {
        match self {
            Self::Percent(rate) => round2(base * *rate / Decimal::ONE_HUNDRED),
            Self::Fixed(value) => round2(*value * Decimal::from(occurrences)),
        }
    }
}

/// Role of a product condition within its promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionRole {
    /// Qualifying purchase of a combo.
    Buy,

    /// Discounted (gifted) item of a buy-x-get-y combo.
    Get,

    /// Product eligible for a specific-products coupon.
    AppliesTo,
}

/// Denormalised product reference carried on a condition.
///
/// Suggestions must describe a `Get` product even when it is absent from the cart,
/// so the catalog attaches the display data here rather than relying on resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionProduct {
    /// Product display name.
    pub name: String,

    /// Product image URL, when one exists.
    pub image: Option<String>,

    /// Current unit price, when known.
    pub price: Option<Decimal>,
}

/// A per-product condition belonging to exactly one promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionCondition {
    /// Product this condition addresses.
    pub product_id: ProductId,

    /// Required (or granted) quantity, >= 1.
    pub quantity: i64,

    /// Role of the condition within its promotion.
    pub role: ConditionRole,

    /// Display data for the product, for suggestion payloads.
    pub product: Option<ConditionProduct>,
}

impl PromotionCondition {
    /// Required quantity, clamped to the >= 1 invariant.
    #[must_use]
    pub fn required_quantity(&self) -> i64 {
        self.quantity.max(1)
    }
}

/// A promotion with its conditions, as loaded from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    /// Promotion id.
    pub id: PromotionId,

    /// Display name.
    pub name: String,

    /// Mechanic of the promotion.
    pub rule: PromotionRule,

    /// Discount kind and value.
    pub discount: Discount,

    /// Optional whole-calculation cap on the discount amount.
    pub max_discount: Option<Decimal>,

    /// Minimum order subtotal for order-total coupons.
    pub min_order_value: Decimal,

    /// Start of the validity window, inclusive.
    pub starts_at: Timestamp,

    /// End of the validity window, inclusive.
    pub ends_at: Timestamp,

    /// Whether the promotion is switched on.
    pub is_active: bool,

    /// Per-product conditions.
    pub conditions: Vec<PromotionCondition>,
}

impl Promotion {
    /// Whether the promotion is active and `now` falls inside its validity window.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.starts_at <= now && now <= self.ends_at
    }

    /// The coupon code, for coupon promotions.
    #[must_use]
    pub fn coupon_code(&self) -> Option<&str> {
        match &self.rule {
            PromotionRule::Coupon { code, .. } => Some(code),
            PromotionRule::ProductCombo | PromotionRule::BuyXGetY => None,
        }
    }

    /// Conditions with the given role.
    pub fn conditions_with_role(
        &self,
        role: ConditionRole,
    ) -> impl Iterator<Item = &PromotionCondition> {
        self.conditions
            .iter()
            .filter(move |condition| condition.role == role)
    }

    /// Whether any condition of this promotion addresses `product_id`.
    #[must_use]
    pub fn involves_product(&self, product_id: ProductId) -> bool {
        self.conditions
            .iter()
            .any(|condition| condition.product_id == product_id)
    }
}

/// The active promotion catalog, partitioned by mechanic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionCatalog {
    /// Live combo promotions (product combos and buy-x-get-y).
    pub combos: Vec<Promotion>,

    /// Live coupon promotions.
    pub coupons: Vec<Promotion>,
}

impl PromotionCatalog {
    /// Partition a loaded promotion set, dropping anything not live at `now`.
    #[must_use]
    pub fn partition(promotions: Vec<Promotion>, now: Timestamp) -> Self {
        let mut catalog = Self::default();

        for promotion in promotions {
            if !promotion.is_live(now) {
                continue;
            }

            match promotion.rule {
                PromotionRule::ProductCombo | PromotionRule::BuyXGetY => {
                    catalog.combos.push(promotion);
                }
                PromotionRule::Coupon { .. } => catalog.coupons.push(promotion),
            }
        }

        catalog
    }

    /// Find the live coupon matching `code`, if any.
    #[must_use]
    pub fn coupon_by_code(&self, code: &str) -> Option<&Promotion> {
        self.coupons
            .iter()
            .find(|promotion| promotion.coupon_code() == Some(code))
    }
}
