//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};

use tally::{
    cart::{AggregatedCart, CartLine},
    catalog::{
        ConditionRole, Discount, ProductId, Promotion, PromotionCondition, PromotionId,
        PromotionRule, ResolvedVariant, VariantId,
    },
    evaluate::{CalculationInput, calculate},
    summary::{PricingSummary, RequestContext},
};
use tally_app::{context::AppContext, domain::pricing::MockPricingService};

use crate::state::State;

pub(crate) fn pricing_service(pricing: MockPricingService, route: Router) -> Service {
    let app = AppContext {
        pricing: Arc::new(pricing),
    };

    Service::new(
        Router::new()
            .hoop(inject(State::from_app_context(app)))
            .push(route),
    )
}

/// A small but fully consistent summary: 2 x 100.00 with a 10% bundle discount.
pub(crate) fn make_summary() -> PricingSummary {
    let now: Timestamp = "2026-06-15T12:00:00Z".parse().expect("timestamp literal");

    let cart = AggregatedCart::from_lines(&[CartLine::new(VariantId::new(1), 2)]);

    let variant = ResolvedVariant {
        id: VariantId::new(1),
        product_id: ProductId::new(101),
        unit_price: Decimal::from(100),
        product_name: "Product 101".to_string(),
        product_image: None,
    };

    let combo = Promotion {
        id: PromotionId::new(1),
        name: "Bundle 10%".to_string(),
        rule: PromotionRule::ProductCombo,
        discount: Discount::Percent(Decimal::from(10)),
        max_discount: None,
        min_order_value: Decimal::ZERO,
        starts_at: "2026-01-01T00:00:00Z".parse().expect("timestamp literal"),
        ends_at: "2026-12-31T23:59:59Z".parse().expect("timestamp literal"),
        is_active: true,
        conditions: vec![PromotionCondition {
            product_id: ProductId::new(101),
            quantity: 2,
            role: ConditionRole::Buy,
            product: None,
        }],
    };

    calculate(CalculationInput {
        cart,
        variants: vec![variant],
        promotions: vec![combo],
        coupon: None,
        coupon_code: None,
        now,
        context: RequestContext::default(),
    })
    .expect("fixture summary should calculate")
}
