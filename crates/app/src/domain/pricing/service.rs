//! Pricing service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info};

use tally::{
    cart::AggregatedCart,
    evaluate::{CalculationError, CalculationInput, calculate},
    summary::PricingSummary,
};

use crate::domain::{
    catalog::CatalogReader,
    pricing::{PricingServiceError, data::PricingRequest},
};

/// Pricing service backed by the catalog read port.
#[derive(Clone)]
pub struct CatalogPricingService {
    catalog: Arc<dyn CatalogReader>,
}

impl CatalogPricingService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl PricingService for CatalogPricingService {
    #[tracing::instrument(
        name = "pricing.service.calculate",
        skip(self, request),
        fields(
            line_count = request.items.len(),
            has_coupon = request.promotion_code.is_some(),
            sub_total = tracing::field::Empty,
            discount_total = tracing::field::Empty
        ),
        err
    )]
    async fn calculate(
        &self,
        request: PricingRequest,
    ) -> Result<PricingSummary, PricingServiceError> {
        let cart = AggregatedCart::from_lines(&request.items);

        if cart.is_empty() {
            return Err(CalculationError::EmptyCart.into());
        }

        let now = Timestamp::now();
        let coupon_code = request.promotion_code.clone();

        // The reads are independent; run them concurrently and only then evaluate.
        let variants_fut = self.catalog.find_variants_by_ids(cart.variant_ids());
        let promotions_fut = self.catalog.find_active_promotions(now);

        let coupon_fut = async {
            match &coupon_code {
                Some(code) => self.catalog.find_promotion_by_code(code).await,
                None => Ok(None),
            }
        };

        let (variants, promotions, coupon) =
            tokio::try_join!(variants_fut, promotions_fut, coupon_fut)?;

        let summary = calculate(CalculationInput {
            cart,
            variants,
            promotions,
            coupon,
            coupon_code,
            now,
            context: request.context(),
        })?;

        let span = Span::current();

        span.record(
            "sub_total",
            tracing::field::display(summary.totals.sub_total),
        );

        span.record(
            "discount_total",
            tracing::field::display(summary.totals.discount_total),
        );

        info!(
            items = summary.items.len(),
            promotions = summary.applied_promotions.len(),
            "priced cart"
        );

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Price a cart against the current promotion snapshot.
    async fn calculate(
        &self,
        request: PricingRequest,
    ) -> Result<PricingSummary, PricingServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use tally::{
        cart::CartLine,
        catalog::{
            ConditionRole, CouponTarget, Discount, ProductId, Promotion, PromotionCondition,
            PromotionId, PromotionRule, ResolvedVariant, VariantId,
        },
    };

    use crate::domain::catalog::{CatalogError, InMemoryCatalog, MockCatalogReader};

    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    fn variant(id: i64, product_id: i64, price: &str) -> ResolvedVariant {
        ResolvedVariant {
            id: VariantId::new(id),
            product_id: ProductId::new(product_id),
            unit_price: dec(price),
            product_name: format!("Product {product_id}"),
            product_image: None,
        }
    }

    fn window() -> (Timestamp, Timestamp) {
        let starts = Timestamp::now() - jiff::SignedDuration::from_hours(24);
        let ends = Timestamp::now() + jiff::SignedDuration::from_hours(24);

        (starts, ends)
    }

    fn combo_on(product_id: i64, quantity: i64) -> Promotion {
        let (starts_at, ends_at) = window();

        Promotion {
            id: PromotionId::new(1),
            name: "Bundle".to_string(),
            rule: PromotionRule::ProductCombo,
            discount: Discount::Percent(dec("10")),
            max_discount: None,
            min_order_value: Decimal::ZERO,
            starts_at,
            ends_at,
            is_active: true,
            conditions: vec![PromotionCondition {
                product_id: ProductId::new(product_id),
                quantity,
                role: ConditionRole::Buy,
                product: None,
            }],
        }
    }

    fn coupon_on(product_id: i64, code: &str) -> Promotion {
        let (starts_at, ends_at) = window();

        Promotion {
            id: PromotionId::new(2),
            name: code.to_string(),
            rule: PromotionRule::Coupon {
                code: code.to_string(),
                target: CouponTarget::SpecificProducts,
            },
            discount: Discount::Percent(dec("20")),
            max_discount: None,
            min_order_value: Decimal::ZERO,
            starts_at,
            ends_at,
            is_active: true,
            conditions: vec![PromotionCondition {
                product_id: ProductId::new(product_id),
                quantity: 1,
                role: ConditionRole::AppliesTo,
                product: None,
            }],
        }
    }

    fn request(items: Vec<CartLine>) -> PricingRequest {
        PricingRequest {
            items,
            ..PricingRequest::default()
        }
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_any_catalog_read() {
        let mut catalog = MockCatalogReader::new();

        catalog.expect_find_variants_by_ids().never();
        catalog.expect_find_active_promotions().never();
        catalog.expect_find_promotion_by_code().never();

        let service = CatalogPricingService::new(Arc::new(catalog));

        let result = service.calculate(request(Vec::new())).await;

        assert!(matches!(
            result,
            Err(PricingServiceError::InvalidInput(
                CalculationError::EmptyCart
            ))
        ));
    }

    #[tokio::test]
    async fn aggregates_lines_and_prices_through_the_port() -> TestResult {
        let mut catalog = MockCatalogReader::new();

        catalog
            .expect_find_variants_by_ids()
            .once()
            .withf(|ids| *ids == [VariantId::new(1)])
            .returning(|_| Ok(vec![variant(1, 101, "100.00")]));

        catalog
            .expect_find_active_promotions()
            .once()
            .returning(|_| Ok(vec![combo_on(101, 2)]));

        catalog.expect_find_promotion_by_code().never();

        let service = CatalogPricingService::new(Arc::new(catalog));

        // Two duplicate raw lines aggregate into the qualifying quantity.
        let summary = service
            .calculate(request(vec![
                CartLine::new(VariantId::new(1), 1),
                CartLine::new(VariantId::new(1), 1),
            ]))
            .await?;

        assert_eq!(summary.totals.sub_total, dec("200.00"));
        assert_eq!(summary.totals.auto_discount_total, dec("20.00"));
        assert_eq!(summary.totals.total_amount, dec("180.00"));

        Ok(())
    }

    #[tokio::test]
    async fn coupon_codes_are_resolved_through_the_port() -> TestResult {
        let mut catalog = MockCatalogReader::new();

        catalog
            .expect_find_variants_by_ids()
            .once()
            .returning(|_| Ok(vec![variant(2, 202, "150.00")]));

        catalog
            .expect_find_active_promotions()
            .once()
            .returning(|_| Ok(Vec::new()));

        catalog
            .expect_find_promotion_by_code()
            .once()
            .withf(|code| code == "SAVE20")
            .returning(|_| Ok(Some(coupon_on(202, "SAVE20"))));

        let service = CatalogPricingService::new(Arc::new(catalog));

        let summary = service
            .calculate(PricingRequest {
                items: vec![CartLine::new(VariantId::new(2), 1)],
                promotion_code: Some("SAVE20".to_string()),
                ..PricingRequest::default()
            })
            .await?;

        assert_eq!(summary.totals.coupon_discount_total, dec("30.00"));
        assert_eq!(summary.totals.total_amount, dec("120.00"));
        assert_eq!(summary.context.promotion_code.as_deref(), Some("SAVE20"));

        Ok(())
    }

    #[tokio::test]
    async fn unresolved_variants_surface_as_invalid_input() {
        let mut catalog = MockCatalogReader::new();

        catalog
            .expect_find_variants_by_ids()
            .once()
            .returning(|_| Ok(Vec::new()));

        catalog
            .expect_find_active_promotions()
            .once()
            .returning(|_| Ok(Vec::new()));

        let service = CatalogPricingService::new(Arc::new(catalog));

        let result = service
            .calculate(request(vec![CartLine::new(VariantId::new(9), 1)]))
            .await;

        assert!(matches!(
            result,
            Err(PricingServiceError::InvalidInput(
                CalculationError::UnknownVariants(ids)
            )) if ids == vec![VariantId::new(9)]
        ));
    }

    #[tokio::test]
    async fn coupon_combo_overlap_surfaces_as_conflict() {
        let mut catalog = MockCatalogReader::new();

        catalog
            .expect_find_variants_by_ids()
            .once()
            .returning(|_| Ok(vec![variant(3, 303, "120.00")]));

        catalog
            .expect_find_active_promotions()
            .once()
            .returning(|_| Ok(vec![combo_on(303, 2)]));

        catalog
            .expect_find_promotion_by_code()
            .once()
            .returning(|_| Ok(Some(coupon_on(303, "STACK10"))));

        let service = CatalogPricingService::new(Arc::new(catalog));

        let result = service
            .calculate(PricingRequest {
                items: vec![CartLine::new(VariantId::new(3), 1)],
                promotion_code: Some("STACK10".to_string()),
                ..PricingRequest::default()
            })
            .await;

        assert!(matches!(result, Err(PricingServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn catalog_failures_propagate() {
        let mut catalog = MockCatalogReader::new();

        catalog
            .expect_find_variants_by_ids()
            .returning(|_| Err(CatalogError::Unavailable("connection reset".into())));

        catalog
            .expect_find_active_promotions()
            .returning(|_| Ok(Vec::new()));

        let service = CatalogPricingService::new(Arc::new(catalog));

        let result = service
            .calculate(request(vec![CartLine::new(VariantId::new(1), 1)]))
            .await;

        assert!(matches!(result, Err(PricingServiceError::Catalog(_))));
    }

    #[tokio::test]
    async fn prices_against_an_in_memory_snapshot() -> TestResult {
        let catalog = InMemoryCatalog::new(
            vec![variant(10, 501, "200.00"), variant(11, 502, "150.00")],
            vec![{
                let (starts_at, ends_at) = window();

                Promotion {
                    id: PromotionId::new(7),
                    name: "Buy 2 get 1".to_string(),
                    rule: PromotionRule::BuyXGetY,
                    discount: Discount::Percent(dec("100")),
                    max_discount: None,
                    min_order_value: Decimal::ZERO,
                    starts_at,
                    ends_at,
                    is_active: true,
                    conditions: vec![
                        PromotionCondition {
                            product_id: ProductId::new(501),
                            quantity: 2,
                            role: ConditionRole::Buy,
                            product: None,
                        },
                        PromotionCondition {
                            product_id: ProductId::new(502),
                            quantity: 1,
                            role: ConditionRole::Get,
                            product: None,
                        },
                    ],
                }
            }],
        );

        let service = CatalogPricingService::new(Arc::new(catalog));

        let summary = service
            .calculate(request(vec![
                CartLine::new(VariantId::new(10), 2),
                CartLine::new(VariantId::new(11), 1),
            ]))
            .await?;

        assert_eq!(summary.totals.sub_total, dec("550.00"));
        assert_eq!(summary.totals.auto_discount_total, dec("150.00"));
        assert_eq!(summary.totals.total_amount, dec("400.00"));

        Ok(())
    }
}
