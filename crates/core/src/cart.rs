//! Cart aggregation
//!
//! Raw request carts may repeat the same variant across several lines and may omit
//! quantities. Aggregation collapses duplicates into one entry per variant while
//! preserving first-seen order, so downstream evaluation and the final summary are
//! deterministic for identical inputs.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::catalog::VariantId;

/// One raw cart line as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    /// Variant being purchased.
    pub variant_id: VariantId,

    /// Requested quantity. `None` defaults to 1; non-positive values are clamped to 1.
    pub quantity: Option<i64>,
}

impl CartLine {
    /// Create a line with an explicit quantity.
    #[must_use]
    pub fn new(variant_id: VariantId, quantity: i64) -> Self {
        Self {
            variant_id,
            quantity: Some(quantity),
        }
    }
}

/// One aggregated cart entry: a distinct variant and its total quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry {
    /// Variant being purchased.
    pub variant_id: VariantId,

    /// Total requested quantity across all raw lines, always >= 1.
    pub quantity: i64,
}

/// A cart with duplicate variant lines collapsed, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedCart {
    entries: Vec<CartEntry>,
}

impl AggregatedCart {
    /// Aggregate raw lines by variant id.
    ///
    /// Quantities default to 1 when omitted and are clamped to a minimum of 1, so
    /// aggregation itself cannot fail.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let mut entries: Vec<CartEntry> = Vec::with_capacity(lines.len());
        let mut index: FxHashMap<VariantId, usize> = FxHashMap::default();

        for line in lines {
            let quantity = line.quantity.unwrap_or(1).max(1);

            match index.entry(line.variant_id) {
                Entry::Occupied(slot) => {
                    if let Some(existing) = entries.get_mut(*slot.get()) {
                        existing.quantity += quantity;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(entries.len());

                    entries.push(CartEntry {
                        variant_id: line.variant_id,
                        quantity,
                    });
                }
            }
        }

        Self { entries }
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct variants in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.iter()
    }

    /// The distinct variant ids, in first-seen order.
    #[must_use]
    pub fn variant_ids(&self) -> Vec<VariantId> {
        self.entries.iter().map(|entry| entry.variant_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_lines_are_merged_by_variant() {
        let cart = AggregatedCart::from_lines(&[
            CartLine::new(VariantId::new(1), 2),
            CartLine::new(VariantId::new(2), 1),
            CartLine::new(VariantId::new(1), 3),
        ]);

        assert_eq!(cart.len(), 2);

        let entries: Vec<_> = cart.iter().copied().collect();

        assert_eq!(
            entries,
            vec![
                CartEntry {
                    variant_id: VariantId::new(1),
                    quantity: 5
                },
                CartEntry {
                    variant_id: VariantId::new(2),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn missing_quantity_defaults_to_one() {
        let cart = AggregatedCart::from_lines(&[CartLine {
            variant_id: VariantId::new(9),
            quantity: None,
        }]);

        let entries: Vec<_> = cart.iter().copied().collect();

        assert_eq!(entries.first().map(|entry| entry.quantity), Some(1));
    }

    #[test]
    fn non_positive_quantities_are_clamped_to_one() {
        let cart = AggregatedCart::from_lines(&[
            CartLine::new(VariantId::new(1), 0),
            CartLine::new(VariantId::new(2), -4),
        ]);

        let quantities: Vec<_> = cart.iter().map(|entry| entry.quantity).collect();

        assert_eq!(quantities, vec![1, 1]);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let cart = AggregatedCart::from_lines(&[
            CartLine::new(VariantId::new(30), 1),
            CartLine::new(VariantId::new(10), 1),
            CartLine::new(VariantId::new(20), 1),
            CartLine::new(VariantId::new(10), 1),
        ]);

        assert_eq!(
            cart.variant_ids(),
            vec![VariantId::new(30), VariantId::new(10), VariantId::new(20)]
        );
    }

    #[test]
    fn empty_input_yields_empty_cart() {
        let cart = AggregatedCart::from_lines(&[]);

        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
    }
}
