use std::collections::BTreeMap;

use derive_getters::Getters;
use rust_decimal::Decimal;

use crate::models::{Category, EnrichedPosition};

/// Per-category sums over the enriched table.
#[derive(Clone, Debug, Eq, Getters, PartialEq)]
pub struct CategoryTotal {
    category: Category,
    market_value: Decimal,
    value_share: Decimal,
    quantity: i64,
    pnl: Decimal,
}

impl CategoryTotal {
    fn empty(category: Category) -> Self {
        Self {
            category,
            market_value: Decimal::ZERO,
            value_share: Decimal::ZERO,
            quantity: 0,
            pnl: Decimal::ZERO,
        }
    }
}

/// One entry per category present, in category order.
pub fn group_by_category(positions: &[EnrichedPosition]) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<Category, CategoryTotal> = BTreeMap::new();

    for position in positions {
        let category = *position.category();
        let group = groups
            .entry(category)
            .or_insert_with(|| CategoryTotal::empty(category));
        group.market_value += *position.market_value();
        group.value_share += *position.value_share();
        group.quantity += position.quantity();
        group.pnl += position.unrealized_pnl();
    }

    groups.into_values().collect()
}

/// Largest holding by market value of each category, in category order.
/// Ties keep the earlier position.
pub fn max_holdings(positions: &[EnrichedPosition]) -> Vec<&EnrichedPosition> {
    let mut largest: BTreeMap<Category, &EnrichedPosition> = BTreeMap::new();

    for position in positions {
        largest
            .entry(*position.category())
            .and_modify(|current| {
                if position.market_value() > current.market_value() {
                    *current = position;
                }
            })
            .or_insert(position);
    }

    largest.into_values().collect()
}

/// Positions whose share count moved since yesterday, largest move first,
/// at most `limit` of them.
pub fn daily_changes(positions: &[EnrichedPosition], limit: usize) -> Vec<(&EnrichedPosition, i64)> {
    let mut changes: Vec<_> = positions
        .iter()
        .map(|p| (p, p.quantity_change()))
        .filter(|(_, change)| *change != 0)
        .collect();

    changes.sort_by_key(|(_, change)| std::cmp::Reverse(change.unsigned_abs()));
    changes.truncate(limit);
    changes
}
