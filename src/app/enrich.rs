use rust_decimal::Decimal;

use crate::{
    app::classifier::EtfClassifier,
    models::{EnrichedPosition, Position},
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Attaches category, market value and share of the portfolio value to each
/// position, keeping input order. With a zero total every share is zero.
pub fn enrich(positions: &[Position], classifier: &EtfClassifier) -> Vec<EnrichedPosition> {
    let total: Decimal = positions.iter().map(Position::market_value).sum();

    positions
        .iter()
        .map(|position| {
            let market_value = position.market_value();
            let value_share = if total.is_zero() {
                Decimal::ZERO
            } else {
                market_value / total * HUNDRED
            };

            EnrichedPosition::new(
                position.clone(),
                classifier.classify(position.ticker()),
                market_value,
                value_share,
            )
        })
        .collect()
}

pub fn total_market_value(positions: &[EnrichedPosition]) -> Decimal {
    positions.iter().map(|p| *p.market_value()).sum()
}
