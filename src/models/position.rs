use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

use super::Category;

/// Stock position as reported by the brokerage, counted in shares.
#[derive(Clone, Debug, Eq, Getters, PartialEq, new)]
pub struct Position {
    position_id: i64,
    ticker: String,
    quantity: i64,
    avg_price: Decimal,
    last_price: Decimal,
    unrealized_pnl: Decimal,
    prior_quantity: i64,
    condition: String,
}

impl Position {
    pub fn market_value(&self) -> Decimal {
        self.last_price * Decimal::from(self.quantity)
    }

    pub fn quantity_change(&self) -> i64 {
        self.quantity - self.prior_quantity
    }
}

#[derive(Clone, Debug, Eq, Getters, PartialEq, new)]
pub struct EnrichedPosition {
    position: Position,
    category: Category,
    market_value: Decimal,
    value_share: Decimal,
}

impl EnrichedPosition {
    pub fn ticker(&self) -> &str {
        self.position.ticker()
    }

    pub fn quantity(&self) -> i64 {
        *self.position.quantity()
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        *self.position.unrealized_pnl()
    }

    pub fn quantity_change(&self) -> i64 {
        self.position.quantity_change()
    }
}
