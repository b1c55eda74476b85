use std::collections::BTreeMap;
use std::ops::AddAssign;

use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

/// Realized profit and loss over a date range.
#[derive(Clone, Copy, Debug, Default, Eq, Getters, PartialEq, new)]
pub struct LossSummary {
    quantity: i64,
    buy_cost: Decimal,
    sell_cost: Decimal,
    pnl: Decimal,
}

impl AddAssign for LossSummary {
    fn add_assign(&mut self, other: Self) {
        self.quantity += other.quantity;
        self.buy_cost += other.buy_cost;
        self.sell_cost += other.sell_cost;
        self.pnl += other.pnl;
    }
}

#[derive(Clone, Debug, Eq, Getters, PartialEq, new)]
pub struct LossReport {
    years: BTreeMap<i32, LossSummary>,
    total: LossSummary,
    pr_ratio: Decimal,
}

impl LossReport {
    pub fn first_year(&self) -> Option<i32> {
        self.years.keys().next().copied()
    }
}
