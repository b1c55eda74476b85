use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{LossReport, LossSummary};

/// First year the account has trading history.
pub const FIRST_YEAR: i32 = 2019;

/// Sums the yearly summaries and derives the overall profit ratio.
pub fn loss_report(years: BTreeMap<i32, LossSummary>) -> LossReport {
    let mut total = LossSummary::default();
    for summary in years.values() {
        total += *summary;
    }

    let pr_ratio = profit_ratio(*total.pnl(), *total.buy_cost());
    LossReport::new(years, total, pr_ratio)
}

/// `pnl / buy_cost` in percent, rounded to two places. Zero without cost.
pub fn profit_ratio(pnl: Decimal, buy_cost: Decimal) -> Decimal {
    if buy_cost.is_zero() {
        return Decimal::ZERO;
    }
    (pnl / buy_cost * Decimal::ONE_HUNDRED).round_dp(2)
}

pub fn year_range(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}
