use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    app::calc::{FIRST_YEAR, loss_report, year_range},
    models::{Category, EnrichedPosition, LossReport, Settlement},
    services::AccountGateway,
};

#[derive(Debug, Serialize)]
struct PositionRecord<'a> {
    position_id: i64,
    ticker: &'a str,
    quantity: i64,
    avg_price: Decimal,
    last_price: Decimal,
    unrealized_pnl: Decimal,
    prior_quantity: i64,
    condition: &'a str,
    category: Category,
    market_value: Decimal,
    value_share: Decimal,
}

impl<'a> From<&'a EnrichedPosition> for PositionRecord<'a> {
    fn from(enriched: &'a EnrichedPosition) -> Self {
        let position = enriched.position();
        Self {
            position_id: *position.position_id(),
            ticker: position.ticker(),
            quantity: *position.quantity(),
            avg_price: *position.avg_price(),
            last_price: *position.last_price(),
            unrealized_pnl: *position.unrealized_pnl(),
            prior_quantity: *position.prior_quantity(),
            condition: position.condition(),
            category: *enriched.category(),
            market_value: *enriched.market_value(),
            value_share: enriched.value_share().round_dp(4),
        }
    }
}

pub fn positions_csv_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_positions.csv", date.format("%Y%m%d")))
}

pub fn write_positions_csv(positions: &[EnrichedPosition], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file at path: {}", path.display()))?;

    for (row_idx, position) in positions.iter().enumerate() {
        writer
            .serialize(PositionRecord::from(position))
            .with_context(|| format!("Failed to write CSV record at row {}", row_idx + 1))?;
    }
    writer.flush()?;

    Ok(())
}

/// Realized P&L for every year from the first trading year to `this_year`.
/// Years the brokerage reports nothing for are left out.
pub async fn fetch_loss_report<G: AccountGateway + ?Sized>(
    gateway: &G,
    this_year: i32,
) -> Result<LossReport> {
    let mut years = BTreeMap::new();

    for year in FIRST_YEAR..=this_year {
        let Some((begin, end)) = year_range(year) else {
            continue;
        };
        let summary = gateway
            .profit_loss_summary(begin, end)
            .await
            .with_context(|| format!("Failed to get profit/loss summary for {}", year))?;

        match summary {
            Some(summary) => {
                years.insert(year, summary);
            }
            None => debug!("No realized profit/loss in {}", year),
        }
    }

    Ok(loss_report(years))
}

pub fn settlement_table(settlements: &[Settlement]) -> String {
    let mut table = format!("{:>3}  {:<10}  {:>12}\n", "T", "date", "amount");
    for s in settlements {
        let _ = writeln!(
            table,
            "{:>3}  {:<10}  {:>12}",
            s.t(),
            s.date().to_string(),
            s.amount().to_string()
        );
    }
    table
}
