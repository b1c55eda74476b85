use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{AccountBalance, LossSummary, Position, Settlement};

#[derive(Debug, Deserialize, Getters, new)]
pub struct LoginDto {
    token: String,
}

const BALANCE_FETCHED: &str = "Fetched";

#[derive(Debug, Deserialize, Getters, new)]
pub struct AccountBalanceDto {
    status: Option<String>,
    acc_balance: Decimal,
    /// e.g. "2024-05-17 13:30:00.000000"
    date: String,
    errmsg: Option<String>,
}

impl AccountBalanceDto {
    /// Fails unless the brokerage finished fetching the balance.
    pub fn to_balance(&self) -> Result<AccountBalance> {
        if let Some(errmsg) = self.errmsg.as_deref().filter(|m| !m.trim().is_empty()) {
            return Err(anyhow!("Account balance unavailable: {}", errmsg));
        }
        if let Some(status) = self.status.as_deref().filter(|s| *s != BALANCE_FETCHED) {
            return Err(anyhow!("Account balance not fetched (status {})", status));
        }
        Ok(AccountBalance::new(self.acc_balance, parse_date(&self.date)?))
    }
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct StockPositionDto {
    id: i64,
    code: String,
    quantity: i64,
    price: Decimal,
    last_price: Decimal,
    pnl: Decimal,
    yd_quantity: i64,
    cond: String,
}

impl StockPositionDto {
    pub fn to_position(&self) -> Position {
        Position::new(
            self.id,
            self.code.clone(),
            self.quantity,
            self.price,
            self.last_price,
            self.pnl,
            self.yd_quantity,
            self.cond.clone(),
        )
    }
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct ProfitLossSummaryDto {
    total: Option<ProfitLossTotalDto>,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct ProfitLossTotalDto {
    quantity: i64,
    buy_cost: Decimal,
    sell_cost: Decimal,
    pnl: Decimal,
}

impl ProfitLossTotalDto {
    pub fn to_loss_summary(&self) -> LossSummary {
        LossSummary::new(self.quantity, self.buy_cost, self.sell_cost, self.pnl)
    }
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct SettlementDto {
    date: String,
    amount: Decimal,
    #[serde(rename = "T")]
    t: i32,
}

impl SettlementDto {
    pub fn to_settlement(&self) -> Result<Settlement> {
        Ok(Settlement::new(parse_date(&self.date)?, self.amount, self.t))
    }
}

fn parse_date(field: &str) -> Result<NaiveDate> {
    let day = field.get(..10).unwrap_or(field);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date '{}'", field))
}
