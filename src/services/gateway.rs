use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{AccountBalance, LossSummary, Position, Settlement};

/// Brokerage account access used by a report run.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn login(&mut self, api_key: &str, secret_key: &str) -> Result<()>;

    async fn account_balance(&self) -> Result<AccountBalance>;

    async fn list_positions(&self) -> Result<Vec<Position>>;

    /// `None` when the brokerage has no realized trades in the range.
    async fn profit_loss_summary(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<LossSummary>>;

    async fn settlements(&self) -> Result<Vec<Settlement>>;

    async fn logout(&mut self) -> Result<()>;
}
