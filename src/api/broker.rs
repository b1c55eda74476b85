use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::{
    broker_dto::{
        AccountBalanceDto, LoginDto, ProfitLossSummaryDto, SettlementDto, StockPositionDto,
    },
    utils::{make_request, parse_response_array, parse_response_object, post_request},
};
use crate::{
    error::ReportError,
    models::{AccountBalance, LossSummary, Position, Settlement},
    services::AccountGateway,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Client for the HTTP bridge in front of the brokerage SDK.
#[derive(Clone, Debug)]
pub struct BrokerApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Default for BrokerApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BrokerApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| ReportError::Authentication("not logged in".to_string()).into())
    }

    async fn get(&self, endpoint: &str) -> Result<serde_json::Value> {
        make_request(&self.client, &self.base_url, endpoint, self.token()?).await
    }
}

#[async_trait]
impl AccountGateway for BrokerApi {
    async fn login(&mut self, api_key: &str, secret_key: &str) -> Result<()> {
        let body = json!({ "api_key": api_key, "secret_key": secret_key });
        let res = post_request(&self.client, &self.base_url, "login", None, &body)
            .await
            .map_err(|e| ReportError::Authentication(format!("{:#}", e)))?;

        let login = parse_response_object::<LoginDto>(res, "Failed to parse login response")
            .map_err(|e| ReportError::Authentication(format!("{:#}", e)))?;

        debug!("Logged in to {}", self.base_url);
        self.token = Some(login.token().clone());
        Ok(())
    }

    async fn account_balance(&self) -> Result<AccountBalance> {
        let res = self.get("account_balance").await?;
        parse_response_object::<AccountBalanceDto>(res, "Failed to parse account balance")?
            .to_balance()
    }

    async fn list_positions(&self) -> Result<Vec<Position>> {
        let res = self.get("positions?unit=share").await?;
        let positions =
            parse_response_array::<StockPositionDto>(res, "Failed to parse stock position")?;
        Ok(positions.iter().map(StockPositionDto::to_position).collect())
    }

    async fn profit_loss_summary(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<LossSummary>> {
        let endpoint = format!(
            "profit_loss_summary?begin_date={}&end_date={}",
            begin.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        let res = self.get(&endpoint).await?;
        let summary = parse_response_object::<ProfitLossSummaryDto>(
            res,
            &format!("Failed to parse profit/loss summary {} ~ {}", begin, end),
        )?;
        Ok(summary.total().as_ref().map(|t| t.to_loss_summary()))
    }

    async fn settlements(&self) -> Result<Vec<Settlement>> {
        let res = self.get("settlements").await?;
        parse_response_array::<SettlementDto>(res, "Failed to parse settlement")?
            .iter()
            .map(SettlementDto::to_settlement)
            .collect()
    }

    async fn logout(&mut self) -> Result<()> {
        let Some(token) = self.token.take() else {
            return Ok(());
        };
        post_request(
            &self.client,
            &self.base_url,
            "logout",
            Some(&token),
            &json!({}),
        )
        .await
        .context("Failed to log out")?;
        Ok(())
    }
}
