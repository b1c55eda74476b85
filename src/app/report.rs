use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use crate::{
    api::stockq,
    app::{
        caption::{self, DEFAULT_DIGEST_DAYS},
        classifier::{CategorySource, EtfClassifier},
        enrich::enrich,
        portfolio,
    },
    figure::{ImageFormat, Layout, PositionFigure},
    models::EnrichedPosition,
    services::{AccountGateway, PageFetcher},
};

#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub layout: Layout,
    pub format: ImageFormat,
    /// Also save each chart to its own file.
    pub individual: bool,
}

#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub api_key: String,
    pub secret_key: String,
    pub today: NaiveDate,
    pub private_dir: PathBuf,
    pub public_dir: PathBuf,
    pub category_source: CategorySource,
    pub index_url: String,
    /// `None` skips chart rendering.
    pub charts: Option<ChartOptions>,
    pub digest_days: usize,
}

impl ReportConfig {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            today,
            private_dir: PathBuf::from("."),
            public_dir: PathBuf::from("."),
            category_source: CategorySource::default(),
            index_url: stockq::TAIEX_URL.to_string(),
            charts: Some(ChartOptions {
                layout: Layout::default(),
                format: ImageFormat::default(),
                individual: false,
            }),
            digest_days: DEFAULT_DIGEST_DAYS,
        }
    }
}

/// Files written by a report run.
#[derive(Clone, Debug, Default)]
pub struct ReportOutput {
    pub positions_csv: PathBuf,
    pub charts: Vec<PathBuf>,
    pub caption: Option<PathBuf>,
    pub digest: PathBuf,
}

/// Runs the daily report. Logout is attempted whether or not any step fails.
pub async fn run<G, F>(gateway: &mut G, fetcher: &F, config: &ReportConfig) -> Result<ReportOutput>
where
    G: AccountGateway + ?Sized,
    F: PageFetcher + ?Sized,
{
    if let Err(e) = gateway.login(&config.api_key, &config.secret_key).await {
        logout(gateway).await;
        return Err(e.context("Failed to log in to the brokerage"));
    }
    info!("Logged in");

    let result = generate(&*gateway, fetcher, config).await;
    logout(gateway).await;
    result
}

async fn logout<G: AccountGateway + ?Sized>(gateway: &mut G) {
    match gateway.logout().await {
        Ok(()) => info!("Logged out"),
        Err(e) => warn!("Failed to log out: {:#}", e),
    }
}

async fn generate<G, F>(gateway: &G, fetcher: &F, config: &ReportConfig) -> Result<ReportOutput>
where
    G: AccountGateway + ?Sized,
    F: PageFetcher + ?Sized,
{
    for dir in [&config.private_dir, &config.public_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let balance = gateway
        .account_balance()
        .await
        .context("Failed to get account balance")?;
    info!(
        "查詢目前 ({}) 銀行帳戶餘額為新台幣 {}",
        balance.date(),
        balance.balance()
    );

    let positions = gateway
        .list_positions()
        .await
        .context("Failed to get positions")?;
    info!("Fetched {} positions", positions.len());

    let classifier = EtfClassifier::build(fetcher, &config.category_source).await?;
    let enriched = enrich(&positions, &classifier);

    let positions_csv = portfolio::positions_csv_path(&config.private_dir, config.today);
    portfolio::write_positions_csv(&enriched, &positions_csv)?;
    info!("Wrote positions to {}", positions_csv.display());

    let loss = portfolio::fetch_loss_report(gateway, config.today.year()).await?;
    match loss.first_year() {
        Some(first_year) => info!(
            "統計{}年至今的已實現損益為{} ({}%)",
            first_year,
            loss.total().pnl(),
            loss.pr_ratio()
        ),
        None => info!("No realized profit/loss on record"),
    }

    let settlements = gateway
        .settlements()
        .await
        .context("Failed to get settlements")?;
    info!("交割資訊:\n{}", portfolio::settlement_table(&settlements));

    let charts = match &config.charts {
        Some(options) => render_charts(&enriched, options, &config.public_dir, config.today)?,
        None => Vec::new(),
    };

    let caption = match stockq::fetch_market_index(fetcher, &config.index_url)
        .await
        .and_then(|index| caption::caption_text(config.today, &index))
    {
        Some(text) => {
            info!("{}", text);
            Some(caption::write_caption(&config.public_dir, config.today, &text)?)
        }
        None => {
            warn!("Skipping today's market caption");
            None
        }
    };

    let digest = caption::write_digest(&config.public_dir, config.today, config.digest_days)?;
    info!("Wrote caption digest to {}", digest.display());

    Ok(ReportOutput {
        positions_csv,
        charts,
        caption,
        digest,
    })
}

fn render_charts(
    positions: &[EnrichedPosition],
    options: &ChartOptions,
    public_dir: &Path,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let stamp = today.format("%Y%m%d");
    let figure = PositionFigure::new(positions);

    let combined = public_dir.join(format!(
        "{}_stock_positions.{}",
        stamp,
        options.format.extension()
    ));
    figure.render_combined(&options.layout, &combined, options.format)?;

    let mut paths = vec![combined];
    if options.individual {
        let dir = public_dir.join(format!("{}_stock_positions", stamp));
        paths.extend(figure.render_individual(&options.layout, &dir, options.format)?);
    }
    Ok(paths)
}
