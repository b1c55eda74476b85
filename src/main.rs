use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use dotenv::dotenv;
use portfolio_report::{
    api::broker::BrokerApi,
    app::run,
    config::Cli,
    figure::render::load_font,
    services::HttpFetcher,
};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.report_config(Local::now().date_naive());

    if config.charts.is_some() {
        if let Err(e) = load_font(&cli.font_path()) {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    }

    let mut broker = BrokerApi::new(&cli.broker_url);
    let fetcher = HttpFetcher::default();

    match run(&mut broker, &fetcher, &config).await {
        Ok(output) => {
            info!("Report for {} complete", config.today);
            if output.caption.is_none() {
                info!("No market caption today");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
