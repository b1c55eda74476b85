use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::{
    api::broker::DEFAULT_BASE_URL,
    app::{
        caption::DEFAULT_DIGEST_DAYS,
        report::{ChartOptions, ReportConfig},
    },
    figure::{ImageFormat, Layout, layout::DEFAULT_LAYOUT, render::default_font_path},
};

#[derive(Debug, Parser)]
#[command(
    name = "portfolio-report",
    about = "Daily stock portfolio report: positions CSV, charts and market caption."
)]
pub struct Cli {
    #[arg(long, env = "SHIOAJI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "SHIOAJI_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Base URL of the brokerage bridge
    #[arg(long, env = "BROKER_API_URL", default_value = DEFAULT_BASE_URL)]
    pub broker_url: String,

    /// Directory for the positions CSV
    #[arg(long, env = "PRIVATE_OUTPUT_DIR", default_value = ".")]
    pub private_output_dir: String,

    /// Directory for charts, captions and the digest
    #[arg(long, env = "PUBLIC_OUTPUT_DIR", default_value = ".")]
    pub public_output_dir: String,

    #[arg(long, env = "REPORT_IMAGE_FORMAT", default_value = "jpg")]
    pub image_format: ImageFormat,

    /// Chart grid, e.g. "position_pie@0,0; loss_bar@0,1+2,1"
    #[arg(long, env = "REPORT_LAYOUT", default_value = DEFAULT_LAYOUT)]
    pub layout: Layout,

    /// TrueType font with CJK glyphs used for chart text
    #[arg(long, env = "REPORT_FONT_PATH")]
    pub font_path: Option<String>,

    /// Number of daily captions in the digest
    #[arg(long, env = "DIGEST_DAYS", default_value_t = DEFAULT_DIGEST_DAYS)]
    pub digest_days: usize,

    /// Also save every chart to its own file
    #[arg(long)]
    pub individual_charts: bool,

    #[arg(long, conflicts_with = "individual_charts")]
    pub no_charts: bool,
}

impl Cli {
    pub fn font_path(&self) -> PathBuf {
        match &self.font_path {
            Some(path) => expand_path(path),
            None => PathBuf::from(default_font_path()),
        }
    }

    pub fn report_config(&self, today: NaiveDate) -> ReportConfig {
        let mut config = ReportConfig::new(&self.api_key, &self.secret_key, today);
        config.private_dir = expand_path(&self.private_output_dir);
        config.public_dir = expand_path(&self.public_output_dir);
        config.digest_days = self.digest_days;
        config.charts = (!self.no_charts).then(|| ChartOptions {
            layout: self.layout.clone(),
            format: self.image_format,
            individual: self.individual_charts,
        });
        config
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
