use anyhow::{Result, anyhow};
use scraper::{Html, Selector};
use tracing::warn;

use crate::{
    error::ReportError,
    models::{Category, MarketIndex},
    services::PageFetcher,
};

pub const ROOT_URL: &str = "https://www.stockq.org";
pub const ETF_INDEX_URL: &str = "https://www.stockq.org/etf";
pub const TAIEX_URL: &str = "https://www.stockq.org/index/TWSE.php";

/// Anchor titles on the ETF index page that lead to each category listing.
pub const CATEGORY_PAGES: [(Category, &[&str]); 4] = [
    (Category::HighDividend, &["高股息ETF"]),
    (Category::MarketCap, &["台灣ETF"]),
    (Category::Leveraged, &["正2反1 槓桿型ETF"]),
    (
        Category::Bond,
        &[
            "美國政府長期公債ETF",
            "投資級公司債ETF",
            "非投資等級公司債ETF",
            "新興市場債ETF",
        ],
    ),
];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {:?}", css, e))
}

/// Absolute listing URL of the anchor with the given `title`.
pub fn find_category_url(index_page: &Html, root_url: &str, title: &str) -> Result<String> {
    let anchors = selector("a[title]")?;

    let href = index_page
        .select(&anchors)
        .find(|a| a.value().attr("title") == Some(title))
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| ReportError::MissingCategoryAnchor(title.to_string()))?;

    Ok(format!("{}{}", root_url.trim_end_matches('/'), href))
}

/// Ticker symbols listed in the `matrix` tables of a category page.
///
/// The first cell of a member row holds the symbol. Rows whose first cell
/// wraps its content in `<font>` are section markers, not funds.
pub fn parse_listing(body: &str) -> Result<Vec<String>> {
    let page = Html::parse_document(body);
    let tables = selector("table#matrix")?;
    let rows = selector("tr")?;
    let cells = selector("td")?;
    let font = selector("font")?;

    let mut tickers = Vec::new();
    for table in page.select(&tables) {
        for row in table.select(&rows) {
            let Some(cell) = row.select(&cells).next() else {
                continue;
            };
            if cell.select(&font).next().is_some() {
                continue;
            }
            if let Some(ticker) = cell.text().map(str::trim).find(|t| !t.is_empty()) {
                tickers.push(ticker.to_string());
            }
        }
    }

    Ok(tickers)
}

pub fn parse_market_index(url: &str, body: &str) -> Result<MarketIndex> {
    let page = Html::parse_document(body);
    let table_sel = selector("table.indexpagetable")?;
    let rows_sel = selector("tr")?;
    let cells_sel = selector("td")?;

    let table = page
        .select(&table_sel)
        .next()
        .ok_or_else(|| ReportError::UnexpectedPage {
            url: url.to_string(),
            reason: "no indexpagetable".to_string(),
        })?;

    let rows: Vec<_> = table.select(&rows_sel).collect();
    if rows.len() != 2 {
        return Err(ReportError::UnexpectedPage {
            url: url.to_string(),
            reason: format!("expected 2 rows, found {}", rows.len()),
        }
        .into());
    }

    let cell_texts = |row: &scraper::ElementRef| -> Vec<String> {
        row.select(&cells_sel)
            .map(|td| td.text().collect::<String>().trim().to_string())
            .collect()
    };

    let titles = cell_texts(&rows[0]);
    let values = cell_texts(&rows[1]);

    Ok(MarketIndex::new(titles.into_iter().zip(values)))
}

/// Current TAIEX quote. Failures are logged and yield `None` so the caller
/// can skip the caption without aborting the report.
pub async fn fetch_taiex<F: PageFetcher + ?Sized>(fetcher: &F) -> Option<MarketIndex> {
    fetch_market_index(fetcher, TAIEX_URL).await
}

pub async fn fetch_market_index<F: PageFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Option<MarketIndex> {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to get market index from {}: {:#}", url, e);
            return None;
        }
    };

    match parse_market_index(url, &body) {
        Ok(index) => Some(index),
        Err(e) => {
            warn!("Failed to get market index from {}: {:#}", url, e);
            None
        }
    }
}
