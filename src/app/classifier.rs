use std::time::Duration;

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, info};

use crate::{
    api::stockq::{self, CATEGORY_PAGES},
    models::{Category, CategoryMap},
    services::PageFetcher,
};

/// Where category listings are scraped from.
#[derive(Clone, Debug)]
pub struct CategorySource {
    pub index_url: String,
    pub root_url: String,
    /// Pause before each listing request.
    pub delay: Duration,
}

impl Default for CategorySource {
    fn default() -> Self {
        Self {
            index_url: stockq::ETF_INDEX_URL.to_string(),
            root_url: stockq::ROOT_URL.to_string(),
            delay: Duration::from_millis(300),
        }
    }
}

/// Maps tickers to ETF categories. Built once per run and never mutated.
#[derive(Clone, Debug, Default)]
pub struct EtfClassifier {
    categories: CategoryMap,
}

impl EtfClassifier {
    pub fn from_map(mut categories: CategoryMap) -> Self {
        categories.resolve_overlaps();
        Self { categories }
    }

    /// Scrapes every category listing. Any failed request or missing anchor
    /// fails the whole build; a partial map is never returned.
    pub async fn build<F: PageFetcher + ?Sized>(
        fetcher: &F,
        source: &CategorySource,
    ) -> Result<Self> {
        let index_body = fetcher
            .fetch(&source.index_url)
            .await
            .context("Failed to get ETF index from stockq.org")?;

        let listing_urls = resolve_listing_urls(&index_body, &source.root_url)?;

        let mut categories = CategoryMap::new();
        for (category, url) in listing_urls {
            tokio::time::sleep(source.delay).await;

            let body = fetcher
                .fetch(&url)
                .await
                .with_context(|| format!("Failed to get {} listing", category))?;
            let tickers = stockq::parse_listing(&body)?;

            debug!("{}: {} tickers from {}", category, tickers.len(), url);
            categories.extend(category, tickers);
        }

        let classifier = Self::from_map(categories);
        info!(
            "Classified {} ETFs into {} categories",
            classifier.categories.len(),
            Category::PRECEDENCE.len()
        );
        Ok(classifier)
    }

    pub fn classify(&self, ticker: &str) -> Category {
        self.categories.lookup(ticker)
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }
}

fn resolve_listing_urls(index_body: &str, root_url: &str) -> Result<Vec<(Category, String)>> {
    let page = Html::parse_document(index_body);

    let mut urls = Vec::new();
    for (category, titles) in CATEGORY_PAGES {
        for title in titles {
            urls.push((category, stockq::find_category_url(&page, root_url, title)?));
        }
    }
    Ok(urls)
}
