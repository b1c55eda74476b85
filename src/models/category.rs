use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Holding category as labelled by stockq.org. Everything not listed in one
/// of the ETF pages is an individual stock.
#[derive(
    AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub enum Category {
    #[strum(serialize = "高股息ETF")]
    HighDividend,
    #[strum(serialize = "市值型/指數型ETF")]
    MarketCap,
    #[strum(serialize = "槓桿型ETF")]
    Leveraged,
    #[strum(serialize = "債券ETF")]
    Bond,
    #[strum(serialize = "個股")]
    IndividualStock,
}

impl Category {
    /// ETF categories in lookup order. A ticker listed under several
    /// categories resolves to the first one here.
    pub const PRECEDENCE: [Category; 4] = [
        Category::HighDividend,
        Category::Leveraged,
        Category::Bond,
        Category::MarketCap,
    ];

    pub fn is_etf(&self) -> bool {
        *self != Category::IndividualStock
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryMap {
    tickers: BTreeMap<Category, BTreeSet<String>>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, ticker: impl Into<String>) {
        if !category.is_etf() {
            return;
        }
        self.tickers
            .entry(category)
            .or_default()
            .insert(ticker.into());
    }

    pub fn extend<I, T>(&mut self, category: Category, tickers: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for ticker in tickers {
            self.insert(category, ticker);
        }
    }

    pub fn tickers(&self, category: Category) -> impl Iterator<Item = &str> {
        self.tickers
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn contains(&self, category: Category, ticker: &str) -> bool {
        self.tickers
            .get(&category)
            .is_some_and(|set| set.contains(ticker))
    }

    pub fn len(&self) -> usize {
        self.tickers.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaves every ticker only in its highest-precedence category. The
    /// "台灣ETF" listing also contains dividend, leveraged and bond funds.
    pub fn resolve_overlaps(&mut self) {
        let mut claimed = BTreeSet::new();
        for category in Category::PRECEDENCE {
            if let Some(set) = self.tickers.get_mut(&category) {
                set.retain(|ticker| !claimed.contains(ticker));
                claimed.extend(set.iter().cloned());
            }
        }
    }

    pub fn lookup(&self, ticker: &str) -> Category {
        Category::PRECEDENCE
            .into_iter()
            .find(|category| self.contains(*category, ticker))
            .unwrap_or(Category::IndividualStock)
    }
}
