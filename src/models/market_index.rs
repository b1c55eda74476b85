use rust_decimal::Decimal;

const VALUE: &str = "指數";
const CHANGE: &str = "漲跌";
const CHANGE_PERCENT: &str = "漲跌比例";
const YEAR_TO_DATE: &str = "今年表現";

/// Header → value pairs of a market index quote, in page order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MarketIndex {
    fields: Vec<(String, String)>,
}

impl MarketIndex {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn value(&self) -> Option<Decimal> {
        self.get(VALUE).and_then(parse_number)
    }

    pub fn change(&self) -> Option<Decimal> {
        self.get(CHANGE).and_then(parse_number)
    }

    pub fn raw_value(&self) -> Option<&str> {
        self.get(VALUE)
    }

    pub fn raw_change(&self) -> Option<&str> {
        self.get(CHANGE)
    }

    pub fn change_percent(&self) -> Option<&str> {
        self.get(CHANGE_PERCENT)
    }

    pub fn year_to_date(&self) -> Option<&str> {
        self.get(YEAR_TO_DATE)
    }
}

fn parse_number(raw: &str) -> Option<Decimal> {
    raw.trim().replace(',', "").parse::<Decimal>().ok()
}
