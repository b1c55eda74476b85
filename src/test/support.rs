use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    api::stockq::{ETF_INDEX_URL, ROOT_URL, TAIEX_URL},
    error::ReportError,
    models::{AccountBalance, LossSummary, Position, Settlement},
    services::{AccountGateway, PageFetcher},
};

/// Serves canned pages by URL; anything else is a 404.
#[derive(Clone, Debug, Default)]
pub struct MapFetcher {
    pages: HashMap<String, String>,
}

impl MapFetcher {
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    pub fn without(mut self, url: &str) -> Self {
        self.pages.remove(url);
        self
    }

    /// ETF index, every category listing and a TAIEX quote.
    pub fn stockq() -> Self {
        let mut fetcher = Self::default()
            .with(ETF_INDEX_URL, etf_index_page())
            .with(TAIEX_URL, taiex_page("17,000.50", "-120.25", "-0.70%", "12.3%"));
        for (path, tickers) in LISTINGS {
            fetcher = fetcher.with(format!("{}{}", ROOT_URL, path), listing_page(tickers));
        }
        fetcher
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or_else(|| {
            ReportError::RequestFailed {
                url: url.to_string(),
                status: 404,
            }
            .into()
        })
    }
}

pub const LISTINGS: [(&str, &[&str]); 7] = [
    ("/etf/dividend.php", &["0056", "00878"]),
    ("/etf/taiwan.php", &["0050", "0056", "00631L", "006208", "00679B"]),
    ("/etf/leveraged.php", &["00631L"]),
    ("/etf/treasury.php", &["00679B"]),
    ("/etf/investment_grade.php", &["00720B"]),
    ("/etf/high_yield.php", &[]),
    ("/etf/emerging.php", &["00751B"]),
];

pub fn etf_index_page() -> String {
    let anchors = [
        ("/etf/dividend.php", "高股息ETF"),
        ("/etf/taiwan.php", "台灣ETF"),
        ("/etf/leveraged.php", "正2反1 槓桿型ETF"),
        ("/etf/treasury.php", "美國政府長期公債ETF"),
        ("/etf/investment_grade.php", "投資級公司債ETF"),
        ("/etf/high_yield.php", "非投資等級公司債ETF"),
        ("/etf/emerging.php", "新興市場債ETF"),
    ]
    .iter()
    .map(|(href, title)| format!(r#"<li><a href="{}" title="{}">{}</a></li>"#, href, title, title))
    .collect::<String>();

    format!(
        r#"<html><body><a href="/index/TWSE.php" title="台股">台股</a><ul>{}</ul></body></html>"#,
        anchors
    )
}

/// A `matrix` table with a header row and a `<font>` section row ahead of
/// the members.
pub fn listing_page(tickers: &[&str]) -> String {
    let rows = tickers
        .iter()
        .map(|t| format!(r#"<tr><td><a href="/etf/{0}.php">{0}</a></td><td>fund</td></tr>"#, t))
        .collect::<String>();

    format!(
        r#"<html><body><table id="matrix">
<tr><th>代號</th><th>名稱</th></tr>
<tr><td><font color="red">國內成分</font></td><td></td></tr>
{}
</table></body></html>"#,
        rows
    )
}

pub fn taiex_page(value: &str, change: &str, percent: &str, ytd: &str) -> String {
    format!(
        r#"<html><body><table class="indexpagetable">
<tr><td>指數</td><td>漲跌</td><td>漲跌比例</td><td>今年表現</td></tr>
<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>
</table></body></html>"#,
        value, change, percent, ytd
    )
}

pub fn position(id: i64, ticker: &str, quantity: i64, last_price: Decimal) -> Position {
    Position::new(
        id,
        ticker.to_string(),
        quantity,
        last_price,
        last_price,
        Decimal::ZERO,
        quantity,
        "Cash".to_string(),
    )
}

#[derive(Debug, Default)]
pub struct FakeGateway {
    pub positions: Vec<Position>,
    pub summaries: BTreeMap<i32, LossSummary>,
    pub settlements: Vec<Settlement>,
    pub fail_login: bool,
    pub fail_positions: bool,
    pub logged_in: bool,
    pub logouts: usize,
}

#[async_trait]
impl AccountGateway for FakeGateway {
    async fn login(&mut self, _api_key: &str, _secret_key: &str) -> Result<()> {
        if self.fail_login {
            return Err(ReportError::Authentication("bad credentials".to_string()).into());
        }
        self.logged_in = true;
        Ok(())
    }

    async fn account_balance(&self) -> Result<AccountBalance> {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).ok_or_else(|| anyhow!("bad date"))?;
        Ok(AccountBalance::new(Decimal::from(250_000), date))
    }

    async fn list_positions(&self) -> Result<Vec<Position>> {
        if self.fail_positions {
            return Err(anyhow!("positions unavailable"));
        }
        Ok(self.positions.clone())
    }

    async fn profit_loss_summary(
        &self,
        begin: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Option<LossSummary>> {
        Ok(self.summaries.get(&begin.year()).copied())
    }

    async fn settlements(&self) -> Result<Vec<Settlement>> {
        Ok(self.settlements.clone())
    }

    async fn logout(&mut self) -> Result<()> {
        self.logouts += 1;
        self.logged_in = false;
        Ok(())
    }
}

/// A request as seen by `FakeBridge`.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeRequest {
    pub method: String,
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Brokerage bridge on a local port. Answers `"METHOD /path?query"` routes
/// with canned JSON and everything else with a 404.
pub struct FakeBridge {
    pub base_url: String,
    requests: Arc<Mutex<Vec<BridgeRequest>>>,
}

impl FakeBridge {
    pub async fn start(routes: &[(&str, &str)]) -> Self {
        let routes: Arc<HashMap<String, String>> = Arc::new(
            routes
                .iter()
                .map(|(route, body)| (route.to_string(), body.to_string()))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &recorded).await;
                });
            }
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> Vec<BridgeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &HashMap<String, String>,
    recorded: &Mutex<Vec<BridgeRequest>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let mut authorization = None;
    let mut content_length = 0;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "authorization" => authorization = Some(value.trim().to_string()),
            "content-length" => content_length = value.trim().parse().unwrap_or(0),
            _ => {}
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let route = format!("{} {}", method, target);
    recorded.lock().unwrap().push(BridgeRequest {
        method,
        target,
        authorization,
        body,
    });

    let (status, payload) = match routes.get(&route) {
        Some(payload) => ("200 OK", payload.as_str()),
        None => ("404 Not Found", r#"{"detail":"not found"}"#),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
