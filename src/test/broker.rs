#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use reqwest::Client;
    use rust_decimal_macros::dec;

    use crate::{
        api::broker::BrokerApi,
        error::ReportError,
        services::AccountGateway,
        test::support::FakeBridge,
    };

    const LOGIN: (&str, &str) = ("POST /login", r#"{"token":"tok-1"}"#);
    const LOGOUT: (&str, &str) = ("POST /logout", "{}");

    fn broker(bridge: &FakeBridge) -> BrokerApi {
        let client = Client::builder().no_proxy().build().unwrap();
        BrokerApi::with_client(&bridge.base_url, client)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn is_auth_error(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::Authentication(_))
        )
    }

    #[tokio::test]
    async fn it_logs_in_and_out_with_a_token() {
        let bridge = FakeBridge::start(&[
            LOGIN,
            LOGOUT,
            (
                "GET /account_balance",
                r#"{"status":"Fetched","acc_balance":250000.0,"date":"2024-05-17 13:30:00.000000","errmsg":""}"#,
            ),
        ])
        .await;
        let mut broker = broker(&bridge);

        broker.login("key", "secret").await.unwrap();
        let balance = broker.account_balance().await.unwrap();
        broker.logout().await.unwrap();

        assert_eq!(*balance.balance(), dec!(250000));
        assert_eq!(*balance.date(), date(2024, 5, 17));

        let requests = bridge.requests();
        let targets: Vec<String> = requests
            .iter()
            .map(|r| format!("{} {}", r.method, r.target))
            .collect();
        assert_eq!(
            targets,
            vec!["POST /login", "GET /account_balance", "POST /logout"]
        );

        let login: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(login["api_key"], "key");
        assert_eq!(login["secret_key"], "secret");
        assert_eq!(requests[0].authorization, None);
        assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok-1"));
        assert_eq!(requests[2].authorization.as_deref(), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn it_forgets_the_token_after_logout() {
        let bridge = FakeBridge::start(&[LOGIN, LOGOUT]).await;
        let mut broker = broker(&bridge);

        broker.login("key", "secret").await.unwrap();
        broker.logout().await.unwrap();
        broker.logout().await.unwrap();

        let err = broker.settlements().await.unwrap_err();
        assert!(is_auth_error(&err));
        assert_eq!(bridge.requests().len(), 2);
    }

    #[tokio::test]
    async fn it_refuses_requests_before_login() {
        let bridge = FakeBridge::start(&[LOGIN]).await;
        let mut broker = broker(&bridge);

        let err = broker.list_positions().await.unwrap_err();
        assert!(is_auth_error(&err));

        broker.logout().await.unwrap();
        assert!(bridge.requests().is_empty());
    }

    #[tokio::test]
    async fn it_reports_a_rejected_login() {
        let bridge = FakeBridge::start(&[]).await;
        let mut broker = broker(&bridge);

        let err = broker.login("key", "wrong").await.unwrap_err();
        assert!(is_auth_error(&err));
        assert!(format!("{:#}", err).contains("404"));

        let err = broker.account_balance().await.unwrap_err();
        assert!(is_auth_error(&err));
    }

    #[tokio::test]
    async fn it_lists_positions_in_shares() {
        let bridge = FakeBridge::start(&[
            LOGIN,
            (
                "GET /positions?unit=share",
                r#"[{"id":0,"code":"2330","direction":"Buy","quantity":1000,"price":520.5,
                     "last_price":583.0,"pnl":62500.0,"yd_quantity":800,"cond":"Cash"}]"#,
            ),
        ])
        .await;
        let mut broker = broker(&bridge);
        broker.login("key", "secret").await.unwrap();

        let positions = broker.list_positions().await.unwrap();

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticker(), "2330");
        assert_eq!(positions[0].quantity_change(), 200);
    }

    #[tokio::test]
    async fn it_reads_yearly_profit_loss() {
        let bridge = FakeBridge::start(&[
            LOGIN,
            (
                "GET /profit_loss_summary?begin_date=2019-01-01&end_date=2019-12-31",
                r#"{"total":null}"#,
            ),
            (
                "GET /profit_loss_summary?begin_date=2020-01-01&end_date=2020-12-31",
                r#"{"total":{"quantity":1000,"buy_cost":50000,"sell_cost":55000,"pnl":5000,"pr_ratio":10.0}}"#,
            ),
        ])
        .await;
        let mut broker = broker(&bridge);
        broker.login("key", "secret").await.unwrap();

        let none = broker
            .profit_loss_summary(date(2019, 1, 1), date(2019, 12, 31))
            .await
            .unwrap();
        assert_eq!(none, None);

        let summary = broker
            .profit_loss_summary(date(2020, 1, 1), date(2020, 12, 31))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*summary.quantity(), 1000);
        assert_eq!(*summary.pnl(), dec!(5000));
    }

    #[tokio::test]
    async fn it_reads_settlements() {
        let bridge = FakeBridge::start(&[
            LOGIN,
            (
                "GET /settlements",
                r#"[{"date":"2024-05-17","amount":-52050,"T":0},{"date":"2024-05-21","amount":28750.5,"T":2}]"#,
            ),
        ])
        .await;
        let mut broker = broker(&bridge);
        broker.login("key", "secret").await.unwrap();

        let settlements = broker.settlements().await.unwrap();

        assert_eq!(settlements.len(), 2);
        assert_eq!(*settlements[1].t(), 2);
        assert_eq!(*settlements[1].amount(), dec!(28750.5));
    }

    #[tokio::test]
    async fn it_fails_on_an_unfetched_balance() {
        let bridge = FakeBridge::start(&[
            LOGIN,
            (
                "GET /account_balance",
                r#"{"status":"Unfetch","acc_balance":0,"date":"2024-05-17 13:30:00","errmsg":"timeout"}"#,
            ),
        ])
        .await;
        let mut broker = broker(&bridge);
        broker.login("key", "secret").await.unwrap();

        let err = broker.account_balance().await.unwrap_err();
        assert!(format!("{:#}", err).contains("timeout"));
    }
}
