use market_data_ingestor::{
    BarsRequestParams, DataProvider, Lookback, ProviderError,
    models::timeframe::TimeFrame,
    providers::yahoo_chart::YahooChartProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const CHART_BODY: &str = r#"{
    "chart": {
        "result": [{
            "meta": {"symbol": "GC=F", "currency": "USD", "gmtoffset": -18000},
            "timestamp": [1704171600, 1704258000, 1704344400],
            "indicators": {"quote": [{
                "open":   [2072.0, 2050.0, 2041.0],
                "high":   [2080.0, 2055.0, 2049.0],
                "low":    [2060.0, 2030.0, 2035.0],
                "close":  [2064.4, 2034.2, null],
                "volume": [1234,   2345,   3456]
            }]}
        }],
        "error": null
    }
}"#;

fn provider(server: &MockServer) -> YahooChartProvider {
    YahooChartProvider::builder()
        .base_url(server.uri())
        .requests_per_minute(600)
        .build()
        .expect("provider")
}

fn params(symbol: &str, interval: &str) -> BarsRequestParams {
    BarsRequestParams::new(symbol, Lookback::Days(60), interval.parse::<TimeFrame>().unwrap())
}

#[tokio::test]
async fn fetches_and_normalises_a_chart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GC=F"))
        .and(query_param("range", "60d"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider(&server).fetch_bars(params("GC=F", "1d")).await.unwrap();

    assert_eq!(series.symbol, "GC=F");
    assert_eq!(series.timeframe, TimeFrame::day());
    assert_eq!(series.len(), 2, "the row with a null close is dropped");
    assert_eq!(series.bars[0].close, 2064.4);
    assert!(series.validate().is_ok());
}

#[tokio::test]
async fn vendor_error_envelope_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        ))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_bars(params("NOPE", "1d")).await.unwrap_err();
    match err {
        ProviderError::Api { message, .. } => {
            assert_eq!(message, "Not Found: No data found, symbol may be delisted")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn plain_http_errors_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_bars(params("GC=F", "1d")).await.unwrap_err();
    match err {
        ProviderError::Api { message, .. } => {
            assert!(message.starts_with("429"), "{message}");
            assert!(message.ends_with("Too Many Requests"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unsupported_interval_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART_BODY))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server).fetch_bars(params("GC=F", "4h")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Validation { .. }));
}

#[tokio::test]
async fn symbol_is_sent_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/A%2FB%3Fx"))
        .and(query_param("range", "60d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART_BODY))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/^GSPC"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let series = provider.fetch_bars(params("A/B?x", "1d")).await.unwrap();
    assert_eq!(series.symbol, "A/B?x");
    assert_eq!(series.len(), 2);
    assert!(provider.fetch_bars(params("^GSPC", "1d")).await.is_ok());
}
