use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;
use wallet_holdings::models::QuoteSet;
use wallet_holdings::prices::providers::{
    CoinGeckoPriceSource, CoinPaprikaPriceSource, FcdSwaprateSource, FrankfurterRateSource,
};
use wallet_holdings::prices::{FxRateSource, PriceSource, SwaprateSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn coingecko_simple_price_hits_mock_server() -> Result<()> {
    let server = MockServer::start().await;
    let source = CoinGeckoPriceSource::stablecoin().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "terrausd,terraclassicusd"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"terrausd": {"usd": null}, "terraclassicusd": {"usd": 0.0162}}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let price = source.fetch_usd().await?;
    assert_eq!(price, Some(Decimal::from_str("0.0162")?));

    Ok(())
}

#[tokio::test]
async fn coingecko_rate_limit_is_an_error() -> Result<()> {
    let server = MockServer::start().await;
    let source = CoinGeckoPriceSource::staking().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let err = source.fetch_usd().await.expect_err("429 should fail");
    assert!(err.to_string().contains("429"), "unexpected error: {err}");

    Ok(())
}

#[tokio::test]
async fn coingecko_malformed_body_is_an_error() -> Result<()> {
    let server = MockServer::start().await;
    let source = CoinGeckoPriceSource::staking().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    assert!(source.fetch_usd().await.is_err());

    Ok(())
}

#[tokio::test]
async fn coinpaprika_ticker_hits_mock_server() -> Result<()> {
    let server = MockServer::start().await;
    let source = CoinPaprikaPriceSource::stablecoin().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/tickers/ust-terrausd"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"id": "ust-terrausd", "quotes": {"USD": {"price": 1.02}}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    assert_eq!(source.fetch_usd().await?, Some(Decimal::from_str("1.02")?));

    Ok(())
}

#[tokio::test]
async fn coinpaprika_without_usd_quote_is_missing() -> Result<()> {
    let server = MockServer::start().await;
    let source = CoinPaprikaPriceSource::stablecoin().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/tickers/ust-terrausd"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"quotes": {}}"#, "application/json"),
        )
        .mount(&server)
        .await;

    assert_eq!(source.fetch_usd().await?, None);

    Ok(())
}

#[tokio::test]
async fn frankfurter_latest_hits_mock_server() -> Result<()> {
    let server = MockServer::start().await;
    let source = FrankfurterRateSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(query_param("from", "USD"))
        .and(query_param("to", "MNT,TWD"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"amount": 1.0, "base": "USD", "date": "2026-02-27",
                "rates": {"MNT": 3400.0, "TWD": 32.0}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let rates = source
        .fetch_rates("USD", &["mnt".to_string(), "TWD".to_string()])
        .await?;
    assert_eq!(rates.len(), 2);
    assert!((rates["MNT"] - 3400.0).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn frankfurter_server_error_is_an_error() -> Result<()> {
    let server = MockServer::start().await;
    let source = FrankfurterRateSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    assert!(source.fetch_rates("USD", &["MNT".to_string()]).await.is_err());

    Ok(())
}

#[tokio::test]
async fn fcd_swaprates_are_deduplicated_by_denom() -> Result<()> {
    let server = MockServer::start().await;
    let source = FcdSwaprateSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/market/swaprate/uusd"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"denom": "ukrw", "swaprate": "1250.5", "oneDayVariation": "1.2", "oneDayVariationRate": "0.001"},
                {"denom": "umnt", "swaprate": "3400", "oneDayVariation": "0", "oneDayVariationRate": "0"},
                {"denom": "ukrw", "swaprate": "9999", "oneDayVariation": "0", "oneDayVariationRate": "0"}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let quotes: QuoteSet = source.fetch_swaprates("uusd").await?;
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes.get("ukrw").map(|q| q.swaprate.as_str()), Some("1250.5"));
    assert_eq!(
        quotes.get("ukrw").map(|q| q.one_day_variation_rate.as_str()),
        Some("0.001")
    );

    Ok(())
}

#[tokio::test]
async fn fcd_error_status_is_an_error() -> Result<()> {
    let server = MockServer::start().await;
    let source = FcdSwaprateSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/market/swaprate/uusd"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = source.fetch_swaprates("uusd").await.expect_err("500 should fail");
    assert!(err.to_string().contains("upstream down"));

    Ok(())
}
