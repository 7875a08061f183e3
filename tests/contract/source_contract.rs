//! Contract every `FundamentalsSource` must honour.
//!
//! Sources are exercised offline: the Yahoo adapter runs against a scripted
//! HTTP client so the contract never depends on the network.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use magicrank_core::{
    FetchErrorKind, FixtureSource, FundamentalsSource, HttpClient, HttpError, HttpRequest,
    HttpResponse, ProviderFailure, RawFundamentals, Ticker, YahooAdapter,
};

const KNOWN: &str = "POS.L";
const UNKNOWN: &str = "NOPE.L";

const POS_SUMMARY: &str = r#"{
    "quoteSummary": {
        "result": [{
            "price": {"longName": "Plexus Holdings plc", "currency": "GBp", "marketCap": {"raw": 52000000.0}},
            "defaultKeyStatistics": {},
            "financialData": {"totalDebt": {"raw": 1000000.0}, "totalCash": {"raw": 3000000.0}},
            "incomeStatementHistory": {"incomeStatementHistory": [{"ebit": {"raw": 11550000.0}}]},
            "balanceSheetHistory": {"balanceSheetStatements": [{
                "cash": {"raw": 3000000.0},
                "totalCurrentAssets": {"raw": 9000000.0},
                "totalCurrentLiabilities": {"raw": 4000000.0},
                "propertyPlantEquipment": {"raw": 8700000.0}
            }]}
        }],
        "error": null
    }
}"#;

const NOT_FOUND: &str = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found"}}}"#;

/// Routes crumb requests to a fixed crumb and summary requests by symbol.
#[derive(Default)]
struct OfflineYahoo {
    summary_calls: AtomicUsize,
    fail_with_status: Option<u16>,
}

impl HttpClient for OfflineYahoo {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = if request.url.contains("getcrumb") {
            HttpResponse::ok_json("offline-crumb")
        } else if request.url.contains("quoteSummary") {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with_status {
                Some(status) => HttpResponse::new(status, ""),
                None if request.url.contains(KNOWN) => HttpResponse::ok_json(POS_SUMMARY),
                None => HttpResponse::new(404, NOT_FOUND),
            }
        } else {
            HttpResponse::new(200, "")
        };
        Box::pin(async move { Ok(response) })
    }
}

fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("valid ticker")
}

fn sources() -> Vec<Arc<dyn FundamentalsSource>> {
    let fixture = FixtureSource::new([RawFundamentals::new(ticker(KNOWN))
        .with_ebit(11_550_000.0)
        .with_market_cap(52_000_000.0)]);
    let yahoo = YahooAdapter::with_http_client(Arc::new(OfflineYahoo::default()));
    vec![Arc::new(fixture), Arc::new(yahoo)]
}

#[tokio::test]
async fn every_source_returns_fundamentals_for_the_requested_ticker() {
    for source in sources() {
        let raw = source
            .fetch(&ticker(KNOWN))
            .await
            .unwrap_or_else(|error| panic!("{} failed: {error}", source.name()));

        assert_eq!(raw.ticker.as_str(), KNOWN, "source {}", source.name());
        assert!(raw.ebit.is_some(), "source {} dropped ebit", source.name());
    }
}

#[tokio::test]
async fn every_source_reports_unknown_tickers_as_not_found() {
    for source in sources() {
        let error = source
            .fetch(&ticker(UNKNOWN))
            .await
            .expect_err("unknown ticker must fail");

        assert_eq!(
            error.kind(),
            FetchErrorKind::NotFound,
            "source {} returned {error}",
            source.name()
        );
    }
}

#[test]
fn every_source_has_a_stable_name() {
    let names = sources()
        .iter()
        .map(|source| source.name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["fixture", "yahoo"]);
}

#[tokio::test]
async fn provider_status_codes_map_to_typed_failures_without_retrying() {
    let cases = [
        (429, FetchErrorKind::Provider(ProviderFailure::RateLimited)),
        (500, FetchErrorKind::Provider(ProviderFailure::Unavailable)),
        (403, FetchErrorKind::Provider(ProviderFailure::Unavailable)),
        (404, FetchErrorKind::NotFound),
    ];

    for (status, expected) in cases {
        let http = Arc::new(OfflineYahoo {
            fail_with_status: Some(status),
            ..OfflineYahoo::default()
        });
        let adapter = YahooAdapter::with_http_client(http.clone());

        let error = adapter
            .fetch(&ticker(KNOWN))
            .await
            .expect_err("scripted failure");

        assert_eq!(error.kind(), expected, "status {status}");
        assert_eq!(
            http.summary_calls.load(Ordering::SeqCst),
            1,
            "a source makes exactly one provider call per fetch"
        );
    }
}
