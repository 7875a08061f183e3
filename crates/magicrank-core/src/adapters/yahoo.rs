use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::data_source::{FetchError, FetchOutcome, FundamentalsSource};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{RawFundamentals, Ticker};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const SUMMARY_MODULES: &str =
    "price,defaultKeyStatistics,financialData,incomeStatementHistory,balanceSheetHistory";
const AUTH_TTL: Duration = Duration::from_secs(3600);

// ============================================================================
// Session auth
// ============================================================================

#[derive(Debug, Clone)]
struct CachedCrumb {
    crumb: String,
    fetched_at: Instant,
}

/// Caches the Yahoo crumb that must accompany `quoteSummary` calls.
///
/// The session cookie itself lives in the HTTP client's jar unless an explicit
/// cookie was supplied. Refreshes are serialised by the async mutex so a burst
/// of workers triggers a single crumb fetch.
#[derive(Debug, Default)]
pub struct YahooAuthManager {
    cached: Mutex<Option<CachedCrumb>>,
}

impl YahooAuthManager {
    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        cookie: Option<&str>,
    ) -> Result<String, FetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < AUTH_TTL {
                return Ok(entry.crumb.clone());
            }
        }

        let crumb = Self::fetch_crumb(http_client, cookie).await?;
        *cached = Some(CachedCrumb {
            crumb: crumb.clone(),
            fetched_at: Instant::now(),
        });
        Ok(crumb)
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn fetch_crumb(
        http_client: &dyn HttpClient,
        cookie: Option<&str>,
    ) -> Result<String, FetchError> {
        if cookie.is_none() {
            // Only the Set-Cookie side effect matters; fc.yahoo.com answers 404.
            let cookie_request = HttpRequest::get(COOKIE_URL).with_header("referer", REFERER);
            if let Err(error) = http_client.execute(cookie_request).await {
                return Err(transport_error(&error, "session cookie"));
            }
        }

        let endpoints = [
            "https://query1.finance.yahoo.com/v1/test/getcrumb",
            "https://query2.finance.yahoo.com/v1/test/getcrumb",
        ];

        for endpoint in endpoints {
            let request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_cookie(cookie);

            match http_client.execute(request).await {
                Ok(response) if response.status == 429 => {
                    return Err(FetchError::rate_limited(
                        "yahoo rate limited while fetching crumb",
                    ));
                }
                Ok(response) if response.is_success() => {
                    let body = response.body.trim();
                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        continue;
                    }
                    if body.to_ascii_lowercase().contains("too many requests") {
                        return Err(FetchError::rate_limited(
                            "yahoo rate limited while fetching crumb",
                        ));
                    }
                    if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                        return Ok(body.to_owned());
                    }
                }
                Ok(response) => {
                    debug!(endpoint, status = response.status, "crumb endpoint rejected request");
                }
                Err(error) => {
                    debug!(endpoint, %error, "crumb endpoint unreachable");
                }
            }
        }

        Err(FetchError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Yahoo Finance fundamentals adapter built on the `quoteSummary` endpoint.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
    base_url: String,
    session_cookie: Option<String>,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: Arc::new(YahooAuthManager::default()),
            base_url: DEFAULT_BASE_URL.to_owned(),
            session_cookie: None,
            timeout_ms: 10_000,
        }
    }

    /// Use an explicit `Cookie` header instead of the client's jar.
    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_summary(&self, ticker: &Ticker) -> FetchOutcome {
        let response = self.request_summary(ticker).await?;

        // Yahoo answers 401 once a crumb expires; one refresh is enough.
        let response = if response.status == 401 {
            debug!(%ticker, "yahoo rejected crumb; retrying with a fresh one");
            self.auth.invalidate().await;
            self.request_summary(ticker).await?
        } else {
            response
        };

        match response.status {
            200..=299 => parse_summary(ticker, &response.body),
            404 => Err(FetchError::not_found(format!(
                "quote not found for {ticker}"
            ))),
            429 => {
                self.auth.invalidate().await;
                Err(FetchError::rate_limited(format!(
                    "yahoo rate limited request for {ticker}"
                )))
            }
            401 | 403 => {
                warn!(%ticker, status = response.status, "yahoo rejected session; refreshing crumb");
                self.auth.invalidate().await;
                Err(FetchError::unavailable(format!(
                    "yahoo rejected session with status {}",
                    response.status
                )))
            }
            status => Err(FetchError::unavailable(format!(
                "yahoo returned status {status} for {ticker}"
            ))),
        }
    }

    async fn request_summary(&self, ticker: &Ticker) -> Result<HttpResponse, FetchError> {
        let cookie = self.session_cookie.as_deref();
        let crumb = self.auth.crumb(self.http_client.as_ref(), cookie).await?;

        let endpoint = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            self.base_url,
            urlencoding::encode(ticker.as_str()),
            SUMMARY_MODULES,
            urlencoding::encode(&crumb)
        );
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_cookie(cookie)
            .with_timeout_ms(self.timeout_ms);

        self.http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(&error, ticker.as_str()))
    }
}

impl FundamentalsSource for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>> {
        Box::pin(self.fetch_summary(ticker))
    }
}

fn transport_error(error: &HttpError, context: &str) -> FetchError {
    if error.timed_out() {
        FetchError::timeout(format!("yahoo timeout ({context}): {}", error.message()))
    } else {
        FetchError::unavailable(format!(
            "yahoo transport error ({context}): {}",
            error.message()
        ))
    }
}

/// Parse a `quoteSummary` payload into typed fundamentals.
///
/// Statement lines use the first available alternative, mirroring how the
/// screener historically picked EBIT, cash and debt.
pub fn parse_summary(ticker: &Ticker, body: &str) -> FetchOutcome {
    let response: SummaryResponse = serde_json::from_str(body).map_err(|error| {
        FetchError::unavailable(format!("malformed yahoo payload for {ticker}: {error}"))
    })?;

    if let Some(error) = response.quote_summary.error {
        return Err(if error.code.eq_ignore_ascii_case("not found") {
            FetchError::not_found(error.description)
        } else {
            FetchError::unavailable(format!("{}: {}", error.code, error.description))
        });
    }

    let result = response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::not_found(format!("quote not found for {ticker}")))?;

    let price = result
        .price
        .ok_or_else(|| FetchError::not_found(format!("no price module for {ticker}")))?;
    let name = price
        .long_name
        .clone()
        .or_else(|| price.short_name.clone())
        .ok_or_else(|| FetchError::not_found(format!("quote not found for {ticker}")))?;

    let income = result
        .income_statement_history
        .map(|history| history.statements)
        .unwrap_or_default();
    let balance = result
        .balance_sheet_history
        .map(|history| history.statements)
        .unwrap_or_default();
    let (Some(income), Some(balance)) = (income.into_iter().next(), balance.into_iter().next())
    else {
        return Err(FetchError::incomplete(format!(
            "empty financial statements for {ticker}"
        )));
    };

    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    let mut raw = RawFundamentals::new(ticker.clone());
    raw.name = Some(name);
    raw.currency = price.currency;
    raw.ebit = first_available(&[&income.ebit, &income.operating_income]);
    raw.total_current_assets = first_available(&[&balance.total_current_assets]);
    raw.cash = first_available(&[&balance.cash, &financial.total_cash]);
    raw.total_current_liabilities = first_available(&[&balance.total_current_liabilities]);
    raw.short_term_debt = first_available(&[&balance.short_long_term_debt]);
    raw.net_ppe = first_available(&[&balance.property_plant_equipment]);
    raw.total_debt = first_available(&[&financial.total_debt, &balance.long_term_debt]);
    raw.market_cap = first_available(&[&price.market_cap, &stats.market_cap]);
    raw.shares_outstanding = first_available(&[&stats.shares_outstanding]);
    raw.current_price =
        first_available(&[&financial.current_price, &price.regular_market_price]);
    raw.reported_enterprise_value = first_available(&[&stats.enterprise_value]);

    Ok(raw)
}

fn first_available(candidates: &[&Option<RawValue>]) -> Option<f64> {
    candidates.iter().find_map(|candidate| match candidate {
        Some(value) => value.value(),
        None => None,
    })
}

// ============================================================================
// Yahoo quoteSummary payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryData,
}

#[derive(Debug, Deserialize)]
struct SummaryData {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<SummaryError>,
}

#[derive(Debug, Deserialize)]
struct SummaryError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(default)]
    income_statement_history: Option<IncomeStatementHistory>,
    #[serde(default)]
    balance_sheet_history: Option<BalanceSheetHistory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    regular_market_price: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    shares_outstanding: Option<RawValue>,
    #[serde(default)]
    enterprise_value: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    #[serde(default)]
    current_price: Option<RawValue>,
    #[serde(default)]
    total_debt: Option<RawValue>,
    #[serde(default)]
    total_cash: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct IncomeStatementHistory {
    #[serde(rename = "incomeStatementHistory", default)]
    statements: Vec<IncomeStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatement {
    #[serde(default)]
    ebit: Option<RawValue>,
    #[serde(default)]
    operating_income: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct BalanceSheetHistory {
    #[serde(rename = "balanceSheetStatements", default)]
    statements: Vec<BalanceSheetStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetStatement {
    #[serde(default)]
    cash: Option<RawValue>,
    #[serde(default)]
    total_current_assets: Option<RawValue>,
    #[serde(default)]
    total_current_liabilities: Option<RawValue>,
    #[serde(default)]
    short_long_term_debt: Option<RawValue>,
    #[serde(default)]
    property_plant_equipment: Option<RawValue>,
    #[serde(default)]
    long_term_debt: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; empty objects mean absent.
#[derive(Debug, Clone, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawValue {
    fn value(&self) -> Option<f64> {
        self.raw.filter(|value| value.is_finite())
    }
}
