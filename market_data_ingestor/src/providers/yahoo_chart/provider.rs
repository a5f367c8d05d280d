use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, Url, header};
use snafu::{OptionExt, ResultExt};
use tracing::{info, warn};

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, InvalidBaseUrlSnafu,
        InvalidRateLimitSnafu, ProviderError, ProviderInitError, ReqwestSnafu, ValidationSnafu,
        yahoo_chart::{
            params::{construct_params, validate_interval},
            response::ChartResponse,
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = nonzero!(30u32);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; flow-terminal)";

pub struct YahooChartProvider {
    client: Client,
    base_url: Url,
    limiter: DefaultDirectRateLimiter,
}

/// Builder for [`YahooChartProvider`]; mainly used to point it at another host.
#[derive(Debug, Clone)]
pub struct YahooChartProviderBuilder {
    base_url: String,
    requests_per_minute: u32,
    timeout: Duration,
}

impl Default for YahooChartProviderBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE.get(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl YahooChartProviderBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<YahooChartProvider, ProviderInitError> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .context(InvalidBaseUrlSnafu {
                url: self.base_url.clone(),
            })?;
        let rpm = NonZeroU32::new(self.requests_per_minute).context(InvalidRateLimitSnafu {
            requests_per_minute: self.requests_per_minute,
        })?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(YahooChartProvider {
            client,
            base_url,
            limiter: RateLimiter::direct(Quota::per_minute(rpm)),
        })
    }
}

impl YahooChartProvider {
    /// Creates a provider against the public endpoint with default limits.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::builder().build()
    }

    pub fn builder() -> YahooChartProviderBuilder {
        YahooChartProviderBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/v8/finance/chart/{symbol}` with the symbol percent-encoded as one segment.
    pub fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()
            .context(InternalSnafu {
                message: format!("base URL {} cannot take path segments", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        // Validate the interval before spending a request on it.
        validate_interval(&params.interval)?;
        if params.symbol.trim().is_empty() {
            return ValidationSnafu {
                message: "symbol must not be empty",
            }
            .fail();
        }

        self.limiter.until_ready().await;

        let url = self.chart_url(&params.symbol)?;
        info!(
            symbol = %params.symbol,
            range = %params.period,
            interval = %params.interval,
            "requesting chart"
        );
        let response = self
            .client
            .get(url)
            .query(&construct_params(&params))
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            // The endpoint usually explains itself in the regular envelope.
            if let Ok(chart) = serde_json::from_str::<ChartResponse>(&body) {
                if let Some(err) = chart.chart.error {
                    return ApiSnafu {
                        message: err.to_string(),
                    }
                    .fail();
                }
            }
            return ApiSnafu {
                message: format!("{status}: {body}"),
            }
            .fail();
        }

        let chart = response
            .json::<ChartResponse>()
            .await
            .context(ReqwestSnafu)?;
        let decoded = chart.into_result()?.into_bars(&params.interval)?;
        if decoded.dropped > 0 {
            warn!(
                symbol = %params.symbol,
                dropped = decoded.dropped,
                "dropped incomplete or duplicate rows"
            );
        }
        info!(symbol = %params.symbol, bars = decoded.bars.len(), "chart received");

        Ok(BarSeries::new(params.symbol, params.interval, decoded.bars))
    }
}
