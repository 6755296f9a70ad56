//! Low-level HTTP client: `BinanceHttp`.
//!
//! One method per exchange endpoint. Returns wire types (conversion to domain
//! types happens in the domain sub-clients). Signed endpoints get a fresh
//! timestamp and signature on every attempt.

use crate::domain::market::wire::{ServerTimeResponse, TickerPriceResponse};
use crate::domain::order::wire::{OcoResponse, OrderResponse};
use crate::domain::symbol::wire::ExchangeInfoResponse;
use crate::error::HttpError;
use crate::http::retry::RetryPolicy;
use crate::http::signer::{build_query_string, RequestSigner, API_KEY_HEADER};

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Request parameters, in the order they are sent.
pub type Params = Vec<(String, String)>;

/// Error body the exchange returns with 4xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// Which host an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Host {
    Futures,
    Spot,
}

/// Low-level HTTP client for the exchange REST API.
#[derive(Clone)]
pub struct BinanceHttp {
    futures_url: String,
    spot_url: String,
    client: Client,
    signer: Option<Arc<dyn RequestSigner>>,
    recv_window_ms: u64,
}

impl BinanceHttp {
    pub fn new(futures_url: &str, spot_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            futures_url: futures_url.trim_end_matches('/').to_string(),
            spot_url: spot_url.trim_end_matches('/').to_string(),
            client,
            signer: None,
            recv_window_ms: 5_000,
        })
    }

    /// Attach credentials for signed endpoints.
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>, recv_window_ms: u64) -> Self {
        self.signer = Some(signer);
        self.recv_window_ms = recv_window_ms;
        self
    }

    pub fn futures_url(&self) -> &str {
        &self.futures_url
    }

    pub fn spot_url(&self) -> &str {
        &self.spot_url
    }

    // ── Market data ──────────────────────────────────────────────────────

    pub async fn server_time(&self) -> Result<ServerTimeResponse, HttpError> {
        self.public_get(Host::Futures, "/fapi/v1/time", Vec::new())
            .await
    }

    pub async fn exchange_info(&self) -> Result<ExchangeInfoResponse, HttpError> {
        self.public_get(Host::Futures, "/fapi/v1/exchangeInfo", Vec::new())
            .await
    }

    pub async fn ticker_price(&self, symbol: &str) -> Result<TickerPriceResponse, HttpError> {
        let params = vec![("symbol".to_string(), symbol.to_string())];
        self.public_get(Host::Futures, "/fapi/v1/ticker/price", params)
            .await
    }

    // ── Orders ───────────────────────────────────────────────────────────

    /// `POST /fapi/v1/order`. Never retried.
    pub async fn new_order(&self, params: Params) -> Result<OrderResponse, HttpError> {
        self.signed(Method::POST, Host::Futures, "/fapi/v1/order", params, RetryPolicy::None)
            .await
    }

    /// `POST /api/v3/order/oco` on the spot host. Never retried.
    pub async fn new_oco_order(&self, params: Params) -> Result<OcoResponse, HttpError> {
        self.signed(Method::POST, Host::Spot, "/api/v3/order/oco", params, RetryPolicy::None)
            .await
    }

    /// `DELETE /fapi/v1/order`. Never retried.
    pub async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<OrderResponse, HttpError> {
        let params = vec![
            ("symbol".to_string(), symbol.to_string()),
            ("orderId".to_string(), order_id.to_string()),
        ];
        self.signed(Method::DELETE, Host::Futures, "/fapi/v1/order", params, RetryPolicy::None)
            .await
    }

    /// `GET /fapi/v1/order`.
    pub async fn query_order(&self, symbol: &str, order_id: i64) -> Result<OrderResponse, HttpError> {
        let params = vec![
            ("symbol".to_string(), symbol.to_string()),
            ("orderId".to_string(), order_id.to_string()),
        ];
        self.signed(Method::GET, Host::Futures, "/fapi/v1/order", params, RetryPolicy::Idempotent)
            .await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    fn url(&self, host: Host, path: &str) -> String {
        match host {
            Host::Futures => format!("{}{}", self.futures_url, path),
            Host::Spot => format!("{}{}", self.spot_url, path),
        }
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        host: Host,
        path: &str,
        params: Params,
    ) -> Result<T, HttpError> {
        let url = self.url(host, path);
        self.request_with_retry(Method::GET, &url, &params, false, RetryPolicy::Idempotent)
            .await
    }

    async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        host: Host,
        path: &str,
        params: Params,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let url = self.url(host, path);
        self.request_with_retry(method, &url, &params, true, retry)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        signed: bool,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_request(&method, url, params, signed).await;
        };

        let mut last_error = None;
        for attempt in 0..=config.max_retries {
            let err = match self.do_request::<T>(&method, url, params, signed).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            let Some(delay) = config.delay_after(&err, attempt) else {
                return Err(err);
            };
            if attempt == config.max_retries {
                last_error = Some(err);
                break;
            }
            tracing::debug!(
                attempt = attempt + 1,
                max = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                url,
                "Retrying request"
            );
            futures_timer::Delay::new(delay).await;
            last_error = Some(err);
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        params: &Params,
        signed: bool,
    ) -> Result<T, HttpError> {
        let mut query = params.clone();
        let mut api_key = None;

        if signed {
            let signer = self
                .signer
                .as_ref()
                .ok_or_else(|| HttpError::Unauthorized("no API credentials configured".into()))?;
            query.push(("recvWindow".to_string(), self.recv_window_ms.to_string()));
            let timestamp_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
            signer.sign(&mut query, timestamp_ms)?;
            api_key = Some(signer.api_key());
        }

        // The signature covers this exact string, so the query is built by
        // hand rather than re-encoded by reqwest.
        let full_url = if query.is_empty() {
            url.to_string()
        } else {
            format!("{}?{}", url, build_query_string(&query))
        };

        let mut req = self.client.request(method.clone(), full_url);
        if let Some(key) = api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = resp.text().await?;

        if status.is_success() {
            return serde_json::from_str::<T>(&body)
                .map_err(|e| HttpError::InvalidResponse(format!("{}: {}", e, truncate(&body))));
        }

        Err(classify_error(status.as_u16(), retry_after_ms, body))
    }
}

impl std::fmt::Debug for BinanceHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceHttp")
            .field("futures_url", &self.futures_url)
            .field("spot_url", &self.spot_url)
            .field("signed", &self.signer.is_some())
            .field("recv_window_ms", &self.recv_window_ms)
            .finish()
    }
}

/// Map a non-success response to an `HttpError`.
fn classify_error(status: u16, retry_after_ms: Option<u64>, body: String) -> HttpError {
    let api_error = serde_json::from_str::<ApiErrorBody>(&body).ok();
    match status {
        401 | 403 => HttpError::Unauthorized(body),
        404 => HttpError::NotFound(body),
        418 | 429 => HttpError::RateLimited {
            status,
            retry_after_ms,
        },
        400..=499 => match api_error {
            Some(ApiErrorBody { code, msg }) => HttpError::Exchange { status, code, msg },
            None => HttpError::BadRequest(body),
        },
        _ => HttpError::ServerError { status, body },
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// `Retry-After` in whole seconds, as milliseconds.
fn parse_retry_after(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1_000))
}
