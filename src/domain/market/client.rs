//! Market sub-client.

use std::time::Instant;

use crate::domain::market::{Ping, Ticker};
use crate::error::HttpError;
use crate::http::BinanceHttp;
use crate::shared::Symbol;

#[derive(Debug, Clone)]
pub struct MarketClient {
    http: BinanceHttp,
}

impl MarketClient {
    pub fn new(http: BinanceHttp) -> Self {
        Self { http }
    }

    /// Round trip to the exchange; used as the startup connection test.
    pub async fn ping(&self) -> Result<Ping, HttpError> {
        let started = Instant::now();
        let resp = self.http.server_time().await?;
        let ping = Ping {
            server_time: resp.server_time,
            round_trip: started.elapsed(),
        };
        tracing::debug!(
            server_time = %ping.server_time,
            round_trip_ms = ping.round_trip.as_millis() as u64,
            "Exchange reachable"
        );
        Ok(ping)
    }

    pub async fn ticker(&self, symbol: &Symbol) -> Result<Ticker, HttpError> {
        Ok(self.http.ticker_price(symbol.as_str()).await?.into())
    }

    /// Last traded price; the grid strategy's reference price.
    pub async fn last_price(&self, symbol: &Symbol) -> Result<rust_decimal::Decimal, HttpError> {
        Ok(self.ticker(symbol).await?.price)
    }
}
