//! HTTP client layer: `BinanceHttp` with per-endpoint retry policies and
//! HMAC request signing.

pub mod client;
pub mod retry;
pub mod signer;

pub use client::{BinanceHttp, Params};
pub use retry::{RetryConfig, RetryPolicy};
pub use signer::{BinanceHmacSigner, RequestSigner};
