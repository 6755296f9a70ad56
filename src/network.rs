//! Exchange base URLs.
//!
//! Futures endpoints live on one host, spot endpoints (used for OCO orders)
//! on another. Testnet is the default everywhere.

/// USDⓈ-M futures testnet REST API.
pub const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

/// Spot testnet REST API.
pub const SPOT_TESTNET_URL: &str = "https://testnet.binance.vision";

/// USDⓈ-M futures production REST API.
pub const FUTURES_MAINNET_URL: &str = "https://fapi.binance.com";

/// Spot production REST API.
pub const SPOT_MAINNET_URL: &str = "https://api.binance.com";

/// Which pair of hosts to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    pub fn futures_url(&self) -> &'static str {
        match self {
            Network::Testnet => FUTURES_TESTNET_URL,
            Network::Mainnet => FUTURES_MAINNET_URL,
        }
    }

    pub fn spot_url(&self) -> &'static str {
        match self {
            Network::Testnet => SPOT_TESTNET_URL,
            Network::Mainnet => SPOT_MAINNET_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
