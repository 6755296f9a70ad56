//! Orders sub-client: submit, cancel and query orders on the exchange.

use rust_decimal::Decimal;

use crate::domain::order::{OrderAck, OrderGateway, OrderId, OrderPrices, OrderRequest};
use crate::error::HttpError;
use crate::http::{BinanceHttp, Params};
use crate::shared::Symbol;

/// Good-till-cancelled, used for every resting order the bot places.
const GTC: &str = "GTC";

/// Exchange-backed [`OrderGateway`].
#[derive(Debug, Clone)]
pub struct OrdersClient {
    http: BinanceHttp,
}

impl OrdersClient {
    pub fn new(http: BinanceHttp) -> Self {
        Self { http }
    }

    /// Current state of one order.
    pub async fn query(&self, symbol: &Symbol, order_id: OrderId) -> Result<OrderAck, HttpError> {
        let resp = self.http.query_order(symbol.as_str(), order_id).await?;
        OrderAck::try_from(resp)
    }
}

impl OrderGateway for OrdersClient {
    async fn submit(&self, request: &OrderRequest) -> Result<OrderAck, HttpError> {
        let params = order_params(request);
        tracing::debug!(symbol = %request.symbol, kind = %request.kind(), ?params, "Submitting order");

        match request.prices {
            OrderPrices::Oco { .. } => {
                let resp = self.http.new_oco_order(params).await?;
                Ok(OrderAck::from_oco(resp, request))
            }
            _ => {
                let resp = self.http.new_order(params).await?;
                OrderAck::try_from(resp)
            }
        }
    }

    async fn cancel(&self, symbol: &Symbol, order_id: OrderId) -> Result<OrderAck, HttpError> {
        let resp = self.http.cancel_order(symbol.as_str(), order_id).await?;
        OrderAck::try_from(resp)
    }
}

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

fn decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Request parameters for one order, in the order the exchange documents them.
pub(crate) fn order_params(request: &OrderRequest) -> Params {
    let mut params = vec![
        param("symbol", request.symbol.as_str()),
        param("side", request.side.as_str()),
    ];

    match request.prices {
        OrderPrices::Market => {
            params.push(param("type", "MARKET"));
            params.push(param("quantity", decimal(request.quantity)));
            // The default ACK response leaves executedQty and avgPrice at zero.
            params.push(param("newOrderRespType", "RESULT"));
        }
        OrderPrices::Limit { price } => {
            params.push(param("type", "LIMIT"));
            params.push(param("timeInForce", GTC));
            params.push(param("quantity", decimal(request.quantity)));
            params.push(param("price", decimal(price)));
        }
        OrderPrices::StopLimit {
            stop_price,
            limit_price,
        } => {
            params.push(param("type", "STOP"));
            params.push(param("timeInForce", GTC));
            params.push(param("quantity", decimal(request.quantity)));
            params.push(param("price", decimal(limit_price)));
            params.push(param("stopPrice", decimal(stop_price)));
        }
        OrderPrices::Oco {
            limit_price,
            stop_price,
            stop_limit_price,
        } => {
            params.push(param("quantity", decimal(request.quantity)));
            params.push(param("price", decimal(limit_price)));
            params.push(param("stopPrice", decimal(stop_price)));
            params.push(param("stopLimitPrice", decimal(stop_limit_price)));
            params.push(param("stopLimitTimeInForce", GTC));
        }
    }

    params
}
