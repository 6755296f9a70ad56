//! Order manager: validate, then submit, then log.

use crate::domain::order::{OrderAck, OrderGateway};
use crate::domain::symbol::SymbolRulesProvider;
use crate::domain::validation::{OrderDraft, ValidationOutcome, Validator};
use crate::error::OrderError;

/// Places single orders. Nothing reaches the gateway unless the validator
/// accepts it.
pub struct OrderManager<P, G> {
    validator: Validator<P>,
    gateway: G,
}

impl<P: SymbolRulesProvider, G: OrderGateway> OrderManager<P, G> {
    pub fn new(validator: Validator<P>, gateway: G) -> Self {
        Self { validator, gateway }
    }

    pub fn validator(&self) -> &Validator<P> {
        &self.validator
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validate `draft` and, if accepted, submit it.
    pub async fn execute(&self, draft: &OrderDraft) -> Result<OrderAck, OrderError> {
        let request = match self.validator.validate(draft).await? {
            ValidationOutcome::Accepted(request) => request,
            ValidationOutcome::Rejected(rejection) => return Err(OrderError::Rejected(rejection)),
        };

        tracing::info!(order = %request, "Placing order");
        match self.gateway.submit(&request).await {
            Ok(ack) => {
                tracing::info!(
                    order_id = ack.order_id,
                    symbol = %ack.symbol,
                    kind = %ack.kind,
                    side = %ack.side,
                    status = %ack.status,
                    executed_qty = %ack.executed_qty,
                    avg_price = ?ack.avg_price,
                    "Order accepted by exchange"
                );
                Ok(ack)
            }
            Err(e) => {
                tracing::error!(order = %request, error = %e, "Order placement failed");
                Err(OrderError::Exchange(e))
            }
        }
    }
}
