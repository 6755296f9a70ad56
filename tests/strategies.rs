//! Order manager, TWAP and grid runs against the in-memory exchange.

mod common;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use common::{dec, manager, FakeGateway, FakeRules};
use futures_trader::domain::order::{OrderPrices, OrderStatus};
use futures_trader::domain::validation::{OrderDraft, Rejection};
use futures_trader::error::OrderError;
use futures_trader::shared::{OrderKind, Side};
use futures_trader::strategy::{CancelToken, StrategyError, GridPlan, GridStrategy, TwapPlan, TwapStrategy};

fn twap_plan(total: &str, duration: Duration, intervals: u32) -> TwapPlan {
    TwapPlan {
        symbol: "btcusdt".into(),
        side: Side::Buy,
        total_quantity: dec(total),
        duration,
        intervals: Some(intervals),
    }
}

#[tokio::test]
async fn test_rejected_orders_never_reach_the_gateway() {
    let gateway = Arc::new(FakeGateway::new("45000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());

    let err = m
        .execute(&OrderDraft::new(
            "BTCUSDT",
            "BUY",
            dec("0.0015"),
            OrderPrices::Market,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Rejected(Rejection::OffStep { .. })));

    let err = m
        .execute(&OrderDraft::new("FAKEUSDT", "BUY", dec("0.01"), OrderPrices::Market))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Metadata(_)));

    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_accepted_order_is_submitted_normalized() {
    let gateway = Arc::new(FakeGateway::new("45000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());

    let ack = m
        .execute(&OrderDraft::new(
            "btcusdt",
            "buy",
            dec("0.01"),
            OrderPrices::Limit { price: dec("45000") },
        ))
        .await
        .unwrap();
    assert_eq!(ack.status, OrderStatus::New);
    assert_eq!(ack.kind, OrderKind::Limit);

    let submitted = gateway.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].symbol.as_str(), "BTCUSDT");
    assert_eq!(submitted[0].side, Side::Buy);
}

#[tokio::test]
async fn test_twap_slices_sum_to_total() {
    let gateway = Arc::new(FakeGateway::new("45000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());
    let strategy = TwapStrategy::new(&m);

    let report = strategy
        .execute(&twap_plan("0.1", Duration::from_millis(30), 3), &CancelToken::new())
        .await
        .unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.planned_slices, 3);
    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.total_executed, dec("0.1"));
    assert_eq!(report.average_price, Some(dec("45000")));

    let quantities: Vec<Decimal> = gateway.submitted().iter().map(|r| r.quantity).collect();
    assert_eq!(quantities, vec![dec("0.033"), dec("0.033"), dec("0.034")]);
    assert!(gateway
        .submitted()
        .iter()
        .all(|r| r.kind() == OrderKind::Market && r.side == Side::Buy));
}

#[tokio::test]
async fn test_twap_continues_past_failed_slice() {
    let gateway = Arc::new(FakeGateway::new("45000").failing_on(&[2]));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());

    let report = TwapStrategy::new(&m)
        .execute(&twap_plan("0.03", Duration::from_millis(30), 3), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.slices.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.slices[1].result.is_err());
    assert_eq!(report.total_executed, dec("0.02"));
}

#[tokio::test]
async fn test_twap_stops_when_cancelled() {
    let gateway = Arc::new(FakeGateway::new("45000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = TwapStrategy::new(&m)
        .execute(&twap_plan("0.05", Duration::from_secs(50), 5), &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.slices.len(), 1);
    assert_eq!(gateway.submitted().len(), 1);
}

#[tokio::test]
async fn test_twap_plan_below_minimum_places_nothing() {
    let gateway = Arc::new(FakeGateway::new("45000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());

    let result = TwapStrategy::new(&m)
        .execute(&twap_plan("0.002", Duration::from_millis(10), 5), &CancelToken::new())
        .await;

    assert!(result.is_err());
    assert!(gateway.submitted().is_empty());
}

#[tokio::test]
async fn test_grid_places_and_cancels() {
    let gateway = Arc::new(FakeGateway::new("42000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());
    let plan = GridPlan {
        symbol: "BTCUSDT".into(),
        lower_price: dec("40000"),
        upper_price: dec("44000"),
        levels: 5,
        total_quantity: dec("0.05"),
    };

    let mut grid = GridStrategy::new(&m);
    let placement = grid.place(&plan, dec("42000")).await.unwrap();

    assert_eq!(placement.placed.len(), 4);
    assert_eq!(placement.skipped.len(), 1);
    assert!(placement.failed.is_empty());
    assert!(grid.is_running());

    let submitted = gateway.submitted();
    let buys: Vec<Decimal> = submitted
        .iter()
        .filter(|r| r.side == Side::Buy)
        .map(|r| match r.prices {
            OrderPrices::Limit { price } => price,
            other => panic!("unexpected prices {:?}", other),
        })
        .collect();
    assert_eq!(buys, vec![dec("40000"), dec("41000")]);
    assert!(submitted.iter().all(|r| r.quantity == dec("0.01")));

    let placed_ids: Vec<i64> = grid.active_orders().iter().map(|o| o.order_id).collect();
    let report = grid.stop().await;
    assert_eq!(report.cancelled, 4);
    assert!(report.failed.is_empty());
    assert_eq!(gateway.cancelled(), placed_ids);
    assert!(!grid.is_running());
}

#[tokio::test]
async fn test_grid_records_failed_levels() {
    let gateway = Arc::new(FakeGateway::new("42000").failing_on(&[1]));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());
    let plan = GridPlan {
        symbol: "BTCUSDT".into(),
        lower_price: dec("40000"),
        upper_price: dec("44000"),
        levels: 5,
        total_quantity: dec("0.05"),
    };

    let mut grid = GridStrategy::new(&m);
    let placement = grid.place(&plan, dec("42000")).await.unwrap();

    assert_eq!(placement.failed.len(), 1);
    assert_eq!(placement.failed[0].0.price, dec("40000"));
    assert_eq!(placement.placed.len(), 3);
    assert_eq!(grid.stop().await.cancelled, 3);
}

#[tokio::test]
async fn test_grid_outside_price_limits_places_nothing() {
    let gateway = Arc::new(FakeGateway::new("800"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());
    // BTCUSDT trades from 556.80: the 100 and 400 levels cannot exist.
    let plan = GridPlan {
        symbol: "BTCUSDT".into(),
        lower_price: dec("100"),
        upper_price: dec("1000"),
        levels: 4,
        total_quantity: dec("0.04"),
    };

    let mut grid = GridStrategy::new(&m);
    let err = grid.place(&plan, dec("800")).await.unwrap_err();

    assert!(matches!(err, StrategyError::InvalidPlan(ref m) if m.contains("556.8")));
    assert!(gateway.submitted().is_empty());
    assert!(!grid.is_running());
}

#[tokio::test]
async fn test_grid_stop_cancels_each_order_under_its_own_symbol() {
    let gateway = Arc::new(FakeGateway::new("42000"));
    let m = manager(Arc::new(FakeRules::standard()), gateway.clone());
    let btc = GridPlan {
        symbol: "BTCUSDT".into(),
        lower_price: dec("40000"),
        upper_price: dec("44000"),
        levels: 2,
        total_quantity: dec("0.02"),
    };
    let odd = GridPlan {
        symbol: "ODDUSDT".into(),
        lower_price: dec("10.05"),
        upper_price: dec("20.05"),
        levels: 2,
        total_quantity: dec("0.5"),
    };

    let mut grid = GridStrategy::new(&m);
    grid.place(&btc, dec("42000")).await.unwrap();
    grid.place(&odd, dec("15")).await.unwrap();
    assert_eq!(grid.active_orders().len(), 4);

    let report = grid.stop().await;
    assert_eq!(report.cancelled, 4);
    let cancelled = gateway.cancelled_orders();
    assert_eq!(
        cancelled.iter().filter(|(s, _)| s.as_str() == "BTCUSDT").count(),
        2
    );
    assert_eq!(
        cancelled.iter().filter(|(s, _)| s.as_str() == "ODDUSDT").count(),
        2
    );
}
