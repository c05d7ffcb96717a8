//! End-to-end tests for the refresh cycle and its building blocks.
//!
//! Tests cover:
//! - Signal scenarios through the public API
//! - Position aggregation examples and properties (proptest)
//! - Refresh cycles over mock ports
//! - Refresh cycles over CSV files on disk and the SQLite store

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sentinel::domain::cycle::{CycleSettings, Notice, Sources, run_cycle};
use sentinel::domain::position::aggregate;
use sentinel::domain::price::{PriceMap, PricePoint, to_price_map};
use sentinel::domain::signal::{SignalReason, SignalResult, SignalStatus, evaluate};
use sentinel::domain::trade::TradeAction;
use sentinel::domain::watchlist::{StrategyKind, WatchlistEntry};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 16, 0, 0).unwrap()
}

mod signals {
    use super::*;

    #[test]
    fn dip_below_and_above_threshold() {
        let entry = dip("AAPL", dec!(100));
        assert_eq!(
            evaluate(&entry, Some(dec!(99))),
            SignalResult {
                status: SignalStatus::Favorable,
                reason: SignalReason::DipOpportunity
            }
        );
        assert_eq!(evaluate(&entry, Some(dec!(101))), SignalResult::HOLDING);
    }

    #[test]
    fn breakout_above_and_below_threshold() {
        let entry = breakout("NVDA", dec!(50));
        assert_eq!(
            evaluate(&entry, Some(dec!(51))).reason,
            SignalReason::BreakoutSignal
        );
        assert_eq!(evaluate(&entry, Some(dec!(49))), SignalResult::HOLDING);
    }

    #[test]
    fn range_inside_outside_and_unknown() {
        let entry = range("SPY", dec!(10), dec!(20));
        assert_eq!(evaluate(&entry, Some(dec!(15))).reason, SignalReason::InRange);

        let outside = evaluate(&entry, Some(dec!(25)));
        assert_eq!(outside.status, SignalStatus::Unfavorable);
        assert_eq!(outside.reason, SignalReason::OutOfRange);

        // unknown price fails closed
        let unknown = evaluate(&entry, None);
        assert_eq!(unknown.status, SignalStatus::Unfavorable);
        assert_eq!(unknown.reason, SignalReason::OutOfRange);
    }

    #[test]
    fn unknown_strategies_always_hold() {
        for strategy in ["", "momentum", "swing"] {
            let entry = WatchlistEntry::new("XYZ", StrategyKind::parse(strategy));
            for price in [None, Some(dec!(0)), Some(dec!(1000))] {
                assert_eq!(evaluate(&entry, price), SignalResult::HOLDING);
            }
        }
    }
}

mod aggregation {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn open_long_position() {
        let trades = vec![make_trade("AAPL", TradeAction::Buy, dec!(100), dec!(10))];
        let prices = to_price_map(&[PricePoint {
            ticker: "AAPL".into(),
            price: Some(dec!(110)),
        }]);

        let summary = aggregate(&trades, &prices);
        let position = summary.get("AAPL").unwrap().rounded();
        assert_eq!(position.avg_buy_price, dec!(100.00));
        assert_eq!(position.open_quantity, dec!(10));
        assert_eq!(position.unrealized_pnl, dec!(100.00));
        assert_eq!(position.realized_pnl, dec!(0.00));
    }

    #[test]
    fn balanced_round_trip_ignores_live_price() {
        let trades = vec![
            make_trade("AAPL", TradeAction::Buy, dec!(100), dec!(10)),
            make_trade("AAPL", TradeAction::Sell, dec!(120), dec!(10)),
        ];

        for live in [None, Some(dec!(50)), Some(dec!(500))] {
            let prices: PriceMap = [("AAPL".to_string(), live)].into_iter().collect();
            let position = aggregate(&trades, &prices).get("AAPL").unwrap().rounded();
            assert_eq!(position.avg_buy_price, dec!(100.00));
            assert_eq!(position.avg_sell_price, dec!(120.00));
            assert_eq!(position.realized_pnl, dec!(200.00));
            assert_eq!(position.open_quantity, Decimal::ZERO);
            assert_eq!(position.unrealized_pnl, dec!(0.00));
        }
    }

    #[test]
    fn net_short_reports_no_unrealized() {
        let trades = vec![
            make_trade("TSLA", TradeAction::Buy, dec!(200), dec!(2)),
            make_trade("TSLA", TradeAction::Sell, dec!(210), dec!(5)),
        ];
        let prices: PriceMap = [("TSLA".to_string(), Some(dec!(150)))].into_iter().collect();

        let position = aggregate(&trades, &prices).get("TSLA").unwrap().clone();
        assert_eq!(position.open_quantity, dec!(-3));
        assert!(position.is_short());
        assert_eq!(position.realized_pnl, dec!(20));
        assert_eq!(position.unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn positions_in_first_seen_order() {
        let trades = vec![
            make_trade("MSFT", TradeAction::Buy, dec!(400), dec!(1)),
            make_trade("AAPL", TradeAction::Buy, dec!(170), dec!(1)),
            make_trade("MSFT", TradeAction::Sell, dec!(410), dec!(1)),
            make_trade("AMD", TradeAction::Buy, dec!(180), dec!(1)),
        ];
        let tickers: Vec<String> = aggregate(&trades, &PriceMap::new())
            .positions
            .into_iter()
            .map(|p| p.ticker)
            .collect();
        assert_eq!(tickers, vec!["MSFT", "AAPL", "AMD"]);
    }

    fn trade_strategy() -> impl Strategy<Value = sentinel::domain::trade::TradeRecord> {
        (
            prop::sample::select(vec!["AAPL", "MSFT", "TSLA"]),
            any::<bool>(),
            1i64..1_000_000,
            1i64..500,
        )
            .prop_map(|(ticker, is_buy, cents, qty)| {
                let action = if is_buy {
                    TradeAction::Buy
                } else {
                    TradeAction::Sell
                };
                make_trade(ticker, action, Decimal::new(cents, 2), Decimal::from(qty))
            })
    }

    fn price_map_strategy() -> impl Strategy<Value = PriceMap> {
        (
            prop::option::of(1i64..1_000_000),
            prop::option::of(1i64..1_000_000),
            prop::option::of(1i64..1_000_000),
        )
            .prop_map(|(a, m, t)| {
                [("AAPL", a), ("MSFT", m), ("TSLA", t)]
                    .into_iter()
                    .map(|(ticker, cents)| (ticker.to_string(), cents.map(|c| Decimal::new(c, 2))))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn aggregate_is_idempotent(
            trades in prop::collection::vec(trade_strategy(), 0..40),
            prices in price_map_strategy(),
        ) {
            prop_assert_eq!(aggregate(&trades, &prices), aggregate(&trades, &prices));
        }

        #[test]
        fn totals_are_sums_of_positions(
            trades in prop::collection::vec(trade_strategy(), 2..40),
            prices in price_map_strategy(),
        ) {
            let summary = aggregate(&trades, &prices);
            let realized: Decimal = summary.positions.iter().map(|p| p.realized_pnl).sum();
            let unrealized: Decimal = summary.positions.iter().map(|p| p.unrealized_pnl).sum();
            prop_assert_eq!(summary.total_realized_pnl, realized);
            prop_assert_eq!(summary.total_unrealized_pnl, unrealized);
        }

        #[test]
        fn unrealized_only_for_priced_longs(
            trades in prop::collection::vec(trade_strategy(), 0..40),
            prices in price_map_strategy(),
        ) {
            for position in aggregate(&trades, &prices).positions {
                if !position.is_long() || position.live_price.is_none() {
                    prop_assert_eq!(position.unrealized_pnl, Decimal::ZERO);
                }
            }
        }

        #[test]
        fn one_position_per_distinct_ticker(
            trades in prop::collection::vec(trade_strategy(), 0..40),
        ) {
            let summary = aggregate(&trades, &PriceMap::new());
            let mut distinct: Vec<&str> = Vec::new();
            for trade in &trades {
                if !distinct.contains(&trade.ticker.as_str()) {
                    distinct.push(trade.ticker.as_str());
                }
            }
            let tickers: Vec<&str> = summary.positions.iter().map(|p| p.ticker.as_str()).collect();
            prop_assert_eq!(tickers, distinct);
        }
    }
}

mod cycle_with_mocks {
    use super::*;

    #[test]
    fn full_cycle_combines_signals_and_positions() {
        let watchlist = MockWatchlist::new(vec![
            dip("AAPL", dec!(180)),
            breakout("NVDA", dec!(900)),
            range("SPY", dec!(500), dec!(520)),
        ]);
        let trade_log = MockTradeLog::new(vec![
            make_trade("AAPL", TradeAction::Buy, dec!(175), dec!(10)),
            make_trade("AAPL", TradeAction::Sell, dec!(185), dec!(4)),
            make_trade("MSFT", TradeAction::Buy, dec!(400), dec!(2)),
        ]);
        let prices = MockPricePort::new()
            .with_price("AAPL", dec!(178))
            .with_price("NVDA", dec!(880))
            .with_price("MSFT", dec!(410))
            .with_bars("AAPL", make_bars(&[dec!(176), dec!(177), dec!(178)]));

        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert_eq!(snapshot.generated_at, now());
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(snapshot.rows[0].signal.reason, SignalReason::DipOpportunity);
        assert_eq!(snapshot.rows[1].signal, SignalResult::HOLDING);
        // SPY has no price at all
        assert_eq!(snapshot.rows[2].live_price, None);
        assert_eq!(snapshot.rows[2].signal.reason, SignalReason::OutOfRange);

        let aapl = snapshot.portfolio.get("AAPL").unwrap();
        assert_eq!(aapl.realized_pnl, dec!(40));
        assert_eq!(aapl.unrealized_pnl, dec!(18));
        let msft = snapshot.portfolio.get("MSFT").unwrap();
        assert_eq!(msft.unrealized_pnl, dec!(20));
        assert_eq!(snapshot.portfolio.total_pnl(), dec!(78));

        assert_eq!(snapshot.charts.len(), 1);
        assert_eq!(snapshot.charts[0].ticker, "AAPL");
        assert!(snapshot.notices.contains(&Notice::NoChartData("NVDA".into())));
        assert!(snapshot.notices.contains(&Notice::NoChartData("SPY".into())));
        assert!(!snapshot.notices.contains(&Notice::NoChartData("MSFT".into())));
        assert!(!snapshot.notices.contains(&Notice::NoTradeLog));
    }

    #[test]
    fn provider_errors_become_unknown_prices() {
        let watchlist = MockWatchlist::new(vec![range("SPY", dec!(500), dec!(520))]);
        let trade_log = MockTradeLog::new(vec![make_trade(
            "SPY",
            TradeAction::Buy,
            dec!(505),
            dec!(1),
        )]);
        let prices = MockPricePort::new()
            .with_price("SPY", dec!(510))
            .with_error("SPY", "provider down");

        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert_eq!(snapshot.rows[0].live_price, None);
        assert_eq!(snapshot.rows[0].signal.status, SignalStatus::Unfavorable);
        let spy = snapshot.portfolio.get("SPY").unwrap();
        assert_eq!(spy.live_price, None);
        assert_eq!(spy.unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn history_close_stands_in_for_missing_latest_price() {
        let watchlist = MockWatchlist::new(vec![dip("AMD", dec!(150))]);
        let trade_log = MockTradeLog::new(Vec::new());
        let prices = MockPricePort::new().with_bars("AMD", make_bars(&[dec!(160), dec!(145)]));

        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert_eq!(snapshot.rows[0].live_price, Some(dec!(145)));
        assert_eq!(snapshot.rows[0].signal.reason, SignalReason::DipOpportunity);
        assert!(snapshot.notices.contains(&Notice::NoTradeLog));
    }

    #[test]
    fn failing_watchlist_still_reports_positions() {
        let watchlist = MockWatchlist::failing("permission denied");
        let trade_log = MockTradeLog::new(vec![make_trade(
            "AAPL",
            TradeAction::Buy,
            dec!(100),
            dec!(1),
        )]);
        let prices = MockPricePort::new().with_price("AAPL", dec!(101));

        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert!(snapshot.rows.is_empty());
        assert!(matches!(
            snapshot.notices.first(),
            Some(Notice::WatchlistUnavailable(reason)) if reason.contains("permission denied")
        ));
        assert_eq!(snapshot.portfolio.total_unrealized_pnl, dec!(1));
    }

    #[test]
    fn rsi_check_is_advisory() {
        let mut entry = dip("AAPL", dec!(200));
        entry.min_rsi = Some(dec!(90));
        let watchlist = MockWatchlist::new(vec![entry]);
        let trade_log = MockTradeLog::new(Vec::new());
        // alternating closes keep RSI well below 90
        let closes: Vec<Decimal> = (0..20)
            .map(|i| if i % 2 == 0 { dec!(100) } else { dec!(101) })
            .collect();
        let prices = MockPricePort::new().with_bars("AAPL", make_bars(&closes));

        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let settings = CycleSettings {
            history_bars: 5,
            rsi_period: 14,
        };
        let snapshot = run_cycle(&sources, &settings, now());

        let row = &snapshot.rows[0];
        assert!(row.rsi.is_some());
        assert_eq!(row.rsi_ok, Some(false));
        assert_eq!(row.signal.reason, SignalReason::DipOpportunity);
        assert_eq!(snapshot.charts[0].bars.len(), 5);
    }
}

mod cycle_with_csv_files {
    use super::*;
    use sentinel::adapters::csv_adapter::{CsvPriceAdapter, CsvTradeLogAdapter, CsvWatchlistAdapter};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dashboard_from_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("watchlist.csv"),
            "Ticker,Strategy,buy_below,buy_above,range_low,range_high,min_rsi\n\
             aapl,DIP,180,,,,\n\
             spy, Range ,,,500,520,\n",
        )
        .unwrap();
        fs::write(
            root.join("trade_log.txt"),
            "timestamp,ticker,side,price,shares\n\
             2024-03-01 09:31:00,AAPL,BUY,$175.00,10\n\
             2024-03-04 11:15:00,AAPL,SELL,185.00,4\n\
             2024-03-04 11:16:00,AAPL,SELL,oops,4\n",
        )
        .unwrap();
        let prices_dir = root.join("prices");
        fs::create_dir(&prices_dir).unwrap();
        fs::write(
            prices_dir.join("AAPL.csv"),
            "date,close\n2024-03-01,176.00\n2024-03-04,178.00\n",
        )
        .unwrap();
        fs::write(prices_dir.join("SPY.csv"), "date,close\n2024-03-04,510.25\n").unwrap();

        let watchlist = CsvWatchlistAdapter::new(root.join("watchlist.csv"));
        let trade_log = CsvTradeLogAdapter::new(root.join("trade_log.txt"));
        let prices = CsvPriceAdapter::new(prices_dir);
        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[0].entry.ticker, "AAPL");
        assert_eq!(snapshot.rows[0].signal.reason, SignalReason::DipOpportunity);
        assert_eq!(snapshot.rows[1].entry.strategy, StrategyKind::Range);
        assert_eq!(snapshot.rows[1].signal.reason, SignalReason::InRange);

        assert_eq!(snapshot.trades.len(), 2);
        let aapl = snapshot.portfolio.get("AAPL").unwrap();
        assert_eq!(aapl.open_quantity, dec!(6));
        assert_eq!(aapl.realized_pnl, dec!(40));
        assert_eq!(aapl.unrealized_pnl, dec!(18));
        assert_eq!(snapshot.charts.len(), 2);
        assert!(snapshot.notices.is_empty());
    }

    #[test]
    fn missing_files_degrade_to_notices() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let watchlist = CsvWatchlistAdapter::new(root.join("watchlist.csv"));
        let trade_log = CsvTradeLogAdapter::new(root.join("trade_log.txt"));
        let prices = CsvPriceAdapter::new(root.join("prices"));
        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &prices,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert!(snapshot.rows.is_empty());
        assert!(snapshot.portfolio.positions.is_empty());
        assert_eq!(snapshot.notices.len(), 2);
        assert!(matches!(snapshot.notices[0], Notice::WatchlistUnavailable(_)));
        assert_eq!(snapshot.notices[1], Notice::NoTradeLog);
    }
}

#[cfg(feature = "sqlite")]
mod cycle_with_sqlite {
    use super::*;
    use sentinel::adapters::sqlite_adapter::SqlitePriceAdapter;

    #[test]
    fn prices_from_sqlite_store() {
        let store = SqlitePriceAdapter::in_memory().unwrap();
        store.initialize_schema().unwrap();
        store
            .insert_bars("NVDA", &make_bars(&[dec!(880), dec!(905.5), dec!(912.25)]))
            .unwrap();

        let watchlist = MockWatchlist::new(vec![breakout("NVDA", dec!(900))]);
        let trade_log = MockTradeLog::new(vec![make_trade(
            "NVDA",
            TradeAction::Buy,
            dec!(850),
            dec!(2),
        )]);
        let sources = Sources {
            watchlist: &watchlist,
            trade_log: &trade_log,
            prices: &store,
        };
        let snapshot = run_cycle(&sources, &CycleSettings::default(), now());

        assert_eq!(snapshot.rows[0].live_price, Some(dec!(912.25)));
        assert_eq!(snapshot.rows[0].signal.reason, SignalReason::BreakoutSignal);
        assert_eq!(snapshot.portfolio.total_unrealized_pnl, dec!(124.50));
        assert_eq!(snapshot.charts[0].bars.len(), 3);
    }
}
