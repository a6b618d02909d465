//! End-to-end engine tests: strategy gating, event-loop ordering and
//! portfolio accounting over small hand-checked panels.

mod common;

use approx::assert_relative_eq;
use atsim::domain::algo::LongShort;
use atsim::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use atsim::domain::broker;
use atsim::domain::error::AtsimError;
use atsim::domain::feature::{ExponentialAverage, RateOfChange};
use atsim::domain::ohlcv::TimedBar;
use atsim::domain::panel::PricePanel;
use atsim::domain::strategy::{DecisionSource, Phase, Strategy};
use atsim::domain::weights::Decision;
use common::*;

const ABC: [&str; 3] = ["A", "B", "C"];

fn config(commission_per_share: f64) -> BacktestConfig {
    BacktestConfig {
        initial_capital: 10_000.0,
        commission_per_share,
    }
}

fn momentum(roc_period: usize, n_long: usize, n_short: usize) -> Strategy {
    Strategy::new(
        "momentum",
        vec![Box::new(RateOfChange::new(roc_period))],
        Box::new(LongShort::new("roc", n_long, n_short)),
        None,
        &universe(&ABC),
    )
    .unwrap()
}

fn equities(result: &BacktestResult) -> Vec<f64> {
    result.equity_curve().iter().map(|p| p.equity).collect()
}

mod three_bar_scenario {
    use super::*;

    #[test]
    fn long_a_short_c_with_100_pct_margin() {
        let panel = make_panel(
            &ABC,
            &[
                vec![10.0, 20.0, 30.0],
                vec![11.0, 19.0, 31.0],
                vec![12.0, 18.0, 32.0],
            ],
        );
        let mut source = ScriptedSource::new(vec![rebalance(&[1.0, 0.0, -1.0])]);
        let result = run_backtest(&panel, &mut source, &config(0.0)).unwrap();

        let eq = equities(&result);
        assert_eq!(eq[0], 10_000.0);
        assert_eq!(eq[1], 10_000.0);

        // floor(10000 * 0.5 / 11), -floor(10000 * 0.5 / 31)
        assert_eq!(result.portfolio.shares, vec![454, 0, -161]);
        assert_relative_eq!(result.portfolio.cash, 15.0, epsilon = 1e-9);
        // 15 + 454 * 12 - 161 * 32
        assert_relative_eq!(eq[2], 311.0, epsilon = 1e-9);
    }
}

mod warm_up_gating {
    use super::*;

    #[test]
    fn decisions_start_after_lookback() {
        let lookback = 3;
        let mut strategy = momentum(lookback, 1, 1);
        let closes = trending_closes(8);

        for (i, c) in closes.iter().enumerate() {
            let phase = strategy.phase();
            let decision = strategy.decide(&row(i, c)).unwrap();
            if i <= lookback {
                assert_eq!(phase, Phase::WarmUp, "bar {i}");
                assert!(decision.is_no_change(), "bar {i}");
            } else {
                assert_eq!(phase, Phase::Active, "bar {i}");
                assert_eq!(
                    decision.weights().unwrap().as_slice(),
                    &[0.0, -0.5, 0.5],
                    "bar {i}"
                );
            }
        }
    }

    #[test]
    fn recursive_feature_does_not_extend_warm_up_past_its_lookback() {
        let mut strategy = Strategy::new(
            "mixed",
            vec![
                Box::new(RateOfChange::new(2)),
                Box::new(ExponentialAverage::new(5)),
            ],
            Box::new(LongShort::new("roc", 1, 1)),
            None,
            &universe(&ABC),
        )
        .unwrap();
        assert_eq!(strategy.required_lookback(), 5);

        let closes = trending_closes(7);
        let decisions: Vec<Decision> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| strategy.decide(&row(i, c)).unwrap())
            .collect();
        assert!(decisions[..6].iter().all(Decision::is_no_change));
        assert!(!decisions[6].is_no_change());
    }
}

mod decision_latency {
    use super::*;

    #[test]
    fn first_fill_uses_next_bar_close() {
        // lookback 3: first decision on bar 4, filled on bar 5
        let panel = make_panel(&ABC, &trending_closes(6));
        let mut strategy = momentum(3, 1, 1);
        let result = run_backtest(&panel, &mut strategy, &config(0.0)).unwrap();

        assert_eq!(result.rebalances.len(), 1);
        assert_eq!(result.rebalances[0].time, day(5));
        // bar 5 closes: B = 51, C = 30
        assert_eq!(result.portfolio.shares, vec![0, -98, 166]);
        assert!(equities(&result).iter().all(|&e| e == 10_000.0));
    }

    #[test]
    fn recorded_equity_ignores_same_bar_decision() {
        let panel = make_panel(&ABC, &trending_closes(5));
        let mut idle = ScriptedSource::new(vec![]);
        let mut active = ScriptedSource::new(vec![
            Decision::NoChange,
            Decision::NoChange,
            rebalance(&[0.5, 0.0, 0.5]),
        ]);
        let baseline = run_backtest(&panel, &mut idle, &config(0.005)).unwrap();
        let traded = run_backtest(&panel, &mut active, &config(0.005)).unwrap();

        // the decision of bar 2 shows up from bar 3 on
        assert_eq!(equities(&baseline)[..=2], equities(&traded)[..=2]);
        assert_ne!(equities(&baseline)[3], equities(&traded)[3]);
        assert_eq!(traded.rebalances[0].time, day(3));
    }
}

mod commission {
    use super::*;

    #[test]
    fn higher_commission_never_increases_final_equity() {
        let panel = make_panel(&ABC, &trending_closes(20));
        let zero = broker::lookup("ZERO").unwrap().commission_per_share;
        let ib = broker::lookup("IB").unwrap().commission_per_share;

        let free = run_backtest(&panel, &mut momentum(1, 1, 0), &config(zero)).unwrap();
        let paid = run_backtest(&panel, &mut momentum(1, 1, 0), &config(ib)).unwrap();

        assert_eq!(free.total_commission(), 0.0);
        assert!(paid.total_commission() > 0.0);
        assert!(paid.final_equity() < free.final_equity());
    }

    #[test]
    fn commission_charged_on_share_delta_only() {
        let panel = make_panel(&ABC, &constant_closes(4));
        let mut source = ScriptedSource::new(vec![
            rebalance(&[1.0, 0.0, 0.0]),
            rebalance(&[1.0, 0.0, 0.0]),
        ]);
        let result = run_backtest(&panel, &mut source, &config(0.01)).unwrap();

        assert_eq!(result.rebalances[0].turnover, 1_000);
        assert_relative_eq!(result.rebalances[0].commission, 10.0, epsilon = 1e-9);
        // value after the first fill is 9990: target 999 shares, one sold
        assert_eq!(result.rebalances[1].turnover, 1);
        assert_eq!(result.portfolio.shares, vec![999, 0, 0]);
    }
}

mod zero_turnover {
    use super::*;

    #[test]
    fn empty_legs_never_trade() {
        let panel = make_panel(&ABC, &trending_closes(15));
        let mut strategy = momentum(2, 0, 0);
        let result = run_backtest(&panel, &mut strategy, &config(0.005)).unwrap();

        assert!(result.rebalances.is_empty());
        assert_eq!(result.portfolio.shares, vec![0, 0, 0]);
        assert_eq!(result.final_equity(), 10_000.0);
        assert_eq!(result.portfolio.cash, 10_000.0);
    }
}

mod tie_break {
    use super::*;

    #[test]
    fn tied_factors_give_bit_identical_weights() {
        let closes = constant_closes(6);
        let run = || {
            let mut strategy = momentum(1, 1, 1);
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| strategy.decide(&row(i, c)).unwrap())
                .collect::<Vec<Decision>>()
        };
        let first = run();
        let second = run();

        for (a, b) in first.iter().zip(&second) {
            match (a.weights(), b.weights()) {
                (Some(wa), Some(wb)) => {
                    let bits_a: Vec<u64> = wa.as_slice().iter().map(|w| w.to_bits()).collect();
                    let bits_b: Vec<u64> = wb.as_slice().iter().map(|w| w.to_bits()).collect();
                    assert_eq!(bits_a, bits_b);
                    // equal factors keep universe order: A shorted, C bought
                    assert_eq!(wa.as_slice(), &[-0.5, 0.0, 0.5]);
                }
                (None, None) => {}
                _ => panic!("runs disagree on whether to rebalance"),
            }
        }
    }
}

mod data_shape {
    use super::*;

    #[test]
    fn missing_timestamp_is_reported_not_filled() {
        let full = series(&[1.0, 2.0, 3.0]);
        let gappy: Vec<TimedBar> = series(&[1.0, 2.0, 3.0])
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != 1)
            .map(|(_, b)| b)
            .collect();

        let err = PricePanel::assemble(universe(&["A", "B"]), vec![full, gappy]).unwrap_err();
        match err {
            AtsimError::DataShape { reason } => assert!(reason.contains('B'), "{reason}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strategy_rejects_row_of_wrong_width() {
        let mut strategy = momentum(1, 1, 1);
        let err = strategy.decide(&row(0, &[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, AtsimError::DataShape { .. }));
    }
}
