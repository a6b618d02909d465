//! Summary statistics over an equity series.

use super::portfolio::EquityPoint;

const PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub bars: usize,
    pub start_equity: f64,
    pub final_equity: f64,
    pub total_return: f64,
    /// (last / first)^(252 / bars) - 1
    pub cagr: f64,
    /// mean / sample stddev of one-bar returns, times sqrt(252)
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl Summary {
    pub fn compute(equity_curve: &[EquityPoint]) -> Self {
        let bars = equity_curve.len();
        let start_equity = equity_curve.first().map(|p| p.equity).unwrap_or(0.0);
        let final_equity = equity_curve.last().map(|p| p.equity).unwrap_or(0.0);

        let total_return = if start_equity > 0.0 {
            final_equity / start_equity - 1.0
        } else {
            0.0
        };

        let cagr = if bars > 0 && start_equity > 0.0 && final_equity > 0.0 {
            (final_equity / start_equity).powf(PERIODS_PER_YEAR / bars as f64) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        Summary {
            bars,
            start_equity,
            final_equity,
            total_return,
            cagr,
            sharpe_ratio: compute_sharpe(equity_curve),
            max_drawdown,
            max_drawdown_duration,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}

fn compute_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            if w[0].equity != 0.0 {
                w[1].equity / w[0].equity - 1.0
            } else {
                0.0
            }
        })
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * PERIODS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
