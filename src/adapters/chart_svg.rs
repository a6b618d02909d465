//! Inline SVG charts for the equity series.

use crate::domain::portfolio::EquityPoint;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

fn plot_width() -> f64 {
    CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

fn x_at(i: usize, n: usize) -> f64 {
    MARGIN_LEFT + (i as f64 / n.saturating_sub(1).max(1) as f64) * plot_width()
}

fn label(x: f64, y: f64, anchor: &str, text: &str) -> String {
    format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        x, y, anchor, text
    )
}

/// Open an SVG with axes, a title and three labels on each axis.
fn frame(title: &str, y_labels: [String; 3], curve: &[EquityPoint]) -> String {
    let bottom = CHART_HEIGHT - MARGIN_BOTTOM;
    let mut svg = format!(
        "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"#666\">{}</text>\n",
        CHART_WIDTH, title
    ));

    let axes = [
        (MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, bottom),
        (MARGIN_LEFT, bottom, CHART_WIDTH - MARGIN_RIGHT, bottom),
    ];
    for (x1, y1, x2, y2) in axes {
        svg.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
            x1, y1, x2, y2
        ));
    }

    let ys = [MARGIN_TOP + 5.0, MARGIN_TOP + plot_height() / 2.0, bottom - 5.0];
    for (y, text) in ys.iter().zip(y_labels) {
        svg.push_str(&label(MARGIN_LEFT - 5.0, *y, "end", &text));
    }

    if let (Some(first), Some(last)) = (curve.first(), curve.last()) {
        let mid = &curve[curve.len() / 2];
        let dates = [
            (MARGIN_LEFT, first.time),
            (MARGIN_LEFT + plot_width() / 2.0, mid.time),
            (CHART_WIDTH - MARGIN_RIGHT, last.time),
        ];
        for (x, time) in dates {
            svg.push_str(&label(x, CHART_HEIGHT, "middle", &time.date().to_string()));
        }
    }
    svg
}

pub fn equity_svg(curve: &[EquityPoint]) -> String {
    if curve.is_empty() {
        return String::new();
    }

    let min = curve.iter().map(|p| p.equity).fold(f64::INFINITY, f64::min);
    let max = curve.iter().map(|p| p.equity).fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(1.0);
    let y_at = |v: f64| MARGIN_TOP + plot_height() - ((v - min) / range) * plot_height();

    let path = curve
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let cmd = if i == 0 { "M" } else { "L" };
            format!("{} {:.1} {:.1}", cmd, x_at(i, curve.len()), y_at(point.equity))
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut svg = frame(
        "Equity",
        [
            format!("{:.0}", max),
            format!("{:.0}", (max + min) / 2.0),
            format!("{:.0}", min),
        ],
        curve,
    );
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>\n",
        path
    ));
    svg.push_str("</svg>");
    svg
}

/// Fractional drawdown from the running peak at each point.
pub fn drawdown_series(curve: &[EquityPoint]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    curve
        .iter()
        .map(|p| {
            peak = peak.max(p.equity);
            if peak > 0.0 { (peak - p.equity) / peak } else { 0.0 }
        })
        .collect()
}

pub fn drawdown_svg(curve: &[EquityPoint]) -> String {
    if curve.len() < 2 {
        return String::new();
    }

    let drawdowns = drawdown_series(curve);
    let deepest = drawdowns.iter().copied().fold(0.0, f64::max).max(0.01);
    let n = drawdowns.len();
    let y_at = |dd: f64| MARGIN_TOP + (dd / deepest) * plot_height();

    let mut segments = vec![format!("M {:.1} {:.1}", x_at(0, n), y_at(0.0))];
    segments.extend(
        drawdowns
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &dd)| format!("L {:.1} {:.1}", x_at(i, n), y_at(dd))),
    );
    segments.push(format!("L {:.1} {:.1} Z", x_at(n - 1, n), y_at(0.0)));

    let mut svg = frame(
        "Drawdown (%)",
        [
            "0%".to_string(),
            format!("-{:.1}%", deepest * 50.0),
            format!("-{:.1}%", deepest * 100.0),
        ],
        curve,
    );
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"rgba(239,68,68,0.3)\" stroke=\"#dc2626\" stroke-width=\"1\"/>\n",
        segments.join(" ")
    ));
    svg.push_str("</svg>");
    svg
}
