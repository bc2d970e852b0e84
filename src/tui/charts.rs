use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::PlotView;

const CURVE_COLORS: [Color; 2] = [Color::Green, Color::Cyan];

pub fn curve_color(idx: usize) -> Color {
    CURVE_COLORS[idx % CURVE_COLORS.len()]
}

/// Axis bounds covering every curve, with a little headroom on latency.
fn bounds(view: &PlotView) -> ([f64; 2], [f64; 2]) {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    for curve in &view.curves {
        let pairs = std::iter::once(&curve.analysis.samples).chain(curve.raw.as_ref());
        for pair in pairs {
            for (px, py) in pair.points() {
                x = [x[0].min(px), x[1].max(px)];
                y = [y[0].min(py), y[1].max(py)];
            }
        }
        let t = curve.analysis.knee.threshold_latency;
        y = [y[0].min(t), y[1].max(t)];
    }
    if x[1] <= x[0] {
        x[1] = x[0] + 1.0;
    }
    let pad = ((y[1] - y[0]) * 0.05).max(f64::EPSILON);
    ([x[0], x[1]], [(y[0] - pad).max(0.0), y[1] + pad])
}

fn axis_labels(b: [f64; 2]) -> Vec<Span<'static>> {
    let mid = 0.5 * (b[0] + b[1]);
    vec![
        Span::raw(format!("{:.1}", b[0])),
        Span::raw(format!("{:.1}", mid)),
        Span::raw(format!("{:.1}", b[1])),
    ]
}

/// Latency-vs-throughput chart with half-latency lines and knee markers.
pub fn draw_curve_chart(area: Rect, f: &mut Frame, view: &PlotView, show_threshold: bool) {
    let (xb, yb) = bounds(view);

    // Series storage must outlive the datasets borrowing it.
    struct Series {
        name: String,
        points: Vec<(f64, f64)>,
        color: Color,
        graph: GraphType,
        marker: symbols::Marker,
    }
    let mut series: Vec<Series> = Vec::new();

    for (idx, curve) in view.curves.iter().enumerate() {
        let color = curve_color(idx);
        let knee = &curve.analysis.knee;
        let source = &curve.analysis.source;

        if let Some(raw) = &curve.raw {
            series.push(Series {
                name: format!("{source} (raw)"),
                points: raw.points(),
                color: Color::DarkGray,
                graph: GraphType::Scatter,
                marker: symbols::Marker::Dot,
            });
        }
        series.push(Series {
            name: match curve.analysis.smooth_window {
                Some(w) if w > 1 => format!("{source} (smoothed, w={w})"),
                _ => source.clone(),
            },
            points: curve.analysis.samples.points(),
            color,
            graph: GraphType::Line,
            marker: symbols::Marker::Braille,
        });
        if show_threshold {
            series.push(Series {
                name: format!("half-latency {:.3}", knee.threshold_latency),
                points: vec![(xb[0], knee.threshold_latency), (xb[1], knee.threshold_latency)],
                color: Color::Yellow,
                graph: GraphType::Line,
                marker: symbols::Marker::Braille,
            });
        }
        series.push(Series {
            name: format!("ATP {:.3}", knee.atp_throughput),
            points: vec![(knee.atp_throughput, yb[0]), (knee.atp_throughput, knee.knee_latency)],
            color: Color::Magenta,
            graph: GraphType::Line,
            marker: symbols::Marker::Braille,
        });
        series.push(Series {
            name: String::new(),
            points: vec![(knee.atp_throughput, knee.knee_latency)],
            color: Color::Red,
            graph: GraphType::Scatter,
            marker: symbols::Marker::Block,
        });
    }

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            let ds = Dataset::default()
                .marker(s.marker)
                .graph_type(s.graph)
                .style(Style::default().fg(s.color))
                .data(&s.points);
            if s.name.is_empty() {
                ds
            } else {
                ds.name(s.name.clone())
            }
        })
        .collect();

    let title = view
        .title
        .clone()
        .unwrap_or_else(|| "Latency vs Throughput (Half-Latency Rule)".to_string());
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                ))),
        )
        .x_axis(
            Axis::default()
                .title("throughput")
                .style(Style::default().fg(Color::Gray))
                .bounds(xb)
                .labels(axis_labels(xb)),
        )
        .y_axis(
            Axis::default()
                .title(format!("latency ({})", view.latency_units))
                .style(Style::default().fg(Color::Gray))
                .bounds(yb)
                .labels(axis_labels(yb)),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knee::analyze;
    use crate::model::{Analysis, Rule};
    use crate::tui::PlotCurve;

    #[test]
    fn bounds_include_threshold_and_samples() {
        let (samples, knee) =
            analyze(&[100.0, 200.0, 300.0], &[1.0, 1.5, 4.0], Rule::DoubleMin, None).unwrap();
        let view = PlotView {
            title: None,
            latency_units: "ms".to_string(),
            curves: vec![PlotCurve {
                analysis: Analysis {
                    source: "a".to_string(),
                    smooth_window: None,
                    samples,
                    knee,
                },
                raw: None,
            }],
            summary: String::new(),
        };
        let (xb, yb) = bounds(&view);
        assert_eq!(xb, [100.0, 300.0]);
        assert!(yb[0] <= 1.0 && yb[1] >= 4.0);
    }
}
