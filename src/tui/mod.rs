mod charts;
mod clipboard;
mod help;

use crate::model::{Analysis, SamplePair};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use std::{io, time::Duration};

/// A curve to draw: the analysed (possibly smoothed) samples and, when
/// smoothing was applied, the unsmoothed curve.
pub struct PlotCurve {
    pub analysis: Analysis,
    pub raw: Option<SamplePair>,
}

pub struct PlotView {
    pub title: Option<String>,
    pub latency_units: String,
    pub curves: Vec<PlotCurve>,
    /// Text report, copied to the clipboard on `y`.
    pub summary: String,
}

struct UiState {
    view: PlotView,
    show_threshold: bool,
    show_help: bool,
    info: String,
}

/// Show the chart until the user quits.
pub fn run(view: PlotView) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let res = run_loop(view);

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn run_loop(view: PlotView) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState {
        view,
        show_threshold: true,
        show_help: false,
        info: "Press ? for help".to_string(),
    };

    loop {
        terminal
            .draw(|f| draw(f.area(), f, &state))
            .context("draw frame")?;

        if !event::poll(Duration::from_millis(250)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        match (k.modifiers, k.code) {
            (_, KeyCode::Char('q'))
            | (_, KeyCode::Esc)
            | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                if state.show_help && k.code == KeyCode::Esc {
                    state.show_help = false;
                } else {
                    return Ok(());
                }
            }
            (_, KeyCode::Char('t')) => {
                state.show_threshold = !state.show_threshold;
            }
            (_, KeyCode::Char('y')) => {
                state.info = match clipboard::copy_to_clipboard(&state.view.summary) {
                    Ok(()) => "Copied report to clipboard".to_string(),
                    Err(e) => format!("Copy failed: {e:#}"),
                };
            }
            (_, KeyCode::Char('?')) => {
                state.show_help = !state.show_help;
            }
            _ => {}
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3 + state.view.curves.len() as u16)].as_ref())
        .split(area);

    if state.show_help {
        help::draw_help(main[0], f);
    } else {
        charts::draw_curve_chart(main[0], f, &state.view, state.show_threshold);
    }

    let mut status_lines: Vec<Line> = Vec::new();
    for (idx, curve) in state.view.curves.iter().enumerate() {
        let knee = &curve.analysis.knee;
        let color = charts::curve_color(idx);
        status_lines.push(Line::from(vec![
            Span::styled(
                curve.analysis.source.clone(),
                Style::default().fg(color),
            ),
            Span::raw(format!(
                ": ATP {:.3} at {:.3} {} ({} rule, half-latency {:.3})",
                knee.atp_throughput,
                knee.knee_latency,
                state.view.latency_units,
                knee.rule,
                knee.threshold_latency
            )),
        ]));
    }
    status_lines.push(Line::from(vec![
        Span::styled("Info: ", Style::default().fg(Color::Gray)),
        Span::raw(state.info.clone()),
    ]));

    let status =
        Paragraph::new(status_lines).block(Block::default().borders(Borders::ALL).title("Knee"));
    f.render_widget(status, main[1]);
}
