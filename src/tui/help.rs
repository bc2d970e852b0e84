use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(pad),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("Esc", "         ", "Close help / quit"),
        key_line("t", "           ", "Toggle half-latency line"),
        key_line("y", "           ", "Copy text report to clipboard"),
        key_line("?", "           ", "Show this help"),
        Line::from(""),
        Line::from("Chart:"),
        Line::from("  Yellow line is the half-latency threshold, the magenta"),
        Line::from("  line and red marker sit at the knee (ATP)."),
        Line::from("  Gray dots are unsmoothed samples when --smooth is set."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
