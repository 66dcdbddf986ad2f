use ambimix::shared::DisplayState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use super::mode::TuiState;

const HELP: &str = "␣ play  ←→ vol  [] master  p all  r reset  t timer  1-9 preset  s save  d delete  q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // master + timer
            Constraint::Min(3),    // sound rows
            Constraint::Length(3), // presets
            Constraint::Length(2), // notice + help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_sounds(frame, sections[1], state, ts);
    draw_presets(frame, sections[2], state);
    draw_footer(frame, sections[3], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let icon = if state.any_playing { "▶" } else { "⏸" };
    let master = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(" {icon} master ")))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(u16::from(state.master_volume));
    frame.render_widget(master, cols[0]);

    let timer = match (&state.countdown, state.timer_minutes) {
        (Some(left), _) => left.clone(),
        (None, 0) => "off".to_string(),
        (None, m) => format!("{m} min"),
    };
    let timer = Paragraph::new(timer).block(Block::default().borders(Borders::ALL).title(" timer "));
    frame.render_widget(timer, cols[1]);
}

fn draw_sounds(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let block = Block::default().borders(Borders::ALL).title(" sounds ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(state.sounds.iter().map(|_| Constraint::Length(1)))
        .split(inner);

    for (idx, (sound, row)) in state.sounds.iter().zip(rows.iter()).enumerate() {
        let color = if sound.playing { Color::LightGreen } else { Color::DarkGray };
        let mut style = Style::default().fg(color);
        if idx == ts.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(18), Constraint::Min(10)])
            .split(*row);

        let marker = if sound.playing { "♪" } else { " " };
        frame.render_widget(Paragraph::new(format!("{marker} {}", sound.name)).style(style), cols[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .label(format!("{:>3} ({:>3})", sound.volume, sound.effective_volume))
            .percent(u16::from(sound.volume));
        frame.render_widget(gauge, cols[1]);
    }
}

fn draw_presets(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let spans: Vec<Span> = state
        .presets
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, p)| {
            let style = if p.custom { Style::default().fg(Color::Yellow) } else { Style::default() };
            Span::styled(format!(" {}:{} ", i + 1, p.name), style)
        })
        .collect();
    let presets = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" presets "));
    frame.render_widget(presets, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let notice = state.notice.as_deref().unwrap_or("");
    let lines = vec![
        Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::LightRed))),
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
