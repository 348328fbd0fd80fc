pub mod grid;

pub use grid::{render_grid, GridState};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::sequencer::SequencerState;

/// Render the transport header: play state, tempo, meter, tap count.
pub fn render_transport(frame: &mut Frame, area: Rect, state: &SequencerState, taps: usize) {
    let status = if state.playing { "PLAYING" } else { "STOPPED" };
    let status_color = if state.playing {
        Color::Green
    } else {
        Color::Red
    };

    let mut spans = vec![
        Span::styled(format!(" {status} "), Style::default().fg(status_color).bold()),
        Span::raw("  "),
        Span::styled(
            format!("{:>3} BPM", state.bpm as u32),
            Style::default().fg(Color::White).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "{} steps x{}",
                state.meter.beats_per_cycle(),
                state.meter.subdivision()
            ),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if taps > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("tap {taps}/5"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Render the key-hint footer.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let help = " space play/stop | t tap | arrows move | enter toggle | c clear row | f fill row | b seed beat | +/- bpm | [/] steps | {/} subdiv | q quit";
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
