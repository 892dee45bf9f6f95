//! TUI composition for phosphor.
//!
//! Four stacked panels: a status bar with the live parameters, the scope
//! canvas, the spectrum chart and a help line. The layout is computed both
//! by the event loop (to size the pixel canvas before drawing) and by the
//! renderer, so it lives here as a plain function.

pub mod canvas;
pub mod spectrum;

pub use canvas::PixelCanvas;
pub use spectrum::{render_spectrum, SpectrumView};

use phosphor_synth::params::SynthParams;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Screen regions, top to bottom.
pub struct ScreenAreas {
    pub status: Rect,
    pub scope: Rect,
    pub spectrum: Rect,
    pub help: Rect,
}

pub fn layout(area: Rect) -> ScreenAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Status bar
            Constraint::Min(10),    // Scope canvas
            Constraint::Length(10), // Spectrum
            Constraint::Length(1),  // Help bar
        ])
        .split(area);
    ScreenAreas {
        status: chunks[0],
        scope: chunks[1],
        spectrum: chunks[2],
        help: chunks[3],
    }
}

/// The scope panel's frame; its `inner` is the canvas area.
pub fn scope_block() -> Block<'static> {
    Block::default().title(" Scope ").borders(Borders::ALL)
}

/// Render the status bar: parameters on the first line, playback state on
/// the second.
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    params: &SynthParams,
    sounding: &str,
    frequency: Option<f32>,
) {
    let block = Block::default().title(" phosphor ").borders(Borders::ALL);

    let readout = match frequency {
        Some(hz) => format!("{hz:.2} Hz"),
        None => "--- Hz".to_string(),
    };
    let playing = if sounding.is_empty() {
        "Idle".to_string()
    } else {
        format!("Playing: {sounding}")
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" Wave: {}  ", params.wave_shape.label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("Unison: {}  ", params.unison),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Detune: {:.0} ct  ", params.detune_spread),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Pitch: {:+.0} Hz  ", params.pitch_shift),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Volume: {:.2}", params.master_volume),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" Smoothing: {:.2}  ", params.smoothing),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("Refresh: {:.0} Hz  ", params.refresh_rate),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                playing,
                Style::default().fg(if sounding.is_empty() {
                    Color::DarkGray
                } else {
                    Color::Green
                }),
            ),
            Span::raw("  "),
            Span::styled(readout, Style::default().fg(Color::Cyan)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the help bar.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " [A-K] Notes  [1-4] Wave  [OP] Unison  [-=] Detune  [;'] Pitch  [,.] Volume  [ZX] Smooth  [CV] Refresh  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
