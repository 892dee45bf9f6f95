//! Spectrum panel fed by the analyser's frequency bytes.

use phosphor_synth::graph::Analyser;
use phosphor_synth::FFT_SIZE;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Bins drawn, from DC upward. 256 of 1024 reaches 6 kHz at a 48 kHz
/// device, which covers the playable notes and their low harmonics.
const DISPLAY_BINS: usize = 256;

/// Holds the latest spectrum frame as chart points.
pub struct SpectrumView {
    sample_rate: f32,
    bytes: Vec<u8>,
    points: Vec<(f64, f64)>,
}

impl SpectrumView {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            bytes: Vec::new(),
            points: Vec::new(),
        }
    }

    /// Refresh from the analyser's smoothed frequency data.
    pub fn update(&mut self, analyser: &mut Analyser) {
        self.bytes.resize(analyser.bin_count(), 0);
        analyser.fill_byte_frequency(&mut self.bytes);

        let hz_per_bin = self.sample_rate as f64 / FFT_SIZE as f64;
        self.points.clear();
        self.points.extend(
            self.bytes
                .iter()
                .take(DISPLAY_BINS)
                .enumerate()
                .map(|(k, &byte)| (k as f64 * hz_per_bin, byte as f64)),
        );
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Render the spectrum chart. Bytes span the analyser's -100..-30 dBFS
/// range, so the axis labels name decibels rather than byte values.
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(spectrum);

    let max_freq = spectrum.last().map(|(f, _)| *f).unwrap_or(1.0).max(1.0);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 255.0])
                .labels(vec!["-100 dB", "-65 dB", "-30 dB"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
