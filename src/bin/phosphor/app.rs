//! Phosphor - application state and event loop.
//!
//! Input, note lifetime and frame pacing all live here. The loop polls the
//! terminal at a few hundred hertz, forwards key events to the synth and
//! ticks the scope, which decides for itself whether the frame is due.
//!
//! Key release handling is the one platform wrinkle: terminals only report
//! releases under the kitty keyboard protocol. When the terminal supports
//! it we hold each note until its release event, exactly like a keyboard.
//! Otherwise a note sustains until its key stops repeating and the
//! auto-release timer runs out.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::supports_keyboard_enhancement;
use ratatui::{layout::Rect, DefaultTerminal, Frame};

use phosphor_synth::audio::{AudioBackend, CpalBackend};
use phosphor_synth::notes::{self, NoteId};
use phosphor_synth::scope::Scope;
use phosphor_synth::synth::Synth;

use super::input::{self, Action};
use super::ui::{self, PixelCanvas, SpectrumView};

/// How long one poll for input blocks the loop.
const POLL_INTERVAL: Duration = Duration::from_millis(4);

/// Without release events, a held note stops this long after its last
/// press or repeat. Longer than a typical keyboard repeat delay, so a held
/// key sustains instead of stuttering.
const AUTO_RELEASE: Duration = Duration::from_millis(500);

pub struct Phosphor {
    synth: Synth,
    scope: Scope,
    canvas: PixelCanvas,
    spectrum: SpectrumView,
    /// Held note keys and when each was last pressed or repeated.
    held: HashMap<NoteId, Instant>,
    /// Whether the terminal reports key releases.
    release_events: bool,
    started: Instant,
    should_quit: bool,
    dirty: bool,
}

impl Phosphor {
    /// Open the default output device. The audio stream itself starts
    /// lazily on the first note.
    pub fn new() -> EyreResult<Self> {
        let backend = CpalBackend::try_default().wrap_err("failed to open audio output")?;
        let sample_rate = backend.sample_rate();

        let scope = Scope::new();
        let background = scope.theme().background;

        Ok(Self {
            synth: Synth::new(Box::new(backend)),
            scope,
            canvas: PixelCanvas::new(0, 0, background),
            spectrum: SpectrumView::new(sample_rate),
            held: HashMap::new(),
            release_events: false,
            started: Instant::now(),
            should_quit: false,
            dirty: true,
        })
    }

    /// Run until quit. Takes the terminal ratatui has already set up.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> EyreResult<()> {
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        tracing::info!(release_events = self.release_events, "input mode");

        let result = self.event_loop(&mut terminal);

        if self.release_events {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Resize(..) => self.dirty = true,
                    _ => {}
                }
            }
            self.auto_release();
            self.frame(terminal)?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> EyreResult<()> {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let Some(action) = input::action_for(key.code) {
                    self.apply(action)?;
                }
            }
            KeyEventKind::Release => {
                if let Some(Action::Note(note)) = input::action_for(key.code) {
                    self.release_note(note);
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) -> EyreResult<()> {
        let params = self.synth.params().clone();
        match action {
            Action::Quit => self.should_quit = true,
            Action::Note(note) => {
                // Repeats refresh the hold timestamp without retriggering.
                let fresh = self.held.insert(note, Instant::now()).is_none();
                if fresh {
                    self.synth.play_note(note)?;
                }
            }
            Action::Wave(shape) => self.synth.set_wave_shape(shape),
            Action::UnisonDelta(delta) => {
                let unison = (params.unison as i64 + delta as i64).clamp(1, 8) as u32;
                self.synth.set_unison(unison);
            }
            Action::DetuneDelta(delta) => {
                self.synth
                    .set_detune_spread((params.detune_spread + delta).clamp(0.0, 100.0));
            }
            Action::PitchDelta(delta) => {
                self.synth
                    .set_pitch_shift((params.pitch_shift + delta).clamp(-100.0, 100.0));
            }
            Action::VolumeDelta(delta) => {
                self.synth
                    .set_master_volume((params.master_volume + delta).clamp(0.0, 1.0));
            }
            Action::SmoothingDelta(delta) => {
                self.synth
                    .set_smoothing((params.smoothing + delta).clamp(0.0, 0.99));
            }
            Action::RefreshDelta(delta) => {
                self.synth
                    .set_refresh_rate((params.refresh_rate + delta).clamp(1.0, 120.0));
            }
        }
        self.dirty = true;
        Ok(())
    }

    fn release_note(&mut self, note: NoteId) {
        if self.held.remove(&note).is_some() {
            self.synth.stop_note(note);
            self.dirty = true;
        }
    }

    /// Fallback note-off for terminals without release events.
    fn auto_release(&mut self) {
        if self.release_events {
            return;
        }
        let expired: Vec<NoteId> = self
            .held
            .iter()
            .filter(|(_, last)| last.elapsed() >= AUTO_RELEASE)
            .map(|(&note, _)| note)
            .collect();
        for note in expired {
            self.held.remove(&note);
            self.synth.stop_note(note);
            self.dirty = true;
        }
    }

    /// Tick the scope and redraw the terminal when anything changed.
    fn frame(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let size = terminal.size()?;
        let areas = ui::layout(Rect::new(0, 0, size.width, size.height));
        let inner = ui::scope_block().inner(areas.scope);
        let background = self.scope.theme().background;
        self.canvas
            .ensure_size(inner.width as usize, inner.height as usize * 2, background);

        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let rate = self.synth.params().refresh_rate;
        let frequency = self.synth.current_frequency();
        let drew = self.scope.tick(
            now_ms,
            rate,
            self.synth.analyser_mut(),
            frequency,
            &mut self.canvas,
        );

        if drew {
            if let Some(analyser) = self.synth.analyser_mut() {
                self.spectrum.update(analyser);
            }
        }

        if drew || self.dirty {
            terminal.draw(|frame| self.render(frame))?;
            self.dirty = false;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let areas = ui::layout(frame.area());

        let names: Vec<String> = self.synth.sounding_notes().map(notes::name).collect();
        ui::render_status(
            frame,
            areas.status,
            self.synth.params(),
            &names.join(" "),
            self.synth.current_frequency(),
        );

        let block = ui::scope_block();
        let inner = block.inner(areas.scope);
        frame.render_widget(block, areas.scope);
        frame.render_widget(&self.canvas, inner);

        ui::render_spectrum(frame, areas.spectrum, self.spectrum.data());
        ui::render_help(frame, areas.help);
    }
}
