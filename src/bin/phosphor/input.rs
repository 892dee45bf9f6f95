//! Keyboard bindings.
//!
//! The middle row plays an octave of C major starting at middle C, with
//! the row above supplying the sharps, piano style:
//!
//! ```text
//!   W E   T Y U       C#4 D#4   F#4 G#4 A#4
//!  A S D F G H J K   C4 D4 E4 F4 G4 A4 B4 C5
//! ```
//!
//! Remaining keys adjust one parameter each in small steps.

use crossterm::event::KeyCode;
use phosphor_synth::notes::{self, NoteId};
use phosphor_synth::params::WaveShape;

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Note(NoteId),
    Wave(WaveShape),
    UnisonDelta(i32),
    DetuneDelta(f32),
    PitchDelta(f32),
    VolumeDelta(f32),
    SmoothingDelta(f32),
    RefreshDelta(f32),
}

pub fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(c) => action_for_char(c),
        _ => None,
    }
}

fn action_for_char(c: char) -> Option<Action> {
    if let Some(note) = note_for_key(c) {
        return Some(Action::Note(note));
    }
    let action = match c.to_ascii_lowercase() {
        'q' => Action::Quit,
        '1' => Action::Wave(WaveShape::Sine),
        '2' => Action::Wave(WaveShape::Square),
        '3' => Action::Wave(WaveShape::Sawtooth),
        '4' => Action::Wave(WaveShape::Triangle),
        'o' => Action::UnisonDelta(-1),
        'p' => Action::UnisonDelta(1),
        '-' => Action::DetuneDelta(-1.0),
        '=' => Action::DetuneDelta(1.0),
        ';' => Action::PitchDelta(-5.0),
        '\'' => Action::PitchDelta(5.0),
        ',' => Action::VolumeDelta(-0.05),
        '.' => Action::VolumeDelta(0.05),
        'z' => Action::SmoothingDelta(-0.05),
        'x' => Action::SmoothingDelta(0.05),
        'c' => Action::RefreshDelta(-5.0),
        'v' => Action::RefreshDelta(5.0),
        _ => return None,
    };
    Some(action)
}

/// Piano-row note for a key, if it is one of the thirteen note keys.
pub fn note_for_key(c: char) -> Option<NoteId> {
    let note = match c.to_ascii_lowercase() {
        'a' => notes::C4,
        'w' => notes::Cs4,
        's' => notes::D4,
        'e' => notes::Ds4,
        'd' => notes::E4,
        'f' => notes::F4,
        't' => notes::Fs4,
        'g' => notes::G4,
        'y' => notes::Gs4,
        'h' => notes::A4,
        'u' => notes::As4,
        'j' => notes::B4,
        'k' => notes::C5,
        _ => return None,
    };
    Some(note)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_row_spans_the_playable_octave() {
        assert_eq!(note_for_key('a'), Some(notes::C4));
        assert_eq!(note_for_key('h'), Some(notes::A4));
        assert_eq!(note_for_key('k'), Some(notes::C5));
        assert_eq!(note_for_key('K'), Some(notes::C5), "case must not matter");
        assert_eq!(note_for_key('b'), None);
    }

    #[test]
    fn note_keys_win_over_parameter_keys() {
        // 'c' and 'v' adjust the refresh rate, but only because they are
        // not note keys; every note key must map to its note.
        for key in ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'] {
            assert!(
                matches!(action_for_char(key), Some(Action::Note(_))),
                "key {:?} must play a note",
                key
            );
        }
    }

    #[test]
    fn escape_and_q_both_quit() {
        assert_eq!(action_for(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action_for(KeyCode::Char('q')), Some(Action::Quit));
    }
}
