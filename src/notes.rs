/*
Playable Note Range
===================

The keyboard maps onto a fixed table of thirteen notes: middle C (MIDI 60)
up to the C one octave above (MIDI 72). Frequencies are the conventional
equal-temperament values rounded to two decimals, matching the readout
precision on the scope.

The MIDI formula: note_number = 12 * (octave + 1) + semitone
Where semitone: C=0, C#=1, D=2, ..., B=11
*/

// Sharps read as Cs4 rather than CS4.
#![allow(non_upper_case_globals)]

/// MIDI-style note identifier.
pub type NoteId = u8;

// The playable range, low to high.
pub const C4: NoteId = 60;
pub const Cs4: NoteId = 61;
pub const D4: NoteId = 62;
pub const Ds4: NoteId = 63;
pub const E4: NoteId = 64;
pub const F4: NoteId = 65;
pub const Fs4: NoteId = 66;
pub const G4: NoteId = 67;
pub const Gs4: NoteId = 68;
pub const A4: NoteId = 69; // A440 tuning reference
pub const As4: NoteId = 70;
pub const B4: NoteId = 71;
pub const C5: NoteId = 72;

/// Lowest note in the table.
pub const LOWEST: NoteId = C4;
/// Highest note in the table.
pub const HIGHEST: NoteId = C5;

/// Fundamental frequency in Hz for a note in the playable range.
///
/// Returns `None` outside the table; input collaborators are expected to
/// pre-filter, so callers treat `None` as "ignore this event".
pub fn frequency(note: NoteId) -> Option<f32> {
    let hz = match note {
        C4 => 261.63,
        Cs4 => 277.18,
        D4 => 293.66,
        Ds4 => 311.13,
        E4 => 329.63,
        F4 => 349.23,
        Fs4 => 369.99,
        G4 => 392.00,
        Gs4 => 415.30,
        A4 => 440.00,
        As4 => 466.16,
        B4 => 493.88,
        C5 => 523.25,
        _ => return None,
    };
    Some(hz)
}

const SEMITONE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Human-readable note name, octave numbered so that MIDI 60 is "C4".
pub fn name(note: NoteId) -> String {
    let semitone = SEMITONE_NAMES[(note % 12) as usize];
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", semitone, octave)
}
