//! Equal-tempered note table.
//!
//! Entry `i` is the phase increment `2^(i/12)`: note 0 plays the table at
//! one step per sample, and every 12 entries double the pitch.

/// Entries in the increment table.
pub const NOTE_COUNT: usize = 72;

/// Display names for the first 63 notes, A0 through B5.
pub const NOTE_NAMES: [&str; 63] = [
    "A0", "A#0", "B0", //
    "C1", "C#1", "D1", "D#1", "E1", "F1", "F#1", "G1", "G#1", "A1", "A#1", "B1", //
    "C2", "C#2", "D2", "D#2", "E2", "F2", "F#2", "G2", "G#2", "A2", "A#2", "B2", //
    "C3", "C#3", "D3", "D#3", "E3", "F3", "F#3", "G3", "G#3", "A3", "A#3", "B3", //
    "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", //
    "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5", "A5", "A#5", "B5",
];

/// Phase increment for note `index`, or `None` past the table.
pub fn note_increment(index: usize) -> Option<f32> {
    (index < NOTE_COUNT).then(|| libm::powf(2.0, index as f32 / 12.0))
}

/// Full increment table.
pub fn increments() -> [f32; NOTE_COUNT] {
    core::array::from_fn(|i| libm::powf(2.0, i as f32 / 12.0))
}

/// Name of note `index`, if it has one.
pub fn note_name(index: usize) -> Option<&'static str> {
    NOTE_NAMES.get(index).copied()
}

/// Index of a note by name, case-insensitive.
pub fn note_index(name: &str) -> Option<usize> {
    let name = name.trim();
    NOTE_NAMES.iter().position(|n| n.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octaves_double() {
        assert_eq!(note_increment(0), Some(1.0));
        assert_eq!(note_increment(12), Some(2.0));
        assert_eq!(note_increment(24), Some(4.0));
        assert_eq!(note_increment(60), Some(32.0));
        assert_eq!(note_increment(NOTE_COUNT), None);
    }

    #[test]
    fn test_table_matches_lookup() {
        let table = increments();
        for (i, &inc) in table.iter().enumerate() {
            assert_eq!(Some(inc), note_increment(i));
        }
        assert!(table.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_names() {
        assert_eq!(note_name(0), Some("A0"));
        assert_eq!(note_name(3), Some("C1"));
        assert_eq!(note_name(62), Some("B5"));
        assert_eq!(note_name(63), None);
        assert_eq!(note_index("a#0"), Some(1));
        assert_eq!(note_index("A4"), Some(48));
        assert_eq!(note_index("H2"), None);
    }
}
