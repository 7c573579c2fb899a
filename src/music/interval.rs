/// Named intervals of one octave, by semitone offset from the root.
pub const INTERVALS: [(&str, u8); 13] = [
    ("unison", 0),
    ("minor_second", 1),
    ("major_second", 2),
    ("minor_third", 3),
    ("major_third", 4),
    ("fourth", 5),
    ("augmented_fourth", 6),
    ("fifth", 7),
    ("minor_sixth", 8),
    ("major_sixth", 9),
    ("minor_seventh", 10),
    ("major_seventh", 11),
    ("octave", 12),
];

/// Alternative names. "seventh" means the major seventh here.
pub const ALIASES: [(&str, u8); 5] = [
    ("second", 2),
    ("third", 4),
    ("diminished_fifth", 6),
    ("sixth", 9),
    ("seventh", 11),
];

/// Highest semitone offset in an octave.
pub const MAX_SEMITONE: u8 = 12;

/// Semitone offset for an interval name, alias or `semitoneN` spelling.
pub fn semitones(name: &str) -> Option<u8> {
    INTERVALS
        .iter()
        .chain(ALIASES.iter())
        .find(|(n, _)| *n == name)
        .map(|&(_, s)| s)
        .or_else(|| {
            name.strip_prefix("semitone")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|&s| s <= MAX_SEMITONE)
        })
}

/// Canonical name of a semitone offset.
pub fn name(semitone: u8) -> Option<&'static str> {
    INTERVALS.get(semitone as usize).map(|&(n, _)| n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(semitones("fifth"), Some(7));
        assert_eq!(semitones("seventh"), Some(11));
        assert_eq!(semitones("semitone3"), Some(3));
        assert_eq!(semitones("semitone13"), None);
        assert_eq!(semitones("ninth"), None);
        assert_eq!(name(6), Some("augmented_fourth"));
        assert_eq!(name(13), None);
    }

    #[test]
    fn table_is_in_semitone_order() {
        for (i, &(_, s)) in INTERVALS.iter().enumerate() {
            assert_eq!(s as usize, i);
        }
    }
}
