//! JS regex flag-letter vocabulary.
//!
//! The wire carries regex flags as a string of single-letter JS flags. The
//! translation table is a fixed, lossless bijection over the supported set:
//!
//! | Letter | Flag |
//! |--------|------|
//! | `g` | global |
//! | `i` | case-insensitive |
//! | `m` | multiline |
//! | `s` | dot matches newline |
//! | `u` | unicode |
//! | `y` | sticky |
//!
//! Any other character has no wire counterpart and is rejected with the
//! offending letter, so callers can surface it without re-running.

/// Parsed form of a JS regex flag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexFlags {
    /// `g` — find all matches rather than stopping at the first.
    pub global: bool,
    /// `i` — case-insensitive matching.
    pub ignore_case: bool,
    /// `m` — `^`/`$` match line boundaries.
    pub multiline: bool,
    /// `s` — `.` matches newlines.
    pub dot_all: bool,
    /// `u` — treat the pattern as a sequence of Unicode code points.
    pub unicode: bool,
    /// `y` — sticky matching from `lastIndex`.
    pub sticky: bool,
}

impl RegexFlags {
    /// Parses a flag string, failing with the first letter outside the
    /// supported vocabulary. Repeated letters are tolerated.
    pub fn from_letters(letters: &str) -> Result<Self, char> {
        let mut flags = RegexFlags::default();
        for c in letters.chars() {
            match c {
                'g' => flags.global = true,
                'i' => flags.ignore_case = true,
                'm' => flags.multiline = true,
                's' => flags.dot_all = true,
                'u' => flags.unicode = true,
                'y' => flags.sticky = true,
                other => return Err(other),
            }
        }
        Ok(flags)
    }

    /// Renders the canonical flag string, letters in the fixed order
    /// `gimsuy`.
    pub fn to_letters(&self) -> String {
        let mut letters = String::new();
        if self.global {
            letters.push('g');
        }
        if self.ignore_case {
            letters.push('i');
        }
        if self.multiline {
            letters.push('m');
        }
        if self.dot_all {
            letters.push('s');
        }
        if self.unicode {
            letters.push('u');
        }
        if self.sticky {
            letters.push('y');
        }
        letters
    }
}
