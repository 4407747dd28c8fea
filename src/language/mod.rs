//! Input language detection
//!
//! A deliberately small heuristic: Urdu script is recognised by the Arabic
//! Unicode block, Roman Urdu by a closed list of common words written in
//! Latin letters, and everything else is English. The classifier sits behind
//! [`LanguageClassifier`] so a real language-ID model can replace it later.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Words that mark Latin-script input as Roman Urdu.
pub const ROMAN_URDU_MARKERS: [&str; 9] = [
    "kaise", "ap", "mein", "ho", "kya", "acha", "nahi", "haan", "theek",
];

static ARABIC_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{0600}-\x{06FF}]").expect("valid Arabic-script pattern"));

static LATIN_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]").expect("valid Latin pattern"));

// Whole Latin words only: "how" must not match "ho", nor "apple" match "ap".
// ASCII boundaries, so a marker glued to Arabic script still counts.
static MARKER_WORD: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)(?-u:\b)(?:{})(?-u:\b)",
        ROMAN_URDU_MARKERS.join("|")
    );
    Regex::new(&pattern).expect("valid marker pattern")
});

/// Language/script of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    English,
    Urdu,
    RomanUrdu,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::English, Label::Urdu, Label::RomanUrdu];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::English => "english",
            Label::Urdu => "urdu",
            Label::RomanUrdu => "roman_urdu",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown language label: {0}")]
pub struct UnknownLabel(String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" => Ok(Label::English),
            "urdu" => Ok(Label::Urdu),
            "roman_urdu" => Ok(Label::RomanUrdu),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// Anything that can label a message. Must never fail.
pub trait LanguageClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Label;
}

/// The regex heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl LanguageClassifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> Label {
        classify(text)
    }
}

/// Label `text` with the heuristic.
///
/// Urdu requires Arabic-script characters *and* no Latin letters at all, so
/// mixed-script input is always English or Roman Urdu. Input with neither
/// script (empty, digits, punctuation) falls back to English.
pub fn classify(text: &str) -> Label {
    let has_arabic = ARABIC_SCRIPT.is_match(text);
    let has_latin = LATIN_LETTER.is_match(text);

    if has_arabic && !has_latin {
        Label::Urdu
    } else if has_latin {
        if MARKER_WORD.is_match(text) {
            Label::RomanUrdu
        } else {
            Label::English
        }
    } else {
        Label::English
    }
}
