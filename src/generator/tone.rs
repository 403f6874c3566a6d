//! Article tone and length selectors

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Stylistic register; selects which template pool is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Informative,
    Analytical,
    Persuasive,
    Entertaining,
    Conversational,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Informative,
        Tone::Analytical,
        Tone::Persuasive,
        Tone::Entertaining,
        Tone::Conversational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informative => "informative",
            Self::Analytical => "analytical",
            Self::Persuasive => "persuasive",
            Self::Entertaining => "entertaining",
            Self::Conversational => "conversational",
        }
    }

    /// Position in [`Tone::ALL`]
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Strict, case-insensitive parse
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == needle)
    }

    /// Parse, downgrading anything unrecognized to [`Tone::Informative`]
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!(tone = %s, "Unknown tone, falling back to informative");
            Self::Informative
        })
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(Tone::as_str).collect();
            format!("unknown tone '{s}' (expected one of: {})", known.join(", "))
        })
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested article length, expressed as a body-paragraph range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Inclusive range of body paragraphs before clamping to template variety
    pub fn paragraph_range(&self) -> RangeInclusive<usize> {
        match self {
            Self::Short => 2..=3,
            Self::Medium => 4..=6,
            Self::Long => 7..=10,
        }
    }

    /// Approximate word count shown to users
    pub fn word_hint(&self) -> &'static str {
        match self {
            Self::Short => "300-500 words",
            Self::Medium => "500-800 words",
            Self::Long => "800-1200 words",
        }
    }

    /// Strict parse. Accepts `short` as well as labels like `Short (300-500 words)`.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|l| {
            needle == l.as_str()
                || needle
                    .strip_prefix(l.as_str())
                    .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('('))
        })
    }

    /// Parse, treating anything unrecognized as [`Length::Long`]
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!(length = %s, "Unknown length, falling back to long");
            Self::Long
        })
    }
}

impl std::str::FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown length '{s}' (expected short, medium or long)"))
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_parse() {
        assert_eq!(Tone::parse("Analytical"), Some(Tone::Analytical));
        assert_eq!(Tone::parse(" entertaining "), Some(Tone::Entertaining));
        assert_eq!(Tone::parse("sarcastic"), None);
    }

    #[test]
    fn test_tone_parse_lossy_falls_back() {
        assert_eq!(Tone::parse_lossy("sarcastic"), Tone::Informative);
        assert_eq!(Tone::parse_lossy(""), Tone::Informative);
        assert_eq!(Tone::parse_lossy("persuasive"), Tone::Persuasive);
    }

    #[test]
    fn test_tone_index_matches_all() {
        for (i, tone) in Tone::ALL.iter().enumerate() {
            assert_eq!(tone.index(), i);
        }
    }

    #[test]
    fn test_length_ranges() {
        assert_eq!(Length::Short.paragraph_range(), 2..=3);
        assert_eq!(Length::Medium.paragraph_range(), 4..=6);
        assert_eq!(Length::Long.paragraph_range(), 7..=10);
    }

    #[test]
    fn test_length_parse() {
        assert_eq!(Length::parse("short"), Some(Length::Short));
        assert_eq!(Length::parse("Medium (500-800 words)"), Some(Length::Medium));
        assert_eq!(Length::parse("LONG"), Some(Length::Long));
        assert_eq!(Length::parse("shortish"), None);
        assert_eq!(Length::parse_lossy("huge"), Length::Long);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("conversational".parse::<Tone>(), Ok(Tone::Conversational));
        assert!("sarcastic".parse::<Tone>().unwrap_err().contains("informative"));
        assert!("huge".parse::<Length>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Tone::Analytical).unwrap(), "\"analytical\"");
        let length: Length = serde_json::from_str("\"short\"").unwrap();
        assert_eq!(length, Length::Short);
    }
}
