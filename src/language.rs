/// Languages the detector can report. `Unknown` means the text carried no
/// usable alphabetic signal and no translation should be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Korean,
    English,
    Unknown,
}

impl Language {
    /// English name as used inside system prompts.
    pub fn name(self) -> &'static str {
        match self {
            Language::Korean => "Korean",
            Language::English => "English",
            Language::Unknown => "unknown",
        }
    }

    /// ISO-639-1-style short code.
    pub fn code(self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
            Language::Unknown => "unknown",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Language::Korean => "🇰🇷",
            Language::English => "🇺🇸",
            Language::Unknown => "❓",
        }
    }
}

/// A (source, target) pair plus the display indicator shown next to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub source: Language,
    pub target: Language,
    pub arrow: &'static str,
}

impl Direction {
    /// Total mapping from a detected source language to its direction.
    pub fn for_language(language: Language) -> Direction {
        match language {
            Language::Korean => Direction {
                source: Language::Korean,
                target: Language::English,
                arrow: "🇰🇷 → 🇺🇸",
            },
            Language::English => Direction {
                source: Language::English,
                target: Language::Korean,
                arrow: "🇺🇸 → 🇰🇷",
            },
            Language::Unknown => Direction {
                source: Language::Unknown,
                target: Language::Unknown,
                arrow: "❓",
            },
        }
    }

    pub fn is_known(&self) -> bool {
        self.source != Language::Unknown && self.target != Language::Unknown
    }
}

/// Classifies text as Korean or English by the fraction of Hangul syllables
/// among all alphabetic characters (Hangul + ASCII letters).
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    threshold: f64,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        LanguageDetector { threshold: 0.5 }
    }
}

impl LanguageDetector {
    pub fn new(threshold: f64) -> Self {
        LanguageDetector { threshold }
    }

    /// A tie exactly at the threshold resolves to English: Korean wins only on
    /// a strict majority.
    pub fn detect(&self, text: &str) -> Language {
        let mut korean = 0usize;
        let mut english = 0usize;
        for c in text.chars() {
            if ('\u{AC00}'..='\u{D7A3}').contains(&c) {
                korean += 1;
            } else if c.is_ascii_alphabetic() {
                english += 1;
            }
        }

        let total = korean + english;
        if total == 0 {
            return Language::Unknown;
        }

        if korean as f64 / total as f64 > self.threshold {
            Language::Korean
        } else {
            Language::English
        }
    }

    pub fn direction(&self, text: &str) -> Direction {
        Direction::for_language(self.detect(text))
    }
}
