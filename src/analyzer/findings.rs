use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref SENTENCE: Regex = Regex::new(r"[^.!?]+[.!?]*").expect("static regex");
}

/// How completion text is cut into individual findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingGranularity {
    /// Whitespace-separated tokens.
    #[default]
    Token,
    Sentence,
    Line,
}

impl FindingGranularity {
    pub fn split(&self, text: &str) -> Vec<String> {
        match self {
            FindingGranularity::Token => text.split_whitespace().map(str::to_string).collect(),
            FindingGranularity::Sentence => SENTENCE
                .find_iter(text)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            FindingGranularity::Line => text
                .lines()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}
