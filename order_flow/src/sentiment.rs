//! Sentiment seam and the market barometer built on top of it.
//!
//! The classifier itself is injected through [`SentimentClassifier`]; this
//! module only knows how to turn a handful of classified headlines into a
//! [`Stance`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Headlines assessed when no catalysts are configured.
pub const DEFAULT_CATALYSTS: [&str; 3] = [
    "Fed signals neutral stance on interest rates for Q1",
    "Geopolitical tensions in the Middle East drive gold demand",
    "Institutional buy orders detected at major support levels",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        })
    }
}

impl FromStr for SentimentLabel {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(ClassifierError::UnknownLabel(other.to_string())),
        }
    }
}

/// A label with the classifier's confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("cannot classify empty text")]
    EmptyText,

    #[error("unknown sentiment label: {0}")]
    UnknownLabel(String),

    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Maps free text to a sentiment label and confidence.
///
/// Implementations must be shareable across threads so a single instance can
/// live for the whole process.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentScore, ClassifierError>;
}

/// Overall market stance derived from the catalysts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Bullish,
    Neutral,
    Bearish,
}

impl Stance {
    /// Two or more positive catalysts is bullish, none is bearish, anything else neutral.
    pub fn from_bullish_count(bullish: usize) -> Self {
        match bullish {
            0 => Stance::Bearish,
            1 => Stance::Neutral,
            _ => Stance::Bullish,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Stance::Bullish => "STANCE: BULLISH (Buy Blocks Strong)",
            Stance::Neutral => "STANCE: NEUTRAL (No Action)",
            Stance::Bearish => "STANCE: BEARISH (Sell Blocks Heavy)",
        }
    }
}

/// One classified headline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalyst {
    pub text: String,
    pub sentiment: SentimentScore,
}

/// Classified catalysts plus the stance they imply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Barometer {
    pub catalysts: Vec<Catalyst>,
    pub stance: Stance,
}

impl Barometer {
    /// Classifies every catalyst in order and derives the stance.
    pub fn assess<C, S>(classifier: &C, catalysts: &[S]) -> Result<Self, ClassifierError>
    where
        C: SentimentClassifier + ?Sized,
        S: AsRef<str>,
    {
        let catalysts = catalysts
            .iter()
            .map(|text| {
                let text = text.as_ref();
                Ok(Catalyst {
                    text: text.to_string(),
                    sentiment: classifier.classify(text)?,
                })
            })
            .collect::<Result<Vec<_>, ClassifierError>>()?;

        let bullish = catalysts
            .iter()
            .filter(|c| c.sentiment.label == SentimentLabel::Positive)
            .count();

        Ok(Self {
            catalysts,
            stance: Stance::from_bullish_count(bullish),
        })
    }

    pub fn bullish_count(&self) -> usize {
        self.catalysts
            .iter()
            .filter(|c| c.sentiment.label == SentimentLabel::Positive)
            .count()
    }
}
