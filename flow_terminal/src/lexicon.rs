//! Word-list sentiment classifier for financial headlines.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use order_flow::sentiment::{
    ClassifierError, SentimentClassifier, SentimentLabel, SentimentScore,
};
use tracing::debug;

const POSITIVE_WORDS: &[&str] = &[
    "accumulation", "beat", "beats", "boost", "breakout", "bullish", "buy", "buying",
    "demand", "gain", "gains", "growth", "higher", "inflows", "jump", "outperform",
    "rally", "rebound", "record", "rise", "rises", "soar", "soars", "strong",
    "support", "surge", "surges", "upgrade", "upside",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "collapse", "crash", "cut", "decline", "declines", "default",
    "downgrade", "downside", "drop", "drops", "fall", "falls", "fear", "lower",
    "loss", "losses", "miss", "misses", "outflows", "plunge", "recession",
    "resistance", "risk", "sell", "selling", "selloff", "slump", "tensions", "weak",
];

static SHARED: Lazy<LexiconClassifier> = Lazy::new(LexiconClassifier::finance);

/// Returns the process-wide classifier, building it on first use.
pub fn shared() -> &'static LexiconClassifier {
    &SHARED
}

/// Counts positive and negative words; the sign of the difference picks the label.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl LexiconClassifier {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: positive.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
            negative: negative.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// The built-in financial word lists.
    pub fn finance() -> Self {
        Self::new(POSITIVE_WORDS, NEGATIVE_WORDS)
    }

    fn tally(&self, text: &str) -> (usize, usize) {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .fold((0, 0), |(pos, neg), token| {
                if self.positive.contains(&token) {
                    (pos + 1, neg)
                } else if self.negative.contains(&token) {
                    (pos, neg + 1)
                } else {
                    (pos, neg)
                }
            })
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<SentimentScore, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyText);
        }
        let (pos, neg) = self.tally(text);
        let hits = (pos + neg) as f64;
        let net = pos as f64 - neg as f64;

        let (label, score) = if net > 0.0 {
            (SentimentLabel::Positive, 0.5 + 0.5 * net / (hits + 1.0))
        } else if net < 0.0 {
            (SentimentLabel::Negative, 0.5 + 0.5 * -net / (hits + 1.0))
        } else {
            // no hits at all is a confident neutral; cancelling hits are not
            (SentimentLabel::Neutral, 1.0 / (hits + 1.0))
        };
        debug!(positive = pos, negative = neg, %label, "classified text");
        Ok(SentimentScore { label, score })
    }
}
