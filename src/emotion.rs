//! Keyword-based emotion classifier.
//!
//! Maps a free-text reflection to one of five coarse emotion labels by
//! substring lookup against fixed keyword lists. Categories are tested in
//! table order and the first hit wins. Confidence values are static per
//! category, not computed from the input.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Emotion labels, serialized exactly as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Emotion {
    Anxious,
    Happy,
    Sad,
    Angry,
    Neutral,
}

/// Confidence reported when no keyword matches.
pub const NEUTRAL_CONFIDENCE: f64 = 0.70;

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anxious => "Anxious",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Fixed confidence attached to this label.
    pub fn confidence(&self) -> f64 {
        match self {
            Emotion::Anxious => 0.87,
            Emotion::Happy => 0.92,
            Emotion::Sad => 0.88,
            Emotion::Angry => 0.86,
            Emotion::Neutral => NEUTRAL_CONFIDENCE,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the keyword table.
#[derive(Debug)]
pub struct Category {
    pub emotion: Emotion,
    pub keywords: &'static [&'static str],
}

impl Category {
    /// `text` must already be lowercased.
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

// Order is match priority: Anxious > Happy > Sad > Angry.
static KEYWORD_TABLE: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category {
            emotion: Emotion::Anxious,
            keywords: &["nervous", "worried", "anxious", "tense", "scared"],
        },
        Category {
            emotion: Emotion::Happy,
            keywords: &["happy", "excited", "joy", "delighted", "great"],
        },
        Category {
            emotion: Emotion::Sad,
            keywords: &["sad", "upset", "cry", "lonely", "depressed"],
        },
        Category {
            emotion: Emotion::Angry,
            keywords: &["angry", "frustrated", "mad", "irritated"],
        },
    ]
});

/// The ordered keyword table, highest priority first.
pub fn keyword_table() -> &'static [Category] {
    &KEYWORD_TABLE
}

/// Result of classifying one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Classification {
    pub emotion: Emotion,
    pub confidence: f64,
}

impl From<Emotion> for Classification {
    fn from(emotion: Emotion) -> Self {
        Classification {
            emotion,
            confidence: emotion.confidence(),
        }
    }
}

/// Classifies `text` into an emotion label.
///
/// Matching is case-insensitive plain substring containment, so keywords
/// embedded in longer words count ("scaredycat" hits "scared"). Never fails;
/// text with no keyword at all is `Neutral`.
pub fn classify(text: &str) -> Classification {
    let lowercase_text = text.to_lowercase();

    KEYWORD_TABLE
        .iter()
        .find(|category| category.matches(&lowercase_text))
        .map(|category| category.emotion)
        .unwrap_or(Emotion::Neutral)
        .into()
}
