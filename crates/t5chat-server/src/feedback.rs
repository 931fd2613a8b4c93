//! The response-rating control shown under the transcript.
//!
//! Ratings and written feedback stay in the session: they are not stored,
//! forwarded, or logged with their content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the visitor rated the latest responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    #[default]
    Excellent,
    Good,
    Neutral,
    Poor,
}

impl Rating {
    /// Options in display order.
    pub const ALL: [Rating; 4] = [Rating::Excellent, Rating::Good, Rating::Neutral, Rating::Poor];

    pub fn label(self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Neutral => "Neutral",
            Rating::Poor => "Poor",
        }
    }

    /// Only a poor rating asks for written feedback.
    pub fn wants_elaboration(self) -> bool {
        self == Rating::Poor
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating {0:?} (expected Excellent, Good, Neutral or Poor)")]
pub struct UnknownRating(pub String);

impl FromStr for Rating {
    type Err = UnknownRating;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rating::ALL
            .into_iter()
            .find(|rating| rating.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRating(s.to_string()))
    }
}

/// State of the rating control for one session.
#[derive(Debug, Clone, Default)]
pub struct FeedbackState {
    rating: Rating,
    draft: String,
    acknowledged: bool,
}

impl FeedbackState {
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Text typed into the feedback box so far.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether the feedback box and its submit button are shown.
    pub fn elaboration_visible(&self) -> bool {
        self.rating.wants_elaboration()
    }

    pub fn select(&mut self, rating: Rating) {
        self.rating = rating;
        self.acknowledged = false;
    }

    /// Submit the feedback box. Returns `false`, changing nothing, when the
    /// box is not shown.
    pub fn submit(&mut self, text: &str) -> bool {
        if !self.elaboration_visible() {
            return false;
        }
        tracing::debug!(rating = %self.rating, chars = text.chars().count(), "feedback submitted");
        self.draft = text.to_string();
        self.acknowledged = true;
        true
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Clear the acknowledgement once it has been shown.
    pub fn take_acknowledgement(&mut self) -> bool {
        std::mem::take(&mut self.acknowledged)
    }
}
