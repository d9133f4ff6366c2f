//! Liking votes used as category labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::DocumentClassifier;
use crate::error::{DocclassError, Result};

/// A user's opinion of an item.
///
/// The lower-case key (`like`, `soso`, `unlike`) doubles as the category label
/// items are trained under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikingChoice {
    Like,
    Soso,
    Unlike,
}

impl LikingChoice {
    /// Every choice, in display order.
    pub const ALL: [LikingChoice; 3] = [LikingChoice::Like, LikingChoice::Soso, LikingChoice::Unlike];

    /// The category key.
    pub fn key(&self) -> &'static str {
        match self {
            LikingChoice::Like => "like",
            LikingChoice::Soso => "soso",
            LikingChoice::Unlike => "unlike",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            LikingChoice::Like => "Like",
            LikingChoice::Soso => "Soso",
            LikingChoice::Unlike => "Unlike",
        }
    }

    /// Signed weight: like 1, soso 0, unlike -1.
    pub fn weight(&self) -> i32 {
        match self {
            LikingChoice::Like => 1,
            LikingChoice::Soso => 0,
            LikingChoice::Unlike => -1,
        }
    }

    /// `(key, label)` pairs, e.g. for rendering a radio group.
    pub fn choices() -> [(&'static str, &'static str); 3] {
        Self::ALL.map(|choice| (choice.key(), choice.label()))
    }
}

impl fmt::Display for LikingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LikingChoice {
    type Err = DocclassError;

    fn from_str(s: &str) -> Result<Self> {
        LikingChoice::ALL
            .into_iter()
            .find(|choice| choice.key() == s)
            .ok_or_else(|| {
                DocclassError::invalid_choice(format!(
                    "'{s}' is not one of like, soso, unlike"
                ))
            })
    }
}

impl From<LikingChoice> for i32 {
    fn from(choice: LikingChoice) -> Self {
        choice.weight()
    }
}

/// Train each `(choice, text)` vote under the choice's key.
///
/// `Soso` votes carry no signal and are skipped. Returns how many votes were
/// trained.
pub fn train_votes<'a, I>(classifier: &dyn DocumentClassifier, votes: I) -> Result<usize>
where
    I: IntoIterator<Item = (LikingChoice, &'a str)>,
{
    let mut trained = 0;
    for (choice, text) in votes {
        if choice == LikingChoice::Soso {
            continue;
        }
        classifier.train(text, choice.key())?;
        trained += 1;
    }

    debug!(trained, "trained liking votes");
    Ok(trained)
}
