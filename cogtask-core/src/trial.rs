use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stimulus::Stimulus;

/// Condition tag of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "congruent")]
    Congruent,
    #[serde(rename = "incongruent")]
    Incongruent,
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "nogo")]
    NoGo,
    #[serde(rename = "nback")]
    Match,
    #[serde(rename = "non_nback")]
    NonMatch,
}

impl Condition {
    /// Target trials of withhold paradigms call for a response.
    pub fn is_target(&self) -> bool {
        matches!(self, Condition::Go | Condition::Match)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Congruent => "congruent",
            Condition::Incongruent => "incongruent",
            Condition::Go => "go",
            Condition::NoGo => "nogo",
            Condition::Match => "nback",
            Condition::NonMatch => "non_nback",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated trial. `index` is 1-based and contiguous within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub index: usize,
    pub stimulus: Stimulus,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Miss,
    FalseAlarm,
}

/// A participant's answer to the most recently dispatched trial. A missing
/// `choice` means the response was withheld or timed out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    #[serde(default, alias = "response")]
    pub choice: Option<String>,
    #[serde(default, alias = "reaction_time")]
    pub reaction_time_ms: Option<f64>,
    /// Ordinal the caller believes it is answering; checked when present.
    #[serde(default)]
    pub trial: Option<usize>,
}

impl ResponseEvent {
    pub fn respond(choice: impl Into<String>, reaction_time_ms: f64) -> Self {
        Self {
            choice: Some(choice.into()),
            reaction_time_ms: Some(reaction_time_ms),
            trial: None,
        }
    }

    pub fn withheld() -> Self {
        Self::default()
    }

    pub fn for_trial(mut self, trial: usize) -> Self {
        self.trial = Some(trial);
        self
    }

    pub fn has_response(&self) -> bool {
        self.choice.is_some()
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    pub stimulus: Stimulus,
    pub condition: Condition,
    pub response: Option<String>,
    pub reaction_time_ms: Option<f64>,
    pub is_correct: bool,
    pub error_type: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_choice: Option<String>,
}

impl TrialResult {
    /// Reaction time that counts toward means: correct trials with a timing.
    pub fn scored_rt(&self) -> Option<f64> {
        if self.is_correct {
            self.reaction_time_ms
        } else {
            None
        }
    }
}
