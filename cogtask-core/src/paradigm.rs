use serde::{Deserialize, Serialize};

use crate::trial::Condition;

/// Task types served by the engine
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Paradigm {
    #[serde(rename = "flanker")]
    Flanker,
    #[serde(rename = "gonogo")]
    GoNoGo,
    #[serde(rename = "stroop")]
    Stroop,
    #[serde(rename = "nback")]
    NBack,
    #[serde(rename = "trail_making")]
    TrailMaking,
}

impl Paradigm {
    pub const ALL: [Paradigm; 5] = [
        Paradigm::Flanker,
        Paradigm::GoNoGo,
        Paradigm::Stroop,
        Paradigm::NBack,
        Paradigm::TrailMaking,
    ];

    pub fn descriptor(&self) -> &'static ParadigmDescriptor {
        match self {
            Paradigm::Flanker => &FLANKER,
            Paradigm::GoNoGo => &GO_NO_GO,
            Paradigm::Stroop => &STROOP,
            Paradigm::NBack => &N_BACK,
            Paradigm::TrailMaking => &TRAIL_MAKING,
        }
    }

    /// Trail making has no trial list; it is driven by clicks.
    pub fn is_trial_based(&self) -> bool {
        !matches!(self, Paradigm::TrailMaking)
    }

    pub fn as_str(&self) -> &'static str {
        self.descriptor().id
    }
}

/// How a response is judged against a trial.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// The choice must equal the stimulus' correct answer.
    ForcedChoice,
    /// Respond on target trials, withhold otherwise.
    Withhold,
    /// Clicks are checked against the next required number.
    Sequence,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub stimulus_duration_ms: u64,
    pub inter_stimulus_interval_ms: u64,
}

impl Timing {
    /// Responses later than this reach the engine as withheld.
    pub fn max_response_time_ms(&self) -> u64 {
        self.stimulus_duration_ms + self.inter_stimulus_interval_ms
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseKey {
    pub choice: &'static str,
    pub key: &'static str,
}

/// Harder minus easier condition gives the paradigm's effect score.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contrast {
    pub harder: Condition,
    pub easier: Condition,
}

/// Static per-task configuration: conditions, scoring, timing and key map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParadigmDescriptor {
    pub paradigm: Paradigm,
    pub id: &'static str,
    pub title: &'static str,
    pub conditions: &'static [Condition],
    pub scoring: ScoringRule,
    pub timing: Timing,
    pub response_keys: &'static [ResponseKey],
    pub contrast: Option<Contrast>,
}

impl ParadigmDescriptor {
    pub fn key_for(&self, choice: &str) -> Option<&'static str> {
        self.response_keys
            .iter()
            .find(|k| k.choice == choice)
            .map(|k| k.key)
    }
}

pub static FLANKER: ParadigmDescriptor = ParadigmDescriptor {
    paradigm: Paradigm::Flanker,
    id: "flanker",
    title: "Flanker task",
    conditions: &[Condition::Congruent, Condition::Incongruent],
    scoring: ScoringRule::ForcedChoice,
    timing: Timing {
        stimulus_duration_ms: 300,
        inter_stimulus_interval_ms: 1500,
    },
    response_keys: &[
        ResponseKey {
            choice: "left",
            key: "c",
        },
        ResponseKey {
            choice: "right",
            key: "m",
        },
    ],
    contrast: Some(Contrast {
        harder: Condition::Incongruent,
        easier: Condition::Congruent,
    }),
};

pub static GO_NO_GO: ParadigmDescriptor = ParadigmDescriptor {
    paradigm: Paradigm::GoNoGo,
    id: "gonogo",
    title: "Go/No-Go task",
    conditions: &[Condition::Go, Condition::NoGo],
    scoring: ScoringRule::Withhold,
    timing: Timing {
        stimulus_duration_ms: 500,
        inter_stimulus_interval_ms: 1500,
    },
    response_keys: &[ResponseKey {
        choice: "respond",
        key: "space",
    }],
    contrast: None,
};

pub static STROOP: ParadigmDescriptor = ParadigmDescriptor {
    paradigm: Paradigm::Stroop,
    id: "stroop",
    title: "Stroop task",
    conditions: &[Condition::Congruent, Condition::Incongruent],
    scoring: ScoringRule::ForcedChoice,
    timing: Timing {
        stimulus_duration_ms: 500,
        inter_stimulus_interval_ms: 1500,
    },
    response_keys: &[
        ResponseKey {
            choice: "red",
            key: "1",
        },
        ResponseKey {
            choice: "blue",
            key: "2",
        },
        ResponseKey {
            choice: "yellow",
            key: "3",
        },
        ResponseKey {
            choice: "black",
            key: "4",
        },
        ResponseKey {
            choice: "green",
            key: "5",
        },
    ],
    contrast: Some(Contrast {
        harder: Condition::Incongruent,
        easier: Condition::Congruent,
    }),
};

pub static N_BACK: ParadigmDescriptor = ParadigmDescriptor {
    paradigm: Paradigm::NBack,
    id: "nback",
    title: "1-back task",
    conditions: &[Condition::Match, Condition::NonMatch],
    scoring: ScoringRule::Withhold,
    timing: Timing {
        stimulus_duration_ms: 500,
        inter_stimulus_interval_ms: 2500,
    },
    response_keys: &[ResponseKey {
        choice: "respond",
        key: "space",
    }],
    contrast: None,
};

pub static TRAIL_MAKING: ParadigmDescriptor = ParadigmDescriptor {
    paradigm: Paradigm::TrailMaking,
    id: "trail_making",
    title: "Trail making test",
    conditions: &[],
    scoring: ScoringRule::Sequence,
    timing: Timing {
        stimulus_duration_ms: 0,
        inter_stimulus_interval_ms: 0,
    },
    response_keys: &[],
    contrast: None,
};
