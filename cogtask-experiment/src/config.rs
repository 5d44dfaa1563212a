use cogtask_core::error::invalid_configuration;
use cogtask_core::{Paradigm, TaskError};
use serde::{Deserialize, Serialize};

/// Upper bound for every count and for the trials a configuration produces.
pub const MAX_TRIALS: usize = 10_000;

/// Sequence configuration, tagged by task. Omitted fields take the
/// documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task")]
pub enum TaskConfig {
    #[serde(rename = "flanker")]
    Flanker(FlankerConfig),
    #[serde(rename = "gonogo")]
    GoNoGo(GoNoGoConfig),
    #[serde(rename = "stroop")]
    Stroop(StroopConfig),
    #[serde(rename = "nback")]
    NBack(NBackConfig),
    #[serde(rename = "trail_making")]
    TrailMaking(TrailConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlankerConfig {
    #[serde(alias = "trials_per_condition")]
    pub trials_per_stimulus: usize,
}

impl Default for FlankerConfig {
    fn default() -> Self {
        Self {
            trials_per_stimulus: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoNoGoConfig {
    pub go_trials: usize,
    pub nogo_trials: usize,
}

impl Default for GoNoGoConfig {
    fn default() -> Self {
        Self {
            go_trials: 20,
            nogo_trials: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub congruent_trials: usize,
    pub incongruent_trials: usize,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            congruent_trials: 20,
            incongruent_trials: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NBackConfig {
    #[serde(alias = "total")]
    pub total_trials: usize,
    /// Share of trials that repeat their predecessor.
    pub match_rate: f64,
    /// Chance of placing a match at each opportunity while the quota lasts.
    pub match_probability: f64,
}

impl Default for NBackConfig {
    fn default() -> Self {
        Self {
            total_trials: 30,
            match_rate: 0.3,
            match_probability: 0.4,
        }
    }
}

impl NBackConfig {
    pub fn match_quota(&self) -> usize {
        (self.total_trials as f64 * self.match_rate).round() as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub numbers: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self { numbers: 25 }
    }
}

impl TrailConfig {
    pub fn targets(&self) -> Vec<u32> {
        (1..=self.numbers).collect()
    }
}

impl TaskConfig {
    pub fn default_for(paradigm: Paradigm) -> Self {
        match paradigm {
            Paradigm::Flanker => TaskConfig::Flanker(FlankerConfig::default()),
            Paradigm::GoNoGo => TaskConfig::GoNoGo(GoNoGoConfig::default()),
            Paradigm::Stroop => TaskConfig::Stroop(StroopConfig::default()),
            Paradigm::NBack => TaskConfig::NBack(NBackConfig::default()),
            Paradigm::TrailMaking => TaskConfig::TrailMaking(TrailConfig::default()),
        }
    }

    pub fn paradigm(&self) -> Paradigm {
        match self {
            TaskConfig::Flanker(_) => Paradigm::Flanker,
            TaskConfig::GoNoGo(_) => Paradigm::GoNoGo,
            TaskConfig::Stroop(_) => Paradigm::Stroop,
            TaskConfig::NBack(_) => Paradigm::NBack,
            TaskConfig::TrailMaking(_) => Paradigm::TrailMaking,
        }
    }

    /// Number of trials (or trail targets) the configuration produces,
    /// `None` when that overflows.
    pub fn total_trials(&self) -> Option<usize> {
        match self {
            TaskConfig::Flanker(c) => c.trials_per_stimulus.checked_mul(4),
            TaskConfig::GoNoGo(c) => c.go_trials.checked_add(c.nogo_trials),
            TaskConfig::Stroop(c) => c.congruent_trials.checked_add(c.incongruent_trials),
            TaskConfig::NBack(c) => Some(c.total_trials),
            TaskConfig::TrailMaking(c) => usize::try_from(c.numbers).ok(),
        }
    }

    /// Rejects zero or oversized counts, rates outside `[0, 1]` and trails
    /// shorter than 2. A valid configuration generates at most `MAX_TRIALS`.
    pub fn validate(&self) -> Result<(), TaskError> {
        match self {
            TaskConfig::Flanker(c) => bounded("trials_per_stimulus", c.trials_per_stimulus)?,
            TaskConfig::GoNoGo(c) => {
                bounded("go_trials", c.go_trials)?;
                bounded("nogo_trials", c.nogo_trials)?;
            }
            TaskConfig::Stroop(c) => {
                bounded("congruent_trials", c.congruent_trials)?;
                bounded("incongruent_trials", c.incongruent_trials)?;
            }
            TaskConfig::NBack(c) => {
                bounded("total_trials", c.total_trials)?;
                unit_interval("match_rate", c.match_rate)?;
                unit_interval("match_probability", c.match_probability)?;
            }
            TaskConfig::TrailMaking(c) => {
                if c.numbers < 2 {
                    return Err(invalid_configuration(format!(
                        "numbers must be at least 2, got {}",
                        c.numbers
                    )));
                }
            }
        }
        match self.total_trials() {
            Some(total) if total <= MAX_TRIALS => Ok(()),
            _ => Err(invalid_configuration(format!(
                "{} configuration exceeds {MAX_TRIALS} trials",
                self.paradigm().as_str()
            ))),
        }
    }
}

fn bounded(field: &str, value: usize) -> Result<(), TaskError> {
    if value == 0 {
        return Err(invalid_configuration(format!("{field} must be positive")));
    }
    if value > MAX_TRIALS {
        return Err(invalid_configuration(format!(
            "{field} must be at most {MAX_TRIALS}, got {value}"
        )));
    }
    Ok(())
}

fn unit_interval(field: &str, value: f64) -> Result<(), TaskError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid_configuration(format!(
            "{field} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: TaskConfig = serde_json::from_str(r#"{"task": "gonogo"}"#).unwrap();
        assert_eq!(cfg, TaskConfig::GoNoGo(GoNoGoConfig::default()));
        assert_eq!(cfg.total_trials(), Some(30));

        let cfg: TaskConfig =
            serde_json::from_str(r#"{"task": "stroop", "congruent_trials": 3}"#).unwrap();
        assert_eq!(cfg.total_trials(), Some(23));
    }

    #[test]
    fn aliases_from_task_forms() {
        let cfg: TaskConfig =
            serde_json::from_str(r#"{"task": "flanker", "trials_per_condition": 1}"#).unwrap();
        assert_eq!(cfg.total_trials(), Some(4));

        let cfg: TaskConfig = serde_json::from_str(r#"{"task": "nback", "total": 10}"#).unwrap();
        assert_eq!(cfg.total_trials(), Some(10));
        assert_eq!(cfg.paradigm(), Paradigm::NBack);
    }

    #[test]
    fn defaults_per_paradigm() {
        let totals: Vec<Option<usize>> = Paradigm::ALL
            .iter()
            .map(|p| TaskConfig::default_for(*p).total_trials())
            .collect();
        assert_eq!(
            totals,
            vec![Some(20), Some(30), Some(40), Some(30), Some(25)]
        );
    }

    #[test]
    fn zero_counts_are_invalid() {
        let cfg = TaskConfig::GoNoGo(GoNoGoConfig {
            go_trials: 20,
            nogo_trials: 0,
        });
        assert!(matches!(
            cfg.validate(),
            Err(TaskError::InvalidConfiguration(msg)) if msg.contains("nogo_trials")
        ));
        assert!(TaskConfig::Flanker(FlankerConfig {
            trials_per_stimulus: 0
        })
        .validate()
        .is_err());
    }

    #[test]
    fn oversized_counts_are_invalid() {
        let huge_nback = TaskConfig::NBack(NBackConfig {
            total_trials: usize::MAX,
            ..NBackConfig::default()
        });
        assert!(matches!(
            huge_nback.validate(),
            Err(TaskError::InvalidConfiguration(msg)) if msg.contains("total_trials")
        ));

        let overflowing_stroop = TaskConfig::Stroop(StroopConfig {
            congruent_trials: usize::MAX,
            incongruent_trials: 1,
        });
        assert_eq!(overflowing_stroop.total_trials(), None);
        assert!(overflowing_stroop.validate().is_err());

        // each count fits on its own, the sum does not
        let summed = TaskConfig::GoNoGo(GoNoGoConfig {
            go_trials: MAX_TRIALS,
            nogo_trials: 1,
        });
        assert!(matches!(
            summed.validate(),
            Err(TaskError::InvalidConfiguration(msg)) if msg.contains("exceeds")
        ));

        let at_limit = TaskConfig::NBack(NBackConfig {
            total_trials: MAX_TRIALS,
            ..NBackConfig::default()
        });
        assert!(at_limit.validate().is_ok());
        assert!(TaskConfig::TrailMaking(TrailConfig { numbers: u32::MAX })
            .validate()
            .is_err());
    }

    #[test]
    fn rates_outside_unit_interval_are_invalid() {
        let cfg = TaskConfig::NBack(NBackConfig {
            match_rate: 1.5,
            ..NBackConfig::default()
        });
        assert!(cfg.validate().is_err());
        let cfg = TaskConfig::NBack(NBackConfig {
            match_probability: f64::NAN,
            ..NBackConfig::default()
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn match_quota_rounds() {
        let quota = |total| {
            NBackConfig {
                total_trials: total,
                ..NBackConfig::default()
            }
            .match_quota()
        };
        assert_eq!(quota(30), 9);
        assert_eq!(quota(10), 3);
        assert_eq!(quota(20), 6);
    }

    #[test]
    fn trail_needs_two_numbers() {
        assert!(TaskConfig::TrailMaking(TrailConfig { numbers: 1 }).validate().is_err());
        assert_eq!(TrailConfig { numbers: 3 }.targets(), vec![1, 2, 3]);
    }
}
