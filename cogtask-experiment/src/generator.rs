use cogtask_core::error::invalid_configuration;
use cogtask_core::{
    ArrowDirection, Color, Condition, GridPosition, Signal, Stimulus, TaskError, Trial,
};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{
    FlankerConfig, GoNoGoConfig, MAX_TRIALS, NBackConfig, StroopConfig, TaskConfig,
};

/// Builds the ordered trial list for one paradigm.
pub trait SequenceGenerator {
    fn generate_trials<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Trial>;
}

/// The four flanker arrays: `<<<<<`, `>>>>>`, `<<><<`, `>><>>`.
pub const FLANKER_ARRAYS: [Stimulus; 4] = [
    Stimulus::Flanker {
        flank: ArrowDirection::Left,
        target: ArrowDirection::Left,
    },
    Stimulus::Flanker {
        flank: ArrowDirection::Right,
        target: ArrowDirection::Right,
    },
    Stimulus::Flanker {
        flank: ArrowDirection::Left,
        target: ArrowDirection::Right,
    },
    Stimulus::Flanker {
        flank: ArrowDirection::Right,
        target: ArrowDirection::Left,
    },
];

/// Validates `config` and builds its trial list. Trail making has no trial
/// list and is rejected here.
pub fn generate<R: Rng + ?Sized>(config: &TaskConfig, rng: &mut R) -> Result<Vec<Trial>, TaskError> {
    config.validate()?;
    let trials = match config {
        TaskConfig::Flanker(c) => c.generate_trials(rng),
        TaskConfig::GoNoGo(c) => c.generate_trials(rng),
        TaskConfig::Stroop(c) => c.generate_trials(rng),
        TaskConfig::NBack(c) => c.generate_trials(rng),
        TaskConfig::TrailMaking(_) => {
            return Err(invalid_configuration(
                "trail making is driven by clicks, not a trial sequence",
            ));
        }
    };
    tracing::debug!(
        target: "generator",
        task = config.paradigm().as_str(),
        trials = trials.len(),
        "sequence_generated"
    );
    Ok(trials)
}

/// Assigns 1-based ordinals in list order.
fn numbered(items: Vec<(Stimulus, Condition)>) -> Vec<Trial> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, (stimulus, condition))| Trial {
            index: i + 1,
            stimulus,
            condition,
        })
        .collect()
}

/// `copies` of each stimulus, tagged by its intrinsic condition.
fn replicate(stimuli: &[Stimulus], copies: usize) -> Vec<(Stimulus, Condition)> {
    stimuli
        .iter()
        .filter_map(|s| s.intrinsic_condition().map(|c| (*s, c)))
        .flat_map(|pair| std::iter::repeat_n(pair, copies))
        .collect()
}

impl SequenceGenerator for FlankerConfig {
    fn generate_trials<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Trial> {
        let mut items = replicate(&FLANKER_ARRAYS, self.trials_per_stimulus);
        items.shuffle(rng);
        numbered(items)
    }
}

impl SequenceGenerator for GoNoGoConfig {
    fn generate_trials<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Trial> {
        let mut items = replicate(
            &[Stimulus::Signal { signal: Signal::Go }],
            self.go_trials,
        );
        items.extend(replicate(
            &[Stimulus::Signal {
                signal: Signal::NoGo,
            }],
            self.nogo_trials,
        ));
        items.shuffle(rng);
        numbered(items)
    }
}

impl SequenceGenerator for StroopConfig {
    fn generate_trials<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Trial> {
        let colors = Color::ALL;
        let total = self.congruent_trials.saturating_add(self.incongruent_trials);
        let mut items = Vec::with_capacity(total.min(MAX_TRIALS));

        for _ in 0..self.congruent_trials {
            let color = colors[rng.random_range(0..colors.len())];
            items.push((
                Stimulus::ColorWord {
                    meaning: color,
                    ink: color,
                },
                Condition::Congruent,
            ));
        }

        for _ in 0..self.incongruent_trials {
            let meaning = rng.random_range(0..colors.len());
            // uniform over the other colors: skip past the meaning's slot
            let mut ink = rng.random_range(0..colors.len() - 1);
            if ink >= meaning {
                ink += 1;
            }
            items.push((
                Stimulus::ColorWord {
                    meaning: colors[meaning],
                    ink: colors[ink],
                },
                Condition::Incongruent,
            ));
        }

        items.shuffle(rng);
        numbered(items)
    }
}

impl SequenceGenerator for NBackConfig {
    /// Generated left to right: each trial depends on its predecessor and on
    /// how many matches have been placed so far.
    fn generate_trials<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Trial> {
        let positions: Vec<GridPosition> = GridPosition::all().collect();
        let quota = self.match_quota();
        let mut placed = 0;
        let mut items: Vec<(Stimulus, Condition)> = 
            Vec::with_capacity(self.total_trials.min(MAX_TRIALS));
        let mut previous: Option<usize> = None;

        for _ in 0..self.total_trials {
            let (slot, condition) = match previous {
                None => (rng.random_range(0..positions.len()), Condition::NonMatch),
                Some(prev) if placed < quota && rng.random_bool(self.match_probability) => {
                    placed += 1;
                    (prev, Condition::Match)
                }
                Some(prev) => {
                    let mut slot = rng.random_range(0..positions.len() - 1);
                    if slot >= prev {
                        slot += 1;
                    }
                    (slot, Condition::NonMatch)
                }
            };
            items.push((
                Stimulus::Position {
                    position: positions[slot],
                },
                condition,
            ));
            previous = Some(slot);
        }

        numbered(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrailConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn count(trials: &[Trial], condition: Condition) -> usize {
        trials.iter().filter(|t| t.condition == condition).count()
    }

    #[test]
    fn flanker_balances_each_array() {
        let mut rng = StdRng::seed_from_u64(7);
        let trials = FlankerConfig {
            trials_per_stimulus: 5,
        }
        .generate_trials(&mut rng);
        assert_eq!(trials.len(), 20);
        for array in FLANKER_ARRAYS {
            assert_eq!(trials.iter().filter(|t| t.stimulus == array).count(), 5);
        }
        assert_eq!(count(&trials, Condition::Congruent), 10);
        assert_eq!(count(&trials, Condition::Incongruent), 10);
    }

    #[test]
    fn ordinals_are_contiguous_from_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let trials = generate(&TaskConfig::default_for(cogtask_core::Paradigm::Stroop), &mut rng)
            .unwrap();
        let indices: Vec<usize> = trials.iter().map(|t| t.index).collect();
        assert_eq!(indices, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn gonogo_counts_by_class() {
        let mut rng = StdRng::seed_from_u64(3);
        let trials = GoNoGoConfig {
            go_trials: 20,
            nogo_trials: 10,
        }
        .generate_trials(&mut rng);
        assert_eq!(count(&trials, Condition::Go), 20);
        assert_eq!(count(&trials, Condition::NoGo), 10);
    }

    #[test]
    fn stroop_incongruent_ink_differs_from_meaning() {
        let mut rng = StdRng::seed_from_u64(11);
        let trials = StroopConfig {
            congruent_trials: 50,
            incongruent_trials: 50,
        }
        .generate_trials(&mut rng);
        for t in &trials {
            let Stimulus::ColorWord { meaning, ink } = t.stimulus else {
                panic!("unexpected stimulus {:?}", t.stimulus);
            };
            match t.condition {
                Condition::Congruent => assert_eq!(meaning, ink),
                Condition::Incongruent => assert_ne!(meaning, ink),
                other => panic!("unexpected condition {other}"),
            }
        }
    }

    #[test]
    fn nback_first_trial_is_never_a_match() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let trials = NBackConfig::default().generate_trials(&mut rng);
            assert_eq!(trials[0].condition, Condition::NonMatch);
        }
    }

    #[test]
    fn nback_matches_repeat_and_non_matches_differ() {
        let mut rng = StdRng::seed_from_u64(5);
        let trials = NBackConfig::default().generate_trials(&mut rng);
        for pair in trials.windows(2) {
            match pair[1].condition {
                Condition::Match => assert_eq!(pair[0].stimulus, pair[1].stimulus),
                _ => assert_ne!(pair[0].stimulus, pair[1].stimulus),
            }
        }
        assert!(count(&trials, Condition::Match) <= 9);
    }

    #[test]
    fn nback_certain_coin_fills_the_quota_early() {
        let mut rng = StdRng::seed_from_u64(9);
        let trials = NBackConfig {
            total_trials: 10,
            match_rate: 0.3,
            match_probability: 1.0,
        }
        .generate_trials(&mut rng);
        let tags: Vec<Condition> = trials.iter().map(|t| t.condition).collect();
        assert_eq!(&tags[1..4], &[Condition::Match; 3]);
        assert_eq!(count(&trials, Condition::Match), 3);
    }

    #[test]
    fn trail_config_has_no_trial_sequence() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate(&TaskConfig::TrailMaking(TrailConfig::default()), &mut rng);
        assert!(matches!(err, Err(TaskError::InvalidConfiguration(_))));
    }

    #[test]
    fn invalid_config_is_rejected_before_generation() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = TaskConfig::Stroop(StroopConfig {
            congruent_trials: 0,
            incongruent_trials: 4,
        });
        assert!(matches!(
            generate(&cfg, &mut rng),
            Err(TaskError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn unallocatable_sizes_are_rejected_before_generation() {
        let mut rng = StdRng::seed_from_u64(0);
        let nback = TaskConfig::NBack(NBackConfig {
            total_trials: usize::MAX,
            ..NBackConfig::default()
        });
        assert!(matches!(
            generate(&nback, &mut rng),
            Err(TaskError::InvalidConfiguration(_))
        ));
        let stroop = TaskConfig::Stroop(StroopConfig {
            congruent_trials: usize::MAX,
            incongruent_trials: 1,
        });
        assert!(matches!(
            generate(&stroop, &mut rng),
            Err(TaskError::InvalidConfiguration(_))
        ));
    }
}
