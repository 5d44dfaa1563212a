use std::collections::BTreeMap;

use cogtask_core::{Condition, ParadigmDescriptor, Stimulus, Trial};
use serde::Serialize;

/// Everything the presentation layer needs to show and time one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialPayload {
    pub trial_number: usize,
    pub total_trials: usize,
    pub stimulus: Stimulus,
    pub label: String,
    pub condition: Condition,
    pub stimulus_duration_ms: u64,
    pub inter_stimulus_interval_ms: u64,
    pub max_response_time_ms: u64,
    pub response_keys: BTreeMap<&'static str, &'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_color_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
}

impl TrialPayload {
    pub fn new(descriptor: &ParadigmDescriptor, trial: &Trial, total_trials: usize) -> Self {
        let (display_color_code, grid) = match trial.stimulus {
            Stimulus::ColorWord { ink, .. } => (Some(ink.hex()), None),
            Stimulus::Position { position } => (None, Some(position.grid_class())),
            Stimulus::Flanker { .. } | Stimulus::Signal { .. } => (None, None),
        };
        Self {
            trial_number: trial.index,
            total_trials,
            stimulus: trial.stimulus,
            label: trial.stimulus.label(),
            condition: trial.condition,
            stimulus_duration_ms: descriptor.timing.stimulus_duration_ms,
            inter_stimulus_interval_ms: descriptor.timing.inter_stimulus_interval_ms,
            max_response_time_ms: descriptor.timing.max_response_time_ms(),
            response_keys: descriptor
                .response_keys
                .iter()
                .map(|k| (k.choice, k.key))
                .collect(),
            display_color_code,
            grid,
        }
    }
}

/// Answer to a request for the next trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dispatch {
    Next(TrialPayload),
    Completed,
}

impl Dispatch {
    pub fn is_completed(&self) -> bool {
        matches!(self, Dispatch::Completed)
    }
}
