use super::classifier::classify;
use super::config::TaskConfig;
use super::generator::generate;
use super::summary::{SummaryReport, summarize};
use super::trial::{Dispatch, TrialPayload};
use cogtask_core::error::{invalid_configuration, out_of_sequence};
use cogtask_core::{Paradigm, ParadigmDescriptor, ResponseEvent, TaskError, Trial, TrialResult};
use cogtask_timing::Timer;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No sequence generated yet.
    Idle,
    Running,
    /// Every trial dispatched.
    Completed,
}

/// One participant's run through a trial-based paradigm.
///
/// Turn-taking is strict: a trial is dispatched, its response recorded, then
/// the next trial may be dispatched. Restarting discards the previous run.
pub struct Session<T, R>
where
    T: Timer,
    R: Rng,
{
    pub descriptor: &'static ParadigmDescriptor,
    pub timer: T,
    pub rng: R,
    trials: Vec<Trial>,
    current_trial: usize,
    started_at: Option<T::Timestamp>,
    results: Vec<TrialResult>,
}

impl<T, R> Session<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(paradigm: Paradigm, timer: T, rng: R) -> Result<Self, TaskError> {
        if !paradigm.is_trial_based() {
            return Err(invalid_configuration(format!(
                "{} has no trial sequence",
                paradigm.as_str()
            )));
        }
        Ok(Self {
            descriptor: paradigm.descriptor(),
            timer,
            rng,
            trials: Vec::new(),
            current_trial: 0,
            started_at: None,
            results: Vec::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        if self.started_at.is_none() {
            SessionState::Idle
        } else if self.current_trial < self.trials.len() {
            SessionState::Running
        } else {
            SessionState::Completed
        }
    }

    /// Generates a fresh sequence and resets cursor, results and start time.
    /// An invalid configuration leaves the session untouched.
    pub fn start(&mut self, config: &TaskConfig) -> Result<usize, TaskError> {
        if config.paradigm() != self.descriptor.paradigm {
            return Err(invalid_configuration(format!(
                "{} configuration given to a {} session",
                config.paradigm().as_str(),
                self.descriptor.id
            )));
        }
        let trials = generate(config, &mut self.rng)?;

        self.trials = trials;
        self.current_trial = 0;
        self.results.clear();
        self.started_at = Some(self.timer.now());

        tracing::info!(
            target: "session",
            task = self.descriptor.id,
            total_trials = self.trials.len(),
            "session_started"
        );
        Ok(self.trials.len())
    }

    /// Dispatches the trial under the cursor and advances it. Once every
    /// trial is out, keeps answering `Completed` without moving.
    pub fn next_trial(&mut self) -> Result<Dispatch, TaskError> {
        if self.state() == SessionState::Idle {
            return Err(TaskError::SequenceNotStarted);
        }
        if self.awaiting_response() {
            return Err(out_of_sequence(format!(
                "trial {} has no recorded response yet",
                self.current_trial
            )));
        }
        let Some(trial) = self.trials.get(self.current_trial) else {
            tracing::debug!(target: "session", task = self.descriptor.id, "session_completed");
            return Ok(Dispatch::Completed);
        };

        self.current_trial += 1;
        tracing::debug!(
            target: "session",
            task = self.descriptor.id,
            trial = trial.index,
            total = self.trials.len(),
            condition = %trial.condition,
            stimulus = %trial.stimulus.label(),
            "trial_dispatched"
        );
        Ok(Dispatch::Next(TrialPayload::new(
            self.descriptor,
            trial,
            self.trials.len(),
        )))
    }

    /// Classifies a response to the most recently dispatched trial and
    /// appends its result. Each dispatched trial takes exactly one response;
    /// a second one is rejected.
    pub fn record_response(&mut self, response: ResponseEvent) -> Result<TrialResult, TaskError> {
        if self.state() == SessionState::Idle {
            return Err(TaskError::SequenceNotStarted);
        }
        if self.current_trial == 0 {
            return Err(out_of_sequence("no trial has been dispatched"));
        }
        if !self.awaiting_response() {
            return Err(out_of_sequence(format!(
                "trial {} already has a response",
                self.current_trial
            )));
        }
        if let Some(claimed) = response.trial {
            if claimed != self.current_trial {
                return Err(out_of_sequence(format!(
                    "response for trial {claimed} but trial {} is current",
                    self.current_trial
                )));
            }
        }
        let trial = self
            .trials
            .get(self.current_trial - 1)
            .ok_or_else(|| {
                out_of_sequence(format!(
                    "trial {} outside sequence of {}",
                    self.current_trial,
                    self.trials.len()
                ))
            })?;

        let verdict = classify(self.descriptor.scoring, trial, &response);
        let result = verdict.into_result(trial, response);
        tracing::debug!(
            target: "session",
            task = self.descriptor.id,
            trial = result.trial,
            correct = result.is_correct,
            error_type = ?result.error_type,
            reaction_time_ms = ?result.reaction_time_ms,
            "response_recorded"
        );
        self.results.push(result.clone());
        Ok(result)
    }

    /// Summary of the results recorded so far, stamped with session time.
    pub fn summary(&self) -> Result<SummaryReport, TaskError> {
        let mut report = summarize(self.descriptor, &self.results)?;
        report.elapsed_ms = self.elapsed().map(|d| d.as_secs_f64() * 1e3);
        Ok(report)
    }

    /// True between a dispatch and the response that answers it.
    pub fn awaiting_response(&self) -> bool {
        self.current_trial > self.results.len()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|ts| self.timer.elapsed(ts))
    }

    pub fn paradigm(&self) -> Paradigm {
        self.descriptor.paradigm
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn current_trial(&self) -> usize {
        self.current_trial
    }

    pub fn total_trials(&self) -> usize {
        self.trials.len()
    }
}
