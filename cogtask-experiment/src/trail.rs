use cogtask_core::error::out_of_sequence;
use cogtask_core::TaskError;
use cogtask_timing::Timer;
use serde::{Deserialize, Serialize};

use crate::config::{TaskConfig, TrailConfig};

/// One click on the trail board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub sequence: usize,
    pub number: u32,
    /// Time reported by the presentation layer, if any.
    pub client_time_ms: Option<f64>,
    /// Engine time since the trail started.
    pub timestamp_ms: f64,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOutcome {
    pub correct: bool,
    pub completed: bool,
    pub next_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailSummary {
    pub total_time_ms: f64,
    pub errors: usize,
    pub total_clicks: usize,
    pub numbers_completed: u32,
    pub completed: bool,
}

/// Trail making: connect 1..=N in order. The only state is the smallest
/// number not yet clicked; wrong clicks are counted and leave it in place.
#[derive(Debug, Clone)]
pub struct TrailSession<T: Timer> {
    pub timer: T,
    numbers: u32,
    next_number: u32,
    errors: usize,
    clicks: Vec<Click>,
    started_at: Option<T::Timestamp>,
    finished_at: Option<T::Timestamp>,
}

impl<T: Timer> TrailSession<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            numbers: 0,
            next_number: 1,
            errors: 0,
            clicks: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self, config: &TrailConfig) -> Result<u32, TaskError> {
        TaskConfig::TrailMaking(config.clone()).validate()?;
        self.numbers = config.numbers;
        self.next_number = 1;
        self.errors = 0;
        self.clicks.clear();
        self.started_at = Some(self.timer.now());
        self.finished_at = None;
        tracing::info!(target: "trail", numbers = self.numbers, "trail_started");
        Ok(self.numbers)
    }

    pub fn click(&mut self, number: u32, client_time_ms: Option<f64>) -> Result<ClickOutcome, TaskError> {
        let Some(started_at) = self.started_at else {
            return Err(TaskError::SequenceNotStarted);
        };
        if self.finished_at.is_some() {
            return Err(out_of_sequence("trail already completed"));
        }

        let now = self.timer.now();
        let correct = number == self.next_number;
        self.clicks.push(Click {
            sequence: self.clicks.len() + 1,
            number,
            client_time_ms,
            timestamp_ms: self.timer.between(started_at, now).as_secs_f64() * 1e3,
            correct,
        });

        if !correct {
            self.errors += 1;
            tracing::debug!(
                target: "trail",
                clicked = number,
                expected = self.next_number,
                errors = self.errors,
                "trail_wrong_click"
            );
            return Ok(ClickOutcome {
                correct: false,
                completed: false,
                next_number: Some(self.next_number),
            });
        }

        if self.next_number >= self.numbers {
            self.next_number = self.numbers + 1;
            self.finished_at = Some(now);
            tracing::info!(
                target: "trail",
                errors = self.errors,
                clicks = self.clicks.len(),
                "trail_completed"
            );
            return Ok(ClickOutcome {
                correct: true,
                completed: true,
                next_number: None,
            });
        }

        self.next_number += 1;
        Ok(ClickOutcome {
            correct: true,
            completed: false,
            next_number: Some(self.next_number),
        })
    }

    /// Ends the trail, finished or not, and reports it.
    pub fn complete(&mut self) -> Result<TrailSummary, TaskError> {
        if self.started_at.is_none() {
            return Err(TaskError::SequenceNotStarted);
        }
        if self.finished_at.is_none() {
            self.finished_at = Some(self.timer.now());
        }
        self.summary()
    }

    /// Report of an ended trail; `EmptyResultSet` while it is still running.
    pub fn summary(&self) -> Result<TrailSummary, TaskError> {
        let (Some(start), Some(end)) = (self.started_at, self.finished_at) else {
            return Err(TaskError::EmptyResultSet);
        };
        Ok(TrailSummary {
            total_time_ms: self.timer.between(start, end).as_secs_f64() * 1e3,
            errors: self.errors,
            total_clicks: self.clicks.len(),
            numbers_completed: self.next_number - 1,
            completed: self.next_number > self.numbers,
        })
    }

    pub fn next_number(&self) -> Option<u32> {
        (self.started_at.is_some() && self.next_number <= self.numbers).then_some(self.next_number)
    }

    pub fn clicks(&self) -> &[Click] {
        &self.clicks
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}
