//! JSON request/response layer over the engine: one request object in, one
//! response object out, sessions kept apart by caller-chosen ids.

use std::collections::HashMap;

use cogtask_core::error::out_of_sequence;
use cogtask_core::{Condition, Paradigm, ResponseEvent, TaskError, TrialResult};
use cogtask_experiment::{
    Click, ConditionSummary, Session, SignalDetection, SummaryReport, TaskConfig, TrailSession,
    TrailSummary,
};
use cogtask_timing::Timer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DEFAULT_SESSION: &str = "default";

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Start {
        #[serde(default = "default_session")]
        session: String,
        config: TaskConfig,
    },
    NextTrial {
        #[serde(default = "default_session")]
        session: String,
    },
    RecordResponse(RecordRequest),
    Results {
        #[serde(default = "default_session")]
        session: String,
    },
    Click {
        #[serde(default = "default_session")]
        session: String,
        number: u32,
        #[serde(default, alias = "time")]
        time_ms: Option<f64>,
    },
    Complete {
        #[serde(default = "default_session")]
        session: String,
    },
    /// Drops the session and everything it recorded.
    Close {
        #[serde(default = "default_session")]
        session: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordRequest {
    #[serde(default = "default_session")]
    pub session: String,
    #[serde(flatten)]
    pub response: ResponseEvent,
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::Start { .. } => "start",
            Request::NextTrial { .. } => "next_trial",
            Request::RecordResponse(_) => "record_response",
            Request::Results { .. } => "results",
            Request::Click { .. } => "click",
            Request::Complete { .. } => "complete",
            Request::Close { .. } => "close",
        }
    }

    pub fn session(&self) -> &str {
        match self {
            Request::Start { session, .. }
            | Request::NextTrial { session }
            | Request::Results { session }
            | Request::Click { session, .. }
            | Request::Complete { session }
            | Request::Close { session } => session,
            Request::RecordResponse(r) => &r.session,
        }
    }
}

pub enum TaskSession<T: Timer> {
    Trials(Session<T, StdRng>),
    Trail(TrailSession<T>),
}

/// Live sessions by id. Each session draws its own generator from a seeder,
/// so a fixed seed reproduces every sequence of a run.
pub struct SessionRegistry<T: Timer> {
    sessions: HashMap<String, TaskSession<T>>,
    seeder: StdRng,
}

impl<T: Timer + Default> SessionRegistry<T> {
    pub fn new(seed: Option<u64>) -> Self {
        let seeder = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            sessions: HashMap::new(),
            seeder,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Parses and answers one request line. Never fails: malformed input
    /// becomes an `invalid_request` error object.
    pub fn handle_line(&mut self, line: &str) -> Value {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(err) => {
                tracing::warn!(target: "protocol", error = %err, "request_rejected");
                json!({
                    "status": "error",
                    "kind": "invalid_request",
                    "message": err.to_string(),
                })
            }
        }
    }

    pub fn handle(&mut self, request: Request) -> Value {
        let op = request.op();
        let session = request.session().to_string();
        tracing::debug!(target: "protocol", op, session = %session, "request_received");

        match self.dispatch(request) {
            Ok(value) => value,
            Err(err) if err.is_benign() => json!({ "error": "no results" }),
            Err(err) => {
                tracing::warn!(
                    target: "protocol",
                    op,
                    session = %session,
                    kind = ?err.kind(),
                    error = %err,
                    "request_failed"
                );
                json!({
                    "status": "error",
                    "kind": err.kind(),
                    "message": err.to_string(),
                })
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> Result<Value, TaskError> {
        match request {
            Request::Start { session, config } => self.start(session, config),
            Request::NextTrial { session } => {
                let dispatch = self.trials(&session)?.next_trial()?;
                Ok(to_json(&dispatch))
            }
            Request::RecordResponse(RecordRequest { session, response }) => {
                let session = self.trials(&session)?;
                let result = session.record_response(response)?;
                // choices without a bound key (Stroop answers) are keys already
                let correct_key = result
                    .correct_choice
                    .as_deref()
                    .map(|choice| session.descriptor.key_for(choice).unwrap_or(choice));
                Ok(json!({
                    "status": "success",
                    "trial": result.trial,
                    "is_correct": result.is_correct,
                    "error_type": result.error_type,
                    "correct_choice": &result.correct_choice,
                    "correct_key": correct_key,
                }))
            }
            Request::Results { session } => self.results(&session),
            Request::Click {
                session,
                number,
                time_ms,
            } => {
                let outcome = self.trail(&session)?.click(number, time_ms)?;
                Ok(json!({
                    "status": "success",
                    "correct": outcome.correct,
                    "completed": outcome.completed,
                    "next_number": outcome.next_number,
                }))
            }
            Request::Complete { session } => {
                let trail = self.trail(&session)?;
                let summary = trail.complete()?;
                Ok(to_json(&TrailView::new(&summary, trail.clicks())))
            }
            Request::Close { session } => {
                let closed = self.sessions.remove(&session).is_some();
                tracing::info!(
                    target: "protocol",
                    session = %session,
                    closed,
                    live_sessions = self.sessions.len(),
                    "session_closed"
                );
                Ok(json!({ "status": "success", "session": session, "closed": closed }))
            }
        }
    }

    /// (Re)starts `id`. The replacement is built aside and only installed
    /// once it started, so a bad configuration keeps the old session.
    fn start(&mut self, id: String, config: TaskConfig) -> Result<Value, TaskError> {
        let paradigm = config.paradigm();
        let (session, total, targets) = match config {
            TaskConfig::TrailMaking(trail_config) => {
                let mut trail = TrailSession::new(T::default());
                let total = trail.start(&trail_config)? as usize;
                (TaskSession::Trail(trail), total, Some(trail_config.targets()))
            }
            other => {
                let rng = StdRng::from_rng(&mut self.seeder);
                let mut session = Session::new(paradigm, T::default(), rng)?;
                let total = session.start(&other)?;
                (TaskSession::Trials(session), total, None)
            }
        };
        self.sessions.insert(id.clone(), session);
        tracing::info!(
            target: "protocol",
            session = %id,
            task = paradigm.as_str(),
            total,
            live_sessions = self.sessions.len(),
            "session_registered"
        );
        let mut reply = json!({
            "status": "success",
            "session": id,
            "task": paradigm,
            "title": paradigm.descriptor().title,
            "total_trials": total,
        });
        if let Some(targets) = targets {
            reply["targets"] = json!(targets);
        }
        Ok(reply)
    }

    fn results(&self, id: &str) -> Result<Value, TaskError> {
        match self.sessions.get(id) {
            None => Err(TaskError::EmptyResultSet),
            Some(TaskSession::Trials(session)) => {
                let report = session.summary()?;
                Ok(to_json(&ResultsView::new(&report, session.results())))
            }
            Some(TaskSession::Trail(trail)) => {
                let summary = trail.summary()?;
                Ok(to_json(&TrailView::new(&summary, trail.clicks())))
            }
        }
    }

    fn trials(&mut self, id: &str) -> Result<&mut Session<T, StdRng>, TaskError> {
        match self.sessions.get_mut(id) {
            None => Err(TaskError::SequenceNotStarted),
            Some(TaskSession::Trials(session)) => Ok(session),
            Some(TaskSession::Trail(_)) => Err(out_of_sequence(format!(
                "session {id} runs trail making and takes clicks"
            ))),
        }
    }

    fn trail(&mut self, id: &str) -> Result<&mut TrailSession<T>, TaskError> {
        match self.sessions.get_mut(id) {
            None => Err(TaskError::SequenceNotStarted),
            Some(TaskSession::Trail(trail)) => Ok(trail),
            Some(TaskSession::Trials(session)) => Err(out_of_sequence(format!(
                "session {id} runs {} and takes trial responses",
                session.paradigm().as_str()
            ))),
        }
    }
}

fn to_json<S: Serialize>(value: &S) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        json!({ "status": "error", "kind": "internal", "message": err.to_string() })
    })
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fraction in `[0, 1]` as a percentage with two decimals.
pub fn percent(fraction: f64) -> f64 {
    round2(fraction * 100.0)
}

#[derive(Debug, Serialize)]
struct ConditionView {
    condition: Condition,
    total: usize,
    correct: usize,
    accuracy: f64,
    mean_rt_ms: f64,
    misses: usize,
    false_alarms: usize,
}

impl From<&ConditionSummary> for ConditionView {
    fn from(c: &ConditionSummary) -> Self {
        Self {
            condition: c.condition,
            total: c.total,
            correct: c.correct,
            accuracy: percent(c.accuracy),
            mean_rt_ms: round2(c.mean_rt_ms),
            misses: c.misses,
            false_alarms: c.false_alarms,
        }
    }
}

#[derive(Debug, Serialize)]
struct SignalDetectionView {
    hits: usize,
    misses: usize,
    false_alarms: usize,
    correct_rejections: usize,
    hit_rate: f64,
    false_alarm_rate: f64,
}

impl From<&SignalDetection> for SignalDetectionView {
    fn from(s: &SignalDetection) -> Self {
        Self {
            hits: s.hits,
            misses: s.misses,
            false_alarms: s.false_alarms,
            correct_rejections: s.correct_rejections,
            hit_rate: percent(s.hit_rate),
            false_alarm_rate: percent(s.false_alarm_rate),
        }
    }
}

/// Summary as shown to callers: rates in percent, times in ms, both
/// rounded to two decimals, followed by the raw per-trial results.
#[derive(Debug, Serialize)]
struct ResultsView<'a> {
    status: &'static str,
    task: Paradigm,
    total_trials: usize,
    correct_trials: usize,
    accuracy: f64,
    mean_rt_ms: f64,
    conditions: Vec<ConditionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effect_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_detection: Option<SignalDetectionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    trials: &'a [TrialResult],
}

impl<'a> ResultsView<'a> {
    fn new(report: &SummaryReport, trials: &'a [TrialResult]) -> Self {
        Self {
            status: "success",
            task: report.paradigm,
            total_trials: report.total_trials,
            correct_trials: report.correct_trials,
            accuracy: percent(report.accuracy),
            mean_rt_ms: round2(report.mean_rt_ms),
            conditions: report.conditions.iter().map(ConditionView::from).collect(),
            effect_ms: report.effect_ms.map(round2),
            signal_detection: report.signal_detection.as_ref().map(SignalDetectionView::from),
            elapsed_ms: report.elapsed_ms.map(round2),
            trials,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrailView<'a> {
    status: &'static str,
    task: Paradigm,
    total_time_ms: f64,
    errors: usize,
    total_clicks: usize,
    numbers_completed: u32,
    completed: bool,
    clicks: &'a [Click],
}

impl<'a> TrailView<'a> {
    fn new(summary: &TrailSummary, clicks: &'a [Click]) -> Self {
        Self {
            status: "success",
            task: Paradigm::TrailMaking,
            total_time_ms: round2(summary.total_time_ms),
            errors: summary.errors,
            total_clicks: summary.total_clicks,
            numbers_completed: summary.numbers_completed,
            completed: summary.completed,
            clicks,
        }
    }
}
