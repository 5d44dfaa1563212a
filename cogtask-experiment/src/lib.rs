pub mod classifier;
pub mod config;
pub mod generator;
pub mod state;
pub mod summary;
pub mod trail;
pub mod trial;

pub use classifier::{Verdict, classify};
pub use config::{
    FlankerConfig, GoNoGoConfig, MAX_TRIALS, NBackConfig, StroopConfig, TaskConfig, TrailConfig,
};
pub use generator::{SequenceGenerator, generate};
pub use state::{Session, SessionState};
pub use summary::{ConditionSummary, SignalDetection, SummaryReport, summarize};
pub use trail::{Click, ClickOutcome, TrailSession, TrailSummary};
pub use trial::{Dispatch, TrialPayload};
