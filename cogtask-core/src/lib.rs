pub mod error;
pub mod paradigm;
pub mod stimulus;
pub mod trial;

pub use error::{TaskError, TaskErrorKind};
pub use paradigm::{Contrast, Paradigm, ParadigmDescriptor, ResponseKey, ScoringRule, Timing};
pub use stimulus::{ArrowDirection, Color, GridPosition, Signal, Stimulus};
pub use trial::{Condition, ErrorKind, ResponseEvent, Trial, TrialResult};
