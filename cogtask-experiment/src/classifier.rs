use cogtask_core::{ErrorKind, ResponseEvent, ScoringRule, Trial, TrialResult};

/// Outcome of judging one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub is_correct: bool,
    pub error_type: Option<ErrorKind>,
    pub correct_choice: Option<&'static str>,
}

/// Judges `response` against `trial` under the paradigm's scoring rule.
///
/// Forced choice: correct iff the choice equals the stimulus' expected
/// answer; an absent choice is wrong without an error category.
///
/// Withhold: on target trials a response is a hit and silence a miss; on
/// other trials silence is a correct rejection and a response a false alarm.
///
/// Sequence: trail making is scored click by click in `TrailSession` and
/// never runs as a trial session, so a lone response cannot satisfy it.
pub fn classify(rule: ScoringRule, trial: &Trial, response: &ResponseEvent) -> Verdict {
    match rule {
        ScoringRule::ForcedChoice => {
            let expected = trial.stimulus.correct_choice();
            let is_correct = match (response.choice.as_deref(), expected) {
                (Some(choice), Some(expected)) => choice == expected,
                _ => false,
            };
            Verdict {
                is_correct,
                error_type: None,
                correct_choice: expected,
            }
        }
        ScoringRule::Sequence => Verdict {
            is_correct: false,
            error_type: None,
            correct_choice: None,
        },
        ScoringRule::Withhold => {
            let responded = response.has_response();
            let (is_correct, error_type) = match (trial.condition.is_target(), responded) {
                (true, true) => (true, None),
                (true, false) => (false, Some(ErrorKind::Miss)),
                (false, false) => (true, None),
                (false, true) => (false, Some(ErrorKind::FalseAlarm)),
            };
            Verdict {
                is_correct,
                error_type,
                correct_choice: None,
            }
        }
    }
}

impl Verdict {
    pub fn into_result(self, trial: &Trial, response: ResponseEvent) -> TrialResult {
        TrialResult {
            trial: trial.index,
            stimulus: trial.stimulus,
            condition: trial.condition,
            response: response.choice,
            reaction_time_ms: response.reaction_time_ms,
            is_correct: self.is_correct,
            error_type: self.error_type,
            correct_choice: self.correct_choice.map(str::to_string),
        }
    }
}
