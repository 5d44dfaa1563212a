use cogtask_core::{
    Condition, ErrorKind, Paradigm, ParadigmDescriptor, ScoringRule, TaskError, TrialResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub condition: Condition,
    pub total: usize,
    pub correct: usize,
    /// correct / total, 0 when the partition is empty
    pub accuracy: f64,
    /// Mean over correct trials with a reaction time, 0 when there are none.
    pub mean_rt_ms: f64,
    pub rt_count: usize,
    pub misses: usize,
    pub false_alarms: usize,
}

/// 2x2 outcome counts for withhold paradigms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetection {
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_rejections: usize,
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub paradigm: Paradigm,
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy: f64,
    pub mean_rt_ms: f64,
    pub conditions: Vec<ConditionSummary>,
    /// Mean RT of the harder condition minus that of the easier one.
    pub effect_ms: Option<f64>,
    pub signal_detection: Option<SignalDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<f64>,
}

impl SummaryReport {
    pub fn condition(&self, condition: Condition) -> Option<&ConditionSummary> {
        self.conditions.iter().find(|c| c.condition == condition)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean_rt<'a>(results: impl Iterator<Item = &'a TrialResult>) -> (f64, usize) {
    let (sum, n) = results
        .filter_map(TrialResult::scored_rt)
        .fold((0.0, 0usize), |(sum, n), rt| (sum + rt, n + 1));
    (if n == 0 { 0.0 } else { sum / n as f64 }, n)
}

fn count_errors<'a>(results: impl Iterator<Item = &'a TrialResult>, kind: ErrorKind) -> usize {
    results.filter(|r| r.error_type == Some(kind)).count()
}

fn summarize_condition(results: &[TrialResult], condition: Condition) -> ConditionSummary {
    let part = || results.iter().filter(move |r| r.condition == condition);
    let total = part().count();
    let correct = part().filter(|r| r.is_correct).count();
    let (mean_rt_ms, rt_count) = mean_rt(part());
    ConditionSummary {
        condition,
        total,
        correct,
        accuracy: ratio(correct, total),
        mean_rt_ms,
        rt_count,
        misses: count_errors(part(), ErrorKind::Miss),
        false_alarms: count_errors(part(), ErrorKind::FalseAlarm),
    }
}

fn signal_detection(results: &[TrialResult]) -> SignalDetection {
    let targets = results.iter().filter(|r| r.condition.is_target()).count();
    let lures = results.len() - targets;
    let hits = results
        .iter()
        .filter(|r| r.condition.is_target() && r.is_correct)
        .count();
    let correct_rejections = results
        .iter()
        .filter(|r| !r.condition.is_target() && r.is_correct)
        .count();
    let false_alarms = count_errors(results.iter(), ErrorKind::FalseAlarm);
    SignalDetection {
        hits,
        misses: count_errors(results.iter(), ErrorKind::Miss),
        false_alarms,
        correct_rejections,
        hit_rate: ratio(hits, targets),
        false_alarm_rate: ratio(false_alarms, lures),
    }
}

/// Aggregates a result list into overall and per-condition figures.
///
/// Pure over `results`; an empty list yields `EmptyResultSet` so callers can
/// tell "nothing recorded yet" from "everything wrong". Every condition the
/// paradigm declares gets a row, empty partitions reporting zeros.
pub fn summarize(
    descriptor: &ParadigmDescriptor,
    results: &[TrialResult],
) -> Result<SummaryReport, TaskError> {
    if results.is_empty() {
        return Err(TaskError::EmptyResultSet);
    }

    let correct_trials = results.iter().filter(|r| r.is_correct).count();
    let (mean_rt_ms, _) = mean_rt(results.iter());

    let conditions: Vec<ConditionSummary> = descriptor
        .conditions
        .iter()
        .map(|c| summarize_condition(results, *c))
        .collect();

    let effect_ms = descriptor.contrast.map(|contrast| {
        let rt = |condition| {
            conditions
                .iter()
                .find(|c| c.condition == condition)
                .map_or(0.0, |c| c.mean_rt_ms)
        };
        rt(contrast.harder) - rt(contrast.easier)
    });

    let signal_detection =
        (descriptor.scoring == ScoringRule::Withhold).then(|| signal_detection(results));

    Ok(SummaryReport {
        paradigm: descriptor.paradigm,
        total_trials: results.len(),
        correct_trials,
        accuracy: ratio(correct_trials, results.len()),
        mean_rt_ms,
        conditions,
        effect_ms,
        signal_detection,
        elapsed_ms: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogtask_core::paradigm::{FLANKER, GO_NO_GO};
    use cogtask_core::{Signal, Stimulus};

    fn flanker_result(
        symbols: &str,
        condition: Condition,
        correct: bool,
        rt: Option<f64>,
    ) -> TrialResult {
        TrialResult {
            trial: 1,
            stimulus: Stimulus::flanker_from_symbols(symbols).unwrap(),
            condition,
            response: rt.map(|_| "left".to_string()),
            reaction_time_ms: rt,
            is_correct: correct,
            error_type: None,
            correct_choice: Some("left".to_string()),
        }
    }

    fn gonogo_result(condition: Condition, responded: bool) -> TrialResult {
        let signal = if condition == Condition::Go {
            Signal::Go
        } else {
            Signal::NoGo
        };
        let (is_correct, error_type) = match (condition.is_target(), responded) {
            (true, true) | (false, false) => (true, None),
            (true, false) => (false, Some(ErrorKind::Miss)),
            (false, true) => (false, Some(ErrorKind::FalseAlarm)),
        };
        TrialResult {
            trial: 1,
            stimulus: Stimulus::Signal { signal },
            condition,
            response: responded.then(|| "space".to_string()),
            reaction_time_ms: responded.then_some(300.0),
            is_correct,
            error_type,
            correct_choice: None,
        }
    }

    #[test]
    fn empty_results_are_a_distinct_state() {
        assert_eq!(summarize(&FLANKER, &[]), Err(TaskError::EmptyResultSet));
    }

    #[test]
    fn flanker_interference_effect() {
        let results = vec![
            flanker_result("<<<<<", Condition::Congruent, true, Some(400.0)),
            flanker_result(">>>>>", Condition::Congruent, true, Some(420.0)),
            flanker_result("<<><<", Condition::Incongruent, true, Some(500.0)),
            flanker_result(">><>>", Condition::Incongruent, false, Some(250.0)),
        ];
        let report = summarize(&FLANKER, &results).unwrap();
        assert_eq!(report.total_trials, 4);
        assert_eq!(report.correct_trials, 3);
        assert_eq!(report.accuracy, 0.75);
        // the wrong 250ms trial does not count toward means
        assert!((report.mean_rt_ms - 440.0).abs() < 1e-9);

        let congruent = report.condition(Condition::Congruent).unwrap();
        assert_eq!(congruent.accuracy, 1.0);
        assert!((congruent.mean_rt_ms - 410.0).abs() < 1e-9);

        let incongruent = report.condition(Condition::Incongruent).unwrap();
        assert_eq!(incongruent.accuracy, 0.5);
        assert_eq!(incongruent.rt_count, 1);
        assert!((report.effect_ms.unwrap() - 90.0).abs() < 1e-9);
        assert!(report.signal_detection.is_none());
    }

    #[test]
    fn empty_partition_reports_zeros() {
        let results = vec![flanker_result("<<<<<", Condition::Congruent, true, Some(380.0))];
        let report = summarize(&FLANKER, &results).unwrap();
        let incongruent = report.condition(Condition::Incongruent).unwrap();
        assert_eq!(incongruent.total, 0);
        assert_eq!(incongruent.accuracy, 0.0);
        assert_eq!(incongruent.mean_rt_ms, 0.0);
        assert!((report.effect_ms.unwrap() + 380.0).abs() < 1e-9);
    }

    #[test]
    fn all_wrong_is_not_empty() {
        let results = vec![flanker_result("<<><<", Condition::Incongruent, false, None)];
        let report = summarize(&FLANKER, &results).unwrap();
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.mean_rt_ms, 0.0);
    }

    #[test]
    fn gonogo_signal_detection_counts() {
        let results = vec![
            gonogo_result(Condition::Go, true),
            gonogo_result(Condition::Go, true),
            gonogo_result(Condition::Go, false),
            gonogo_result(Condition::NoGo, false),
            gonogo_result(Condition::NoGo, true),
        ];
        let report = summarize(&GO_NO_GO, &results).unwrap();
        let sdt = report.signal_detection.clone().unwrap();
        assert_eq!(
            (sdt.hits, sdt.misses, sdt.false_alarms, sdt.correct_rejections),
            (2, 1, 1, 1)
        );
        assert!((sdt.hit_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(sdt.false_alarm_rate, 0.5);
        assert_eq!(report.condition(Condition::Go).unwrap().misses, 1);
        assert_eq!(report.condition(Condition::NoGo).unwrap().false_alarms, 1);
        assert!(report.effect_ms.is_none());
    }

    #[test]
    fn summarize_is_idempotent() {
        let results = vec![
            gonogo_result(Condition::Go, true),
            gonogo_result(Condition::NoGo, true),
        ];
        assert_eq!(
            summarize(&GO_NO_GO, &results),
            summarize(&GO_NO_GO, &results)
        );
    }
}
