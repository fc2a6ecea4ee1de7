//! Observe/Validate/Evaluate harness for builder output.
//!
//! A three-phase check over one [`Implementation`], each phase gating the
//! next: observe captures the artifacts verbatim, validate runs mechanical
//! checks, evaluate judges the self-tests. The whole pipeline makes no model
//! calls; given the same implementation and clock it is a pure function.

mod checks;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::Implementation;
use crate::ports::Clock;

/// Verbatim capture of one implementation, untouched by interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The generated code as received.
    pub code: String,
    /// The generated self-tests as received.
    #[serde(default)]
    pub self_tests: Option<String>,
    /// When the observation was captured.
    pub captured_at: DateTime<Utc>,
    /// Length of the code in characters.
    pub code_len: usize,
}

/// Result of a single named mechanical check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check name (e.g. "syntax", "type_annotations").
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable detail, useful as retry feedback on failure.
    pub detail: String,
}

/// Outcome of the validate phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPhase {
    /// Per-check results. All checks run; a failing check never hides
    /// the others' diagnostics.
    pub checks: Vec<CheckOutcome>,
    /// Logical AND of all checks.
    pub passed: bool,
}

/// Outcome of the evaluate phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPhase {
    /// Whether evaluation passed (or was vacuously satisfied).
    pub passed: bool,
    /// Why: skipped, no tests to run, syntax verdict.
    pub reason: String,
}

/// Aggregate result of one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OveResult {
    /// Captured artifacts.
    pub observation: Observation,
    /// Mechanical check results.
    pub validation: ValidationPhase,
    /// Self-test judgment.
    pub evaluation: EvaluationPhase,
    /// `validation.passed && evaluation.passed`.
    pub overall_passed: bool,
}

/// Runs the three-phase check over implementations.
pub struct ValidationHarness {
    clock: Arc<dyn Clock>,
}

impl ValidationHarness {
    /// Creates a harness using the given clock for observation timestamps.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Runs observe, validate, and evaluate over one implementation.
    #[must_use]
    pub fn run(&self, implementation: &Implementation) -> OveResult {
        let observation = self.observe(implementation);
        let validation = validate(&observation);
        let evaluation = evaluate(&observation, &validation);
        let overall_passed = validation.passed && evaluation.passed;

        info!(
            task_id = implementation.task_id,
            attempt = implementation.attempt_number,
            validation = validation.passed,
            evaluation = evaluation.passed,
            overall = overall_passed,
            "harness run complete"
        );

        OveResult { observation, validation, evaluation, overall_passed }
    }

    /// Observe phase: capture artifacts verbatim. Cannot fail.
    fn observe(&self, implementation: &Implementation) -> Observation {
        Observation {
            code: implementation.code.clone(),
            self_tests: implementation.self_tests.clone(),
            captured_at: self.clock.now(),
            code_len: implementation.code.chars().count(),
        }
    }
}

/// Validate phase: the fixed battery of mechanical checks.
///
/// Empty code short-circuits to a single failed `has_code` check; otherwise
/// every check runs regardless of earlier failures so that diagnostics cover
/// everything wrong at once.
fn validate(observation: &Observation) -> ValidationPhase {
    let has_code = checks::check_has_code(&observation.code);
    if !has_code.passed {
        return ValidationPhase { checks: vec![has_code], passed: false };
    }

    let checks = vec![
        has_code,
        checks::check_syntax(&observation.code),
        checks::check_type_annotations(&observation.code),
        checks::check_doc_comments(&observation.code),
    ];
    let passed = checks.iter().all(|c| c.passed);
    ValidationPhase { checks, passed }
}

/// Evaluate phase: only attempted once validation has passed.
///
/// Absent self-tests are not penalized. Present self-tests are checked for
/// structural soundness; with no execution sandbox available that is the
/// extent of the judgment.
fn evaluate(observation: &Observation, validation: &ValidationPhase) -> EvaluationPhase {
    if !validation.passed {
        return EvaluationPhase { passed: false, reason: "skipped: validation failed".into() };
    }

    let Some(tests) = observation.self_tests.as_deref().filter(|t| !t.trim().is_empty()) else {
        return EvaluationPhase { passed: true, reason: "no tests to run".into() };
    };

    match checks::scan_structure(tests) {
        Ok(()) => EvaluationPhase {
            passed: true,
            reason: "self-test syntax valid; no execution sandbox configured".into(),
        },
        Err(problem) => EvaluationPhase {
            passed: false,
            reason: format!("self-test syntax error: {problem}"),
        },
    }
}

/// Summarizes a failed harness run as feedback for the next builder attempt.
#[must_use]
pub fn describe_failure(result: &OveResult) -> String {
    let mut parts: Vec<String> = result
        .validation
        .checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| format!("check '{}' failed: {}", c.name, c.detail))
        .collect();
    if !result.evaluation.passed {
        parts.push(format!("evaluation failed: {}", result.evaluation.reason));
    }
    if parts.is_empty() {
        return "harness passed".into();
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock pinned to a fixed instant.
    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn harness() -> ValidationHarness {
        let instant = "2025-03-01T12:00:00Z".parse().unwrap();
        ValidationHarness::new(Arc::new(FixedClock(instant)))
    }

    fn implementation(code: &str, tests: Option<&str>) -> Implementation {
        Implementation {
            task_id: 1,
            code: code.into(),
            self_tests: tests.map(Into::into),
            attempt_number: 1,
        }
    }

    const GOOD_CODE: &str =
        "/// Reverses a string.\nfn reverse(input: &str) -> String {\n    input.chars().rev().collect()\n}\n";

    #[test]
    fn well_formed_code_passes_overall() {
        let result = harness().run(&implementation(
            GOOD_CODE,
            Some("#[test]\nfn reverses() {\n    assert_eq!(reverse(\"ab\"), \"ba\");\n}\n"),
        ));
        assert!(result.validation.passed);
        assert!(result.evaluation.passed);
        assert!(result.overall_passed);
    }

    #[test]
    fn broken_syntax_fails_and_skips_evaluation() {
        let result = harness().run(&implementation("def f(:\n    pass\n", Some("assert True")));
        assert!(!result.validation.passed);
        assert!(!result.evaluation.passed);
        assert_eq!(result.evaluation.reason, "skipped: validation failed");
        assert!(!result.overall_passed);
    }

    #[test]
    fn syntax_failure_still_reports_other_checks() {
        // Broken delimiters AND no docs AND no annotations: all three surface.
        let result = harness().run(&implementation("def f(x):\n    return (x\n", None));
        let failed: Vec<&str> = result
            .validation
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect();
        assert!(failed.contains(&"syntax"));
        assert!(failed.contains(&"type_annotations"));
        assert!(failed.contains(&"docstring"));
    }

    #[test]
    fn missing_annotations_fail_validation() {
        let code = "\"\"\"module\"\"\"\ndef greet(name):\n    \"\"\"Greets.\"\"\"\n    return name\n";
        let result = harness().run(&implementation(code, None));
        assert!(!result.validation.passed);
        assert!(result
            .validation
            .checks
            .iter()
            .any(|c| c.name == "type_annotations" && !c.passed));
    }

    #[test]
    fn empty_code_short_circuits_to_has_code() {
        let result = harness().run(&implementation("", None));
        assert_eq!(result.validation.checks.len(), 1);
        assert_eq!(result.validation.checks[0].name, "has_code");
        assert!(!result.overall_passed);
    }

    #[test]
    fn absent_tests_are_not_penalized() {
        let result = harness().run(&implementation(GOOD_CODE, None));
        assert!(result.evaluation.passed);
        assert_eq!(result.evaluation.reason, "no tests to run");
        assert!(result.overall_passed);
    }

    #[test]
    fn broken_test_syntax_fails_evaluation() {
        let result = harness().run(&implementation(GOOD_CODE, Some("#[test]\nfn broken( {}\n")));
        assert!(result.validation.passed);
        assert!(!result.evaluation.passed);
        assert!(result.evaluation.reason.contains("self-test syntax error"));
        assert!(!result.overall_passed);
    }

    #[test]
    fn harness_is_deterministic() {
        let h = harness();
        let implementation = implementation(GOOD_CODE, Some("#[test]\nfn t() {}\n"));
        let first = h.run(&implementation);
        let second = h.run(&implementation);
        assert_eq!(first, second);
    }

    #[test]
    fn observation_captures_verbatim() {
        let result = harness().run(&implementation(GOOD_CODE, Some("tests")));
        assert_eq!(result.observation.code, GOOD_CODE);
        assert_eq!(result.observation.self_tests.as_deref(), Some("tests"));
        assert_eq!(result.observation.code_len, GOOD_CODE.chars().count());
        assert_eq!(result.observation.captured_at.to_rfc3339(), "2025-03-01T12:00:00+00:00");
    }

    #[test]
    fn describe_failure_lists_every_problem() {
        let result = harness().run(&implementation("def f(x):\n    return (x\n", None));
        let description = describe_failure(&result);
        assert!(description.contains("check 'syntax' failed"));
        assert!(description.contains("check 'docstring' failed"));
        assert!(description.contains("evaluation failed"));
    }
}
