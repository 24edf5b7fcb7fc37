//! Heuristic classification of free-text run results.
//!
//! Best-effort keyword and pattern matching; false positives and negatives
//! are expected and accepted. Classification itself never fails: when no
//! rule matches, the result is treated as clean.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Value, json};

lazy_static! {
    /// Patterns indicating repeated attempts or inconsistent behavior.
    /// Checked before the plain keyword list.
    static ref REPEATED_PATTERNS: Vec<Regex> = [
        r"attempt.*(?:unsuccessful|failed)",
        r"tried .*(?:times|attempts)",
        r"repeated(?:ly)?.*(?:attempt|try)",
        r"multiple.*(?:attempt|try)",
        r"not (?:redirecting|redirected)",
        r"inconsistent",
        r"unexpected.*behavior",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("classifier pattern is valid"))
    .collect();
}

/// Basic error keywords, matched as plain substrings
const ERROR_KEYWORDS: [&str; 7] = [
    "error",
    "failed",
    "could not",
    "unable to",
    "404",
    "500",
    "not found",
];

/// Issue bucket for a run result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No matching rule; the run is considered successful
    Clean,
    /// Repeated attempts, failed redirects or otherwise erratic behavior
    InconsistentBehavior,
    /// The application returned an error or failed outright
    ErrorResponse,
}

/// Which wording the analysis payload uses. A test run frames issues as
/// errors with status `passed` on success; a creation-time validation pass
/// frames them as warnings with status `validated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Run,
    Validation,
}

/// Bucket a free-text result. Inconsistent-behavior patterns take
/// precedence over the plain keyword list.
pub fn classify(result: &str) -> Classification {
    let result_lower = result.to_lowercase();

    if REPEATED_PATTERNS.iter().any(|p| p.is_match(&result_lower)) {
        return Classification::InconsistentBehavior;
    }
    if ERROR_KEYWORDS.iter().any(|k| result_lower.contains(k)) {
        return Classification::ErrorResponse;
    }
    Classification::Clean
}

/// Classify a result and render the structured analysis payload
pub fn analyze(result: &str, mode: ReportMode) -> Value {
    let (subtype, description) = match classify(result) {
        Classification::Clean => {
            return json!({
                "status": match mode {
                    ReportMode::Run => "passed",
                    ReportMode::Validation => "validated",
                },
                "details": result,
            });
        }
        Classification::InconsistentBehavior => (
            "inconsistent_behavior",
            "The application showed inconsistent behavior or required multiple attempts to perform actions",
        ),
        Classification::ErrorResponse => (
            "error_response",
            "The application returned an error or failed to complete the requested action",
        ),
    };

    // A run frames issues as errors, a validation pass as warnings
    let (header_key, header_message) = match mode {
        ReportMode::Run => ("error", "Test execution failed"),
        ReportMode::Validation => ("warning", "Validation detected potential issues"),
    };

    let mut payload = serde_json::Map::new();
    payload.insert(header_key.to_string(), Value::String(header_message.to_string()));
    payload.insert("details".to_string(), Value::String(result.to_string()));
    payload.insert("type".to_string(), Value::String("frontend_issue".to_string()));
    payload.insert("subtype".to_string(), Value::String(subtype.to_string()));
    payload.insert("description".to_string(), Value::String(description.to_string()));
    Value::Object(payload)
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod classifier_test;
