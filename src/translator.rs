//! Turns free-text instructions into typed browser action steps.
//!
//! Translation is line-oriented: blank lines are dropped, each line is
//! lower-cased, and an ordered rule list is scanned; the first rule whose
//! trigger matches claims the line. A claimed line can still yield no step
//! when its payload is malformed (e.g. a `type` line without a quoted
//! value), and a line no rule claims is dropped with a debug-level warning.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One browser operation produced by the translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionStep {
    /// Load a URL
    Navigate { target: String },
    /// Click the element described by `target`
    Click { target: String },
    /// Type `value` into the element described by `target`
    Type { target: String, value: String },
    /// Pause for a number of milliseconds
    Wait { timeout_ms: u64 },
    /// Assert the element described by `target` becomes present
    Assert { target: String },
}

/// One entry in the translation rule list. Rules are independent and
/// unit-testable; order in [`RULES`] is the only coupling between them.
struct LineRule {
    name: &'static str,
    /// Does this rule claim the line?
    trigger: fn(&str) -> bool,
    /// Parse the claimed line into a step, or drop it
    parse: fn(&str, &str) -> Option<ActionStep>,
}

/// Fixed-priority rule list: navigation, click, type, wait, assert
const RULES: &[LineRule] = &[
    LineRule {
        name: "navigate",
        trigger: |line| line.contains("go to") || line.contains("navigate to"),
        parse: parse_navigate,
    },
    LineRule {
        name: "click",
        trigger: |line| line.contains("click"),
        parse: parse_click,
    },
    LineRule {
        name: "type",
        trigger: |line| line.contains("type") || line.contains("enter"),
        parse: parse_type,
    },
    LineRule {
        name: "wait",
        trigger: |line| line.contains("wait"),
        parse: parse_wait,
    },
    LineRule {
        name: "assert",
        trigger: |line| ASSERT_WORDS.iter().any(|w| line.contains(w)),
        parse: parse_assert,
    },
];

const ASSERT_WORDS: [&str; 3] = ["verify", "check", "assert"];

/// Translate a multi-line instruction string into an ordered step sequence
pub fn translate(instructions: &str, base_url: &str) -> Vec<ActionStep> {
    instructions
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .filter_map(|line| translate_line(&line, base_url))
        .collect()
}

/// Translate a single lower-cased line; None when no rule claims it or the
/// claiming rule cannot parse a step out of it
pub fn translate_line(line: &str, base_url: &str) -> Option<ActionStep> {
    for rule in RULES {
        if (rule.trigger)(line) {
            let step = (rule.parse)(line, base_url);
            if step.is_none() {
                debug!("Dropped malformed '{}' instruction: {}", rule.name, line);
            }
            return step;
        }
    }
    debug!("No rule matched instruction line: {}", line);
    None
}

/// Text after the last occurrence of `keyword`, trimmed
fn after_last<'a>(line: &'a str, keyword: &str) -> &'a str {
    match line.rfind(keyword) {
        Some(idx) => line[idx + keyword.len()..].trim(),
        None => line,
    }
}

fn parse_navigate(line: &str, base_url: &str) -> Option<ActionStep> {
    let route = if line.contains("go to") {
        after_last(line, "go to")
    } else {
        after_last(line, "navigate to")
    };

    // Absolute URLs pass through verbatim; routes are joined onto the base
    let target = if route.starts_with("http") {
        route.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    };
    Some(ActionStep::Navigate { target })
}

fn parse_click(line: &str, _base_url: &str) -> Option<ActionStep> {
    // The remainder is passed through verbatim; selector resolution is the
    // executor/agent's job
    Some(ActionStep::Click {
        target: after_last(line, "click").to_string(),
    })
}

fn parse_type(line: &str, _base_url: &str) -> Option<ActionStep> {
    let parts: Vec<&str> = line.split(" into ").collect();
    if parts.len() != 2 {
        return None;
    }

    let quote = if parts[0].contains('"') { '"' } else { '\'' };
    let value = parts[0].splitn(3, quote).nth(1)?;

    Some(ActionStep::Type {
        target: parts[1].trim().to_string(),
        value: value.to_string(),
    })
}

fn parse_wait(line: &str, _base_url: &str) -> Option<ActionStep> {
    // All digits in the line, concatenated in order
    let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
    let timeout_ms = digits.parse().ok()?;
    Some(ActionStep::Wait { timeout_ms })
}

fn parse_assert(line: &str, _base_url: &str) -> Option<ActionStep> {
    // First word in the fixed verify/check/assert order wins
    let word = ASSERT_WORDS.iter().find(|w| line.contains(*w))?;
    Some(ActionStep::Assert {
        target: after_last(line, word).to_string(),
    })
}

#[cfg(test)]
#[path = "translator_test.rs"]
mod translator_test;
