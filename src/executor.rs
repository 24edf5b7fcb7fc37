//! Executes translated action steps against a live browser session.
//!
//! Failures never propagate as errors: every underlying failure is folded
//! into a human-readable issue string so a run always proceeds through its
//! remaining steps and reports everything it hit.

use std::time::Duration;
use tracing::debug;

use crate::translator::ActionStep;
use crate::webdriver::Browser;

/// Budget for assertion polling
const ASSERT_TIMEOUT: Duration = Duration::from_secs(5);

/// Perform one action step. Returns None on success, or a descriptive
/// failure string embedding the step and the underlying error.
pub async fn execute_step(browser: &Browser, step: &ActionStep) -> Option<String> {
    debug!("Executing step: {:?}", step);

    let result = match step {
        ActionStep::Navigate { target } => browser.goto(target).await,
        ActionStep::Click { target } => browser.click(target).await,
        ActionStep::Type { target, value } => browser.type_text(target, value).await,
        ActionStep::Wait { timeout_ms } => {
            tokio::time::sleep(Duration::from_millis(*timeout_ms)).await;
            Ok(())
        }
        ActionStep::Assert { target } => {
            // Assertion failures are non-fatal issue strings like any other
            return match browser.wait_for_selector(target, ASSERT_TIMEOUT).await {
                Ok(()) => None,
                Err(e) => Some(format!("Assertion failed: {} - {}", target, e)),
            };
        }
    };

    match result {
        Ok(()) => None,
        Err(e) => Some(format!("Step failed: {} - {}", describe(step), e)),
    }
}

/// Compact JSON rendering of a step for issue strings
fn describe(step: &ActionStep) -> String {
    serde_json::to_string(step).unwrap_or_else(|_| format!("{:?}", step))
}
