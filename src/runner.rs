//! Run orchestration: wires the stores, translator, executor, agent and
//! classifier together and owns the status transitions of a test record.

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::agent::{AgentRunner, agent_task};
use crate::classifier::{Classification, ReportMode, analyze, classify};
use crate::config::ConfigStore;
use crate::executor::execute_step;
use crate::runlog::{RunLog, write_run_log};
use crate::store::{TestRecord, TestStatus, TestStore};
use crate::translator::translate;
use crate::webdriver::{Browser, BrowserType, ViewportSize};

/// Outcome of one scripted run
#[derive(Debug, Clone, serde::Serialize)]
pub struct TestResult {
    pub status: TestStatus,
    pub issues: Vec<String>,
    /// Wall-clock execution time in seconds
    pub execution_time: f64,
    pub timestamp: chrono::DateTime<Utc>,
}

/// Input for test creation, either from positional args or a JSON object
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    pub name: String,
    pub instructions: String,
    #[serde(default)]
    pub credentials: Option<HashMap<String, String>>,
}

/// Load the record and the configured target URL, or fail descriptively
fn prepare_run(
    store: &TestStore,
    config_store: &ConfigStore,
    test_id: &str,
) -> Result<(TestRecord, String)> {
    let Some(record) = store.get(test_id)? else {
        anyhow::bail!("Test {} not found", test_id);
    };

    let config = config_store.load()?;
    let Some(target_url) = config.target_url else {
        // A run without a target is a configuration error; still stamp the
        // record so the failure is visible in listings
        store.update_status(test_id, TestStatus::Failed)?;
        anyhow::bail!("Target URL not configured");
    };

    Ok((record, target_url))
}

/// Run a test through the LLM agent and classify the result text.
///
/// Execution errors never propagate: they become an execution-error payload
/// and the record is marked failed. Only missing records and configuration
/// problems return Err.
pub async fn run_test<A: AgentRunner>(
    store: &TestStore,
    config_store: &ConfigStore,
    agent: &A,
    test_id: &str,
    use_vision: bool,
    logs_dir: &Path,
) -> Result<Value> {
    let (record, target_url) = prepare_run(store, config_store, test_id)?;

    store.update_status(test_id, TestStatus::Running)?;

    let task = agent_task(&target_url, &record.instructions);
    let started = std::time::Instant::now();

    let payload = match agent.run(&task, use_vision).await {
        Ok(result) => {
            let analysis = analyze(&result, ReportMode::Run);
            let (status, issues) = match classify(&result) {
                Classification::Clean => (TestStatus::Passed, Vec::new()),
                _ => (TestStatus::Failed, vec![result]),
            };

            store.update_status(test_id, status)?;
            write_run_log(
                logs_dir,
                &RunLog {
                    instructions: record.instructions.clone(),
                    target_url,
                    execution_time: started.elapsed().as_secs_f64(),
                    issues,
                    status,
                    timestamp: Utc::now(),
                },
            )?;
            analysis
        }
        Err(e) => {
            warn!("Agent run failed: {}", e);
            store.update_status(test_id, TestStatus::Failed)?;

            let details = e.to_string();
            write_run_log(
                logs_dir,
                &RunLog {
                    instructions: record.instructions.clone(),
                    target_url,
                    execution_time: started.elapsed().as_secs_f64(),
                    issues: vec![details.clone()],
                    status: TestStatus::Failed,
                    timestamp: Utc::now(),
                },
            )?;

            json!({
                "error": "Test execution error",
                "details": details,
                "type": "execution_error",
                "subtype": "runtime_error",
                "description": "An error occurred while executing the test",
            })
        }
    };

    Ok(payload)
}

/// Run a test by translating its instructions and driving a WebDriver
/// session directly, without the LLM agent.
pub async fn run_test_scripted(
    store: &TestStore,
    config_store: &ConfigStore,
    test_id: &str,
    browser_type: BrowserType,
    viewport: ViewportSize,
    headless: bool,
    use_vision: bool,
    logs_dir: &Path,
) -> Result<Value> {
    let (record, target_url) = prepare_run(store, config_store, test_id)?;

    store.update_status(test_id, TestStatus::Running)?;

    // A session that never opened still counts as a failed run
    let browser = match Browser::new(browser_type, viewport, headless).await {
        Ok(browser) => browser,
        Err(e) => {
            store.update_status(test_id, TestStatus::Failed)?;
            return Err(e);
        }
    };

    let started = std::time::Instant::now();
    let timestamp = Utc::now();
    let shots_dir = logs_dir.join(format!("screenshots_{}", timestamp.format("%Y%m%d_%H%M%S")));

    let mut issues = Vec::new();
    if let Err(e) = drive(&browser, &record, &target_url, use_vision, &shots_dir, &mut issues).await
    {
        issues.push(format!("Execution error: {}", e));
    }

    // The session is closed on every path, including aborted runs
    if let Err(e) = browser.close().await {
        debug!("Error closing browser session: {}", e);
    }

    let status = if issues.is_empty() {
        TestStatus::Passed
    } else {
        TestStatus::Failed
    };
    store.update_status(test_id, status)?;

    let result = TestResult {
        status,
        issues,
        execution_time: started.elapsed().as_secs_f64(),
        timestamp,
    };

    write_run_log(
        logs_dir,
        &RunLog {
            instructions: record.instructions.clone(),
            target_url,
            execution_time: result.execution_time,
            issues: result.issues.clone(),
            status,
            timestamp,
        },
    )?;

    Ok(serde_json::to_value(&result)?)
}

/// Drive the session through login and the translated steps, collecting
/// per-step failure strings. A hard failure here aborts the remaining
/// steps; the issues gathered so far survive in `issues`.
async fn drive(
    browser: &Browser,
    record: &TestRecord,
    target_url: &str,
    use_vision: bool,
    shots_dir: &Path,
    issues: &mut Vec<String>,
) -> Result<()> {
    browser.goto(target_url).await?;

    if let Some(credentials) = &record.credentials {
        browser.login(credentials).await?;
    }

    let steps = translate(&record.instructions, target_url);
    info!("Executing {} translated steps", steps.len());

    for (index, step) in steps.iter().enumerate() {
        if let Some(issue) = execute_step(browser, step).await {
            issues.push(issue);
        }

        if use_vision {
            // Per-step screenshots for visual verification; best-effort
            match browser.screenshot().await {
                Ok(png) => {
                    if fs::create_dir_all(shots_dir).is_ok() {
                        let path = shots_dir.join(format!("step_{}.png", index));
                        if let Err(e) = fs::write(&path, png) {
                            debug!("Could not save screenshot: {}", e);
                        }
                    }
                }
                Err(e) => debug!("Could not capture screenshot: {}", e),
            }
        }
    }

    Ok(())
}

/// Create a test record, then run a validation pass through the agent.
///
/// Validation problems are warnings on stderr, not failures: the record is
/// created either way and the returned payload carries the validation
/// analysis in its `browser_info` block.
pub async fn create_test<A: AgentRunner>(
    store: &TestStore,
    config_store: &ConfigStore,
    agent: &A,
    request: CreateRequest,
    use_vision: bool,
) -> Result<Value> {
    if request.name.trim().is_empty() || request.instructions.trim().is_empty() {
        anyhow::bail!("Name and instructions are required");
    }

    let config = config_store.load()?;
    let Some(target_url) = config.target_url else {
        anyhow::bail!("Target URL not configured");
    };

    let record = store.create(&request.name, &request.instructions, request.credentials)?;

    let task = agent_task(&target_url, &record.instructions);
    let validation = match agent.run(&task, use_vision).await {
        Ok(result) => {
            let analysis = analyze(&result, ReportMode::Validation);
            if analysis.get("warning").is_some() {
                eprintln!("{}", serde_json::to_string_pretty(&analysis)?);
            }
            analysis
        }
        Err(e) => {
            let analysis = json!({
                "warning": "Validation failed",
                "details": e.to_string(),
                "type": "validation_error",
                "subtype": "execution_error",
                "description": "Failed to complete validation",
            });
            eprintln!("{}", serde_json::to_string_pretty(&analysis)?);
            analysis
        }
    };

    let mut payload = serde_json::to_value(&record)?;
    payload["browser_info"] = json!({
        "browser": "llm-agent",
        "status": "initialized",
        "target_url": target_url,
        "validation_result": validation,
    });

    Ok(payload)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
