//! # testflow
#![allow(clippy::uninlined_format_args)]
//!
//! CLI tool that automates browser-based UI testing from natural-language
//! instructions.
//!
//! Free-text test instructions are translated line-by-line into a small
//! typed action vocabulary (navigate, click, type, wait, assert), executed
//! against a configured target site, and the free-text result of a run is
//! classified into structured issue buckets via keyword and pattern
//! matching.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Point testflow at the site under test
//! testflow config set --target-url "https://staging.example.com"
//!
//! # Create a test (runs a validation pass through the LLM agent)
//! testflow create "login flow" "go to /login
//! type \"alice\" into #username
//! type \"secret\" into #password
//! click the submit button
//! verify #dashboard"
//!
//! # Or create from a JSON object
//! testflow create --json '{"name":"login flow","instructions":"go to /login"}'
//!
//! # Run a test through the LLM-driven agent (needs OPENAI_API_KEY)
//! testflow run <test-id>
//!
//! # Run a test by translating the instructions and driving WebDriver
//! # directly (needs a running geckodriver or chromedriver)
//! testflow run <test-id> --scripted --browser firefox
//!
//! # Inspect stored tests
//! testflow list
//! testflow show <test-id>
//! ```
//!
//! Every command emits one JSON document on stdout; logs go to stderr so
//! the output stays pipeable into `jq`.

/// LLM-driven agent behind a narrow run(task, vision) interface
pub mod agent;

/// Heuristic classification of free-text run results
pub mod classifier;

/// Target-site configuration store
pub mod config;

/// Error types with CLI exit codes
pub mod errors;

/// Step execution against a live browser session
pub mod executor;

/// Per-run JSON log artifacts
pub mod runlog;

/// Orchestration of test creation and runs
pub mod runner;

/// Persistent test record store
pub mod store;

/// Natural-language instruction translation
pub mod translator;

/// WebDriver browser control
pub mod webdriver;

pub use agent::{AgentRunner, OpenAiAgent};
pub use classifier::{Classification, ReportMode, analyze, classify};
pub use config::{Config, ConfigPatch, ConfigStore};
pub use errors::TestflowError;
pub use runner::{CreateRequest, TestResult};
pub use store::{TestRecord, TestStatus, TestStore};
pub use translator::{ActionStep, translate};
pub use webdriver::{Browser, BrowserType, ViewportSize};
