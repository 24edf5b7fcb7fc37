#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use testflow::agent::OpenAiAgent;
use testflow::config::{ConfigPatch, ConfigStore, data_dir};
use testflow::errors::TestflowError;
use testflow::runner::{self, CreateRequest};
use testflow::store::TestStore;
use testflow::webdriver::{BrowserType, ViewportSize};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const _EXIT_COMMAND_ERROR: i32 = 1;
const _EXIT_TEST_NOT_FOUND: i32 = 2;
const _EXIT_TARGET_URL_NOT_CONFIGURED: i32 = 3;
const _EXIT_API_KEY_MISSING: i32 = 4;
const _EXIT_WEBDRIVER_FAILED: i32 = 5;

#[derive(Parser)]
#[command(name = "testflow")]
#[command(about = "Natural-language UI testing from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a test and run a validation pass through the agent
    Create {
        /// Test name
        #[arg(required_unless_present = "json", conflicts_with = "json")]
        name: Option<String>,

        /// Natural-language instructions, one action per line
        #[arg(required_unless_present = "json", conflicts_with = "json")]
        instructions: Option<String>,

        /// Full create request as a JSON object (name, instructions, credentials)
        #[arg(long)]
        json: Option<String>,

        /// Login username stored with the test
        #[arg(long)]
        username: Option<String>,

        /// Login password stored with the test
        #[arg(long)]
        password: Option<String>,

        /// Disable screenshot analysis during validation
        #[arg(long)]
        no_vision: bool,
    },

    /// Run a stored test against the configured target site
    Run {
        /// Id of the test to run
        test_id: String,

        /// Translate the instructions and drive WebDriver directly,
        /// bypassing the LLM agent
        #[arg(long)]
        scripted: bool,

        /// Browser to use in scripted mode
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Viewport size in scripted mode (WIDTHxHEIGHT)
        #[arg(long, default_value = "1280x800")]
        viewport: String,

        /// Run the browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,

        /// Disable per-step screenshots / screenshot analysis
        #[arg(long)]
        no_vision: bool,
    },

    /// List all stored tests
    List,

    /// Show one stored test
    Show {
        /// Id of the test to show
        test_id: String,
    },

    /// Show or update the target-site configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Update configuration fields
    Set {
        /// Base URL of the site under test
        #[arg(long)]
        target_url: Option<String>,

        /// Run newly created tests immediately after creation
        #[arg(long)]
        auto_run: Option<bool>,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Handle exit codes based on error type
    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Convert to our error type to get proper exit code
            let tf_err: TestflowError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": tf_err.to_string(),
                "exit_code": tf_err.exit_code(),
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", tf_err);
            std::process::exit(tf_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testflow=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    let store = TestStore::new()?;
    let config_store = ConfigStore::new()?;
    let logs_dir = data_dir()?.join("logs");

    match cli.command {
        Commands::Create {
            name,
            instructions,
            json,
            username,
            password,
            no_vision,
        } => {
            let request = build_create_request(name, instructions, json, username, password)?;
            let agent = OpenAiAgent::from_env()?;

            let mut payload =
                runner::create_test(&store, &config_store, &agent, request, !no_vision).await?;

            // auto_run: execute the new test right away and attach the result
            if config_store.load()?.auto_run
                && let Some(test_id) = payload["id"].as_str().map(String::from)
            {
                let run_result = runner::run_test(
                    &store,
                    &config_store,
                    &agent,
                    &test_id,
                    !no_vision,
                    &logs_dir,
                )
                .await?;
                payload["run_result"] = run_result;
            }

            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Commands::Run {
            test_id,
            scripted,
            browser,
            viewport,
            no_headless,
            no_vision,
        } => {
            let payload = if scripted {
                let browser_type: BrowserType = browser.parse()?;
                let viewport = ViewportSize::parse(&viewport)?;
                runner::run_test_scripted(
                    &store,
                    &config_store,
                    &test_id,
                    browser_type,
                    viewport,
                    !no_headless,
                    !no_vision,
                    &logs_dir,
                )
                .await?
            } else {
                let agent = OpenAiAgent::from_env()?;
                runner::run_test(&store, &config_store, &agent, &test_id, !no_vision, &logs_dir)
                    .await?
            };

            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Commands::List => {
            let records = store.list()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Commands::Show { test_id } => {
            let Some(record) = store.get(&test_id)? else {
                anyhow::bail!("Test {} not found", test_id);
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = config_store.load()?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::Set {
                target_url,
                auto_run,
            } => {
                if let Some(target_url) = &target_url {
                    url::Url::parse(target_url)
                        .map_err(|e| anyhow::anyhow!("Invalid target URL '{}': {}", target_url, e))?;
                }
                let config = config_store.update(ConfigPatch {
                    target_url,
                    auto_run,
                })?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        },
    }

    Ok(())
}

/// Assemble the create request from positional args or the --json form
fn build_create_request(
    name: Option<String>,
    instructions: Option<String>,
    json: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<CreateRequest> {
    if let Some(json) = json {
        let request: CreateRequest =
            serde_json::from_str(&json).map_err(|e| anyhow::anyhow!("Invalid --json input: {}", e))?;
        return Ok(request);
    }

    // clap guarantees both positionals are present when --json is absent
    let name = name.unwrap_or_default();
    let instructions = instructions.unwrap_or_default();

    let credentials = match (username, password) {
        (None, None) => None,
        (username, password) => {
            let mut map = std::collections::HashMap::new();
            if let Some(username) = username {
                map.insert("username".to_string(), username);
            }
            if let Some(password) = password {
                map.insert("password".to_string(), password);
            }
            Some(map)
        }
    };

    Ok(CreateRequest {
        name,
        instructions,
        credentials,
    })
}
