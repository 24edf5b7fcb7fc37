//! LLM-driven browser agent behind a narrow, pluggable interface

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info};

/// Opaque capability that executes a natural-language task against the
/// target site and returns the raw result text. Model choice, prompting
/// and retries are the implementation's business.
#[allow(async_fn_in_trait)]
pub trait AgentRunner {
    async fn run(&self, task: &str, use_vision: bool) -> Result<String>;
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You are a browser automation agent for UI testing. \
Carry out the task against the website it names, step by step, and report \
what happened in plain text, including any errors, failed attempts or \
unexpected behavior you observe.";

/// Default agent backed by the OpenAI chat-completions endpoint
pub struct OpenAiAgent {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiAgent {
    /// Read `OPENAI_API_KEY` from the environment; absence is a user-facing
    /// configuration error, not a crash
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not found in environment variables"))?;
        Ok(OpenAiAgent {
            client: reqwest::Client::new(),
            api_key,
        })
    }
}

impl AgentRunner for OpenAiAgent {
    async fn run(&self, task: &str, use_vision: bool) -> Result<String> {
        info!("Running agent task (vision: {})", use_vision);
        debug!("Agent task: {}", task);

        let system = if use_vision {
            format!("{} Screenshot analysis is enabled for this run.", SYSTEM_PROMPT)
        } else {
            SYSTEM_PROMPT.to_string()
        };

        let body = json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": task },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", OPENAI_BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API returned {}: {}", status, text);
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .context("OpenAI API response missing message content")?;

        Ok(content.to_string())
    }
}

/// Build the task string handed to the agent for a test's instructions
pub fn agent_task(target_url: &str, instructions: &str) -> String {
    format!("On the website {}, {}", target_url, instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_task_framing() {
        assert_eq!(
            agent_task("http://x.com", "go to /login and verify the form"),
            "On the website http://x.com, go to /login and verify the form"
        );
    }
}
