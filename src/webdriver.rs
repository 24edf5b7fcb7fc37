//! WebDriver-backed browser session for scripted test runs

use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    /// Get the WebDriver URL for this browser type
    pub fn webdriver_url(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "http://localhost:4444",
            BrowserType::Chrome => "http://localhost:9515",
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1280x800")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1280x800)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

impl Default for ViewportSize {
    /// Matches the viewport the LLM agent runs with
    fn default() -> Self {
        ViewportSize {
            width: 1280,
            height: 800,
        }
    }
}

/// A live WebDriver session driving one browser window
pub struct Browser {
    client: Client,
    browser_type: BrowserType,
}

impl Browser {
    /// Connect to a running WebDriver and open a session
    pub async fn new(
        browser_type: BrowserType,
        viewport: ViewportSize,
        headless: bool,
    ) -> Result<Self> {
        let webdriver_url = browser_type.webdriver_url();
        info!("Connecting to {:?} WebDriver at {}", browser_type, webdriver_url);

        if !Self::is_webdriver_running(webdriver_url).await {
            let driver_name = match browser_type {
                BrowserType::Firefox => "geckodriver",
                BrowserType::Chrome => "chromedriver",
            };

            anyhow::bail!(
                "Failed to connect to WebDriver at {}.\n\
                Please ensure {} is running:\n\
                  For Firefox: geckodriver --port 4444\n\
                  For Chrome: chromedriver --port 9515",
                webdriver_url,
                driver_name
            );
        }

        let mut caps = serde_json::Map::new();

        match &browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                args.push(format!("--width={}", viewport.width));
                args.push(format!("--height={}", viewport.height));

                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                args.push(format!("--window-size={},{}", viewport.width, viewport.height));

                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        // Window sizing is best-effort; headless args above usually cover it
        if let Err(e) = client.set_window_size(viewport.width, viewport.height).await {
            debug!("Could not set window size: {}", e);
        }

        Ok(Browser {
            client,
            browser_type,
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    /// Navigate and wait for the document to be ready
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;

        let wait_script = "return document.readyState === 'complete';";

        // Poll readiness for up to 2 seconds; stale pages are worse than a
        // short extra wait
        for _ in 0..20 {
            match self.client.execute(wait_script, vec![]).await {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }

        Ok(())
    }

    /// Click the first element matching the selector
    pub async fn click(&self, selector: &str) -> Result<()> {
        debug!("Finding element with selector: {}", selector);
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .context(format!("Element not found: {}", selector))?;

        info!("Clicking element: {}", selector);
        element.click().await?;
        Ok(())
    }

    /// Type text into the first element matching the selector
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        debug!("Finding element with selector: {}", selector);
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .context(format!("Element not found: {}", selector))?;

        info!("Typing text into {}", selector);
        element.send_keys(text).await?;
        Ok(())
    }

    /// Poll for an element to appear within the timeout budget
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.client.find(Locator::Css(selector)).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!(
                    "Element {} did not appear within {}ms",
                    selector,
                    timeout.as_millis()
                );
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Fill the login form using the credential map's username/password keys.
    /// Selector groups cover the common markup variants.
    pub async fn login(&self, credentials: &HashMap<String, String>) -> Result<()> {
        let username = credentials.get("username").map(String::as_str).unwrap_or("");
        let password = credentials.get("password").map(String::as_str).unwrap_or("");

        self.type_text(r#"#username, [name="username"], [type="email"]"#, username)
            .await?;
        self.type_text(r#"#password, [name="password"]"#, password)
            .await?;
        self.click(r#"[type="submit"], .login-button, .submit-button"#)
            .await?;

        // Give the post-login navigation a chance to settle
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(())
    }

    /// Capture a PNG screenshot of the current page
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod webdriver_test;
