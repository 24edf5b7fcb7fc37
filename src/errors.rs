use std::fmt;

/// Custom error type that includes exit codes
#[derive(Debug)]
pub enum TestflowError {
    /// Test record not found (exit code 2)
    TestNotFound(String),
    /// Target URL not configured (exit code 3)
    TargetUrlNotConfigured,
    /// OPENAI_API_KEY missing from the environment (exit code 4)
    ApiKeyMissing,
    /// WebDriver connection failed (exit code 5)
    WebDriverFailed(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl TestflowError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TestflowError::TestNotFound(_) => 2,
            TestflowError::TargetUrlNotConfigured => 3,
            TestflowError::ApiKeyMissing => 4,
            TestflowError::WebDriverFailed(_) => 5,
            TestflowError::Other(_) => 1,
        }
    }
}

impl fmt::Display for TestflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestflowError::TestNotFound(id) => {
                write!(f, "Test {} not found", id)
            }
            TestflowError::TargetUrlNotConfigured => {
                write!(
                    f,
                    "Target URL not configured. Set it with: testflow config set --target-url <URL>"
                )
            }
            TestflowError::ApiKeyMissing => {
                write!(f, "OPENAI_API_KEY not found in environment variables")
            }
            TestflowError::WebDriverFailed(msg) => {
                write!(f, "WebDriver connection failed: {}", msg)
            }
            TestflowError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TestflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TestflowError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for TestflowError {
    fn from(err: anyhow::Error) -> Self {
        // Try to detect specific error types from the error message
        let msg = err.to_string();

        if let Some(rest) = msg.strip_prefix("Test ")
            && let Some(id) = rest.strip_suffix(" not found")
        {
            TestflowError::TestNotFound(id.to_string())
        } else if msg.contains("Target URL not configured") {
            TestflowError::TargetUrlNotConfigured
        } else if msg.contains("OPENAI_API_KEY") {
            TestflowError::ApiKeyMissing
        } else if msg.contains("Failed to connect to WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            TestflowError::WebDriverFailed(msg)
        } else {
            TestflowError::Other(err)
        }
    }
}
