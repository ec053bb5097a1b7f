//! Text generation: the model seam and the retry policy around it.

mod gemini;

pub use gemini::GeminiClient;

use crate::config::GenerationSettings;
use std::time::Duration;
use thiserror::Error;

/// Error from a single generation attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Quota or rate limit; worth retrying after a pause.
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Other(String),
}

/// A generation call that gave up. `Display` is the message shown to users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("API rate limit exceeded after {attempts} attempts. Please wait a minute and try again.")]
    RateLimitExhausted { attempts: u32, last: String },

    #[error("Error generating response: {0}")]
    Failed(String),
}

/// Something that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

/// Stands in for a client that could not be configured. Every call fails
/// with the configuration problem.
#[derive(Debug, Clone)]
pub struct UnavailableGenerator {
    reason: String,
}

impl UnavailableGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl TextGenerator for UnavailableGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Other(self.reason.clone()))
    }
}

/// The configured generation client. A missing API key only surfaces when
/// something is actually generated.
pub fn from_settings(settings: &GenerationSettings) -> Box<dyn TextGenerator> {
    match GeminiClient::from_settings(settings) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::debug!(error = %e, "Generation client unavailable");
            Box::new(UnavailableGenerator::new(e.to_string()))
        }
    }
}

/// Linear retry on rate limiting: fixed delay, bounded attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Call `generator`, sleeping `delay` and retrying while it reports a
    /// rate limit. Any other error ends the call immediately.
    pub fn run(
        &self,
        generator: &dyn TextGenerator,
        prompt: &str,
    ) -> Result<String, GenerationFailure> {
        let mut attempt = 1;
        loop {
            match generator.generate(prompt) {
                Ok(text) => return Ok(text),
                Err(GenerationError::RateLimited(msg)) if attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_secs = self.delay.as_secs(),
                        error = %msg,
                        "Rate limit hit, waiting before retry"
                    );
                    std::thread::sleep(self.delay);
                    attempt += 1;
                }
                Err(GenerationError::RateLimited(msg)) => {
                    tracing::error!(attempts = attempt, error = %msg, "Rate limit retries exhausted");
                    return Err(GenerationFailure::RateLimitExhausted {
                        attempts: attempt,
                        last: msg,
                    });
                }
                Err(GenerationError::Other(msg)) => {
                    tracing::error!(error = %msg, "Generation failed");
                    return Err(GenerationFailure::Failed(msg));
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{GenerationError, TextGenerator};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned results in order and records the prompts it saw.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(reply: &str) -> Self {
            Self::new(vec![Ok(reply.to_string())])
        }

        pub fn push(&self, reply: Result<String, GenerationError>) {
            self.replies.lock().unwrap().push_back(reply);
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Other("no scripted reply".to_string())))
        }
    }
}
