//! Model backends and the service-level contracts they implement.

pub mod generator;
pub mod hub;
pub mod sentiment;

pub use generator::{CausalGenerator, GenerationOptions};
pub use sentiment::SentimentClassifier;

/// Outcome of a single classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

/// Outcome of a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub tokens_generated: usize,
}

/// Maps input text to a label from the model's label set with a confidence
/// score.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification>;
}

/// Produces a continuation string for an input prompt.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<Generation>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("model hub error: {0}")]
    Hub(String),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("model error: {0}")]
    Model(String),
    #[error("model config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejects empty or whitespace-only input, returning the trimmed text.
pub fn non_empty(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("text must not be empty".to_string()));
    }
    Ok(trimmed)
}
