//! Unified error handling for the RAG query core.
//!
//! Every fallible operation in the pipeline returns [`Result`]. Provider
//! failures are never caught inside the pipeline; they travel through
//! `RagService::query` to the calling layer unchanged.

use std::fmt;

/// Main error type for the RAG query core.
#[derive(Debug)]
pub enum RagError {
    /// Configuration-related errors
    Config {
        /// Error message
        message: String,
    },

    /// I/O errors from file operations
    Io(std::io::Error),

    /// HTTP transport errors from provider calls
    Http(Box<ureq::Error>),

    /// JSON serialization/deserialization errors
    Json(serde_json::Error),

    /// Embedding provider errors
    Embedding {
        /// Error message
        message: String,
    },

    /// Graph store read errors
    GraphStore {
        /// Error message
        message: String,
    },

    /// Language model completion errors
    LanguageModel {
        /// Error message
        message: String,
    },

    /// Malformed structured output from a language model call
    StructuredOutput {
        /// Error message
        message: String,
    },

    /// Configuration validation errors
    Validation {
        /// Error message
        message: String,
    },
}

impl fmt::Display for RagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagError::Config { message } => {
                write!(
                    f,
                    "Configuration error: {message}. \
                     Solution: check the config file or start from Config::default()"
                )
            },
            RagError::Io(err) => {
                write!(f, "I/O error: {err}")
            },
            RagError::Http(err) => {
                write!(
                    f,
                    "HTTP request error: {err}. \
                     Solution: check network connectivity and service availability"
                )
            },
            RagError::Json(err) => {
                write!(f, "JSON error: {err}")
            },
            RagError::Embedding { message } => {
                write!(f, "Embedding error: {message}")
            },
            RagError::GraphStore { message } => {
                write!(f, "Graph store error: {message}")
            },
            RagError::LanguageModel { message } => {
                write!(
                    f,
                    "Language model error: {message}. \
                     Solution: check the provider endpoint and model name in the llm config"
                )
            },
            RagError::StructuredOutput { message } => {
                write!(f, "Structured output error: {message}")
            },
            RagError::Validation { message } => {
                write!(f, "Validation error: {message}")
            },
        }
    }
}

impl std::error::Error for RagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RagError::Io(err) => Some(err),
            RagError::Http(err) => Some(err.as_ref()),
            RagError::Json(err) => Some(err),
            _ => None,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err)
    }
}

impl From<ureq::Error> for RagError {
    fn from(err: ureq::Error) -> Self {
        RagError::Http(Box::new(err))
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::Json(err)
    }
}

impl From<toml::de::Error> for RagError {
    fn from(err: toml::de::Error) -> Self {
        RagError::Config {
            message: err.to_string(),
        }
    }
}

impl From<crate::llm::structured::StructuredParseError> for RagError {
    fn from(err: crate::llm::structured::StructuredParseError) -> Self {
        RagError::StructuredOutput {
            message: err.to_string(),
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, RagError>;

/// Trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context(self, context: &str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<RagError>,
{
    fn with_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            match base_error {
                RagError::Config { message } => RagError::Config {
                    message: format!("{context}: {message}"),
                },
                RagError::Embedding { message } => RagError::Embedding {
                    message: format!("{context}: {message}"),
                },
                RagError::GraphStore { message } => RagError::GraphStore {
                    message: format!("{context}: {message}"),
                },
                RagError::LanguageModel { message } => RagError::LanguageModel {
                    message: format!("{context}: {message}"),
                },
                RagError::StructuredOutput { message } => RagError::StructuredOutput {
                    message: format!("{context}: {message}"),
                },
                RagError::Validation { message } => RagError::Validation {
                    message: format!("{context}: {message}"),
                },
                other => other, // For errors that don't have a message field
            }
        })
    }
}
