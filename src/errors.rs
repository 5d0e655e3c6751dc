/*!
 * Error types for the gemsrt application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when building or sending an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The response could not be parsed into the expected shape
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the remote service asked us to slow down
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_))
    }

    /// Whether the credential was rejected
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }
}

/// Errors that can occur while translating a single batch
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Non-retriable error from the provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The bounded retry budget ran out while the service kept rate limiting
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Total number of attempts made, including the first one
        attempts: u32,
        /// The error returned by the final attempt
        last_error: ProviderError,
    },

    /// The cancellation token fired while waiting
    #[error("Translation cancelled")]
    Cancelled,
}

impl TranslationError {
    /// Whether a retry at a higher level could ever succeed
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_authentication(),
            Self::RetriesExhausted { last_error, .. } => last_error.is_authentication(),
            Self::Cancelled => false,
        }
    }
}

/// Errors raised by the pipeline controller
#[derive(Error, Debug)]
pub enum PipelineError {
    /// There is nothing to translate
    #[error("No subtitle entries to translate")]
    NoEntries,

    /// No API key was supplied
    #[error("An API key is required to start a translation")]
    MissingCredential,

    /// The batch size must be a positive integer
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// A manual edit targeted a position that has not been translated
    #[error("Entry {index} is out of range ({len} translated entries)")]
    EntryOutOfRange {
        /// Requested position
        index: usize,
        /// Number of accumulated entries
        len: usize,
    },

    /// A manual edit would leave the entry without text
    #[error("Entry {index} cannot be replaced with empty text")]
    EmptyEntryText {
        /// Requested position
        index: usize,
    },

    /// A batch failed terminally
    #[error("Batch {batch} failed: {source}")]
    Batch {
        /// 1-based batch number
        batch: usize,
        /// Underlying translation error
        #[source]
        source: TranslationError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the pipeline controller
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
