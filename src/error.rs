use thiserror::Error;

/// Main error type for the waveform analysis engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Numeric analysis errors raised by the analyzers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Empty input: {context}")]
    EmptyInput { context: String },

    #[error("Non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    #[error("Invalid FFT size {size}: must be a non-zero power of two")]
    InvalidFftSize { size: usize },

    #[error("Invalid sample rate: {sample_rate}")]
    InvalidSampleRate { sample_rate: u32 },

    #[error("Window {offset}+{length} exceeds buffer of {buffer_len} samples")]
    WindowOutOfBounds {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },
}

/// Classification profile errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Invalid parameters for profile '{profile_id}': {details}")]
    InvalidParameters { profile_id: String, details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

impl AnalysisError {
    pub(crate) fn empty<S: Into<String>>(context: S) -> Self {
        Self::EmptyInput {
            context: context.into(),
        }
    }
}

impl EngineError {
    /// The analysis error behind this failure, if any
    pub fn as_analysis(&self) -> Option<&AnalysisError> {
        match self {
            Self::Analysis(e) => Some(e),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Analysis(AnalysisError::EmptyInput { .. }) => {
                "No samples to analyze. Provide a non-empty 'samples' array.".to_string()
            }
            Self::Analysis(AnalysisError::NonFiniteSample { index }) => {
                format!("Sample {} is NaN or infinite; the input must contain finite values only.", index)
            }
            Self::Analysis(AnalysisError::InvalidFftSize { size }) => {
                format!("FFT size {} is not a power of two (try 1024, 2048 or 4096).", size)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
