use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    audio::types::AnalysisOptions,
    error::{ConfigError, Result},
    profiles::Profile,
};

fn builtin_profiles() -> Vec<Profile> {
    Profile::builtin()
}

/// Main configuration for the analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Analysis defaults applied when a request leaves a field unset
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Profiles matched when a request supplies none
    #[serde(default = "builtin_profiles")]
    pub profiles: Vec<Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            profiles: builtin_profiles(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        for profile in &self.profiles {
            profile.validate()?;
        }
        Ok(())
    }

    /// Resolved options for the analyzer
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            sample_rate: self.analysis.sample_rate,
            fft_size: self.analysis.fft_size,
            threshold: self.analysis.threshold,
            min_duration_sec: self.analysis.min_duration_sec,
            window_size_sec: self.analysis.window_size_sec,
            profiles: self.profiles.clone(),
        }
    }
}

/// Analysis defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate assumed for requests that omit one (Hz)
    pub sample_rate: u32,

    /// FFT block size for spectral analysis
    pub fft_size: usize,

    /// Quiet/transition RMS threshold
    pub threshold: f32,

    /// Pattern window length in seconds
    pub min_duration_sec: f64,

    /// Default profile matching window in seconds
    pub window_size_sec: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let options = AnalysisOptions::default();
        Self {
            sample_rate: options.sample_rate,
            fft_size: options.fft_size,
            threshold: options.threshold,
            min_duration_sec: options.min_duration_sec,
            window_size_sec: options.window_size_sec,
        }
    }
}

impl AnalysisConfig {
    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.sample_rate".to_string(),
                value: self.sample_rate.to_string()
            }.into());
        }

        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::InvalidValue {
                key: "analysis.fft_size".to_string(),
                value: self.fft_size.to_string()
            }.into());
        }

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.threshold".to_string(),
                value: self.threshold.to_string()
            }.into());
        }

        for (key, seconds) in [
            ("analysis.min_duration_sec", self.min_duration_sec),
            ("analysis.window_size_sec", self.window_size_sec),
        ] {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: seconds.to_string()
                }.into());
            }
        }

        Ok(())
    }
}
