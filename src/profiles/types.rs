use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audio::types::AmplitudeDescriptor;
use crate::error::{EngineError, ProfileError, Result};

fn default_min_duration_sec() -> f64 {
    1.0
}

fn default_transition_window_sec() -> f64 {
    1.0
}

/// Classification rule of a profile, one variant per profile type
///
/// On the wire the variant is the profile's `type` and its fields live under `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "lowercase")]
pub enum ProfileRule {
    /// Windows whose RMS stays under `max_amplitude`
    Quiet {
        #[serde(rename = "maxAmplitude")]
        max_amplitude: f32,

        #[serde(rename = "minDurationSec", default = "default_min_duration_sec")]
        min_duration_sec: f64,
    },

    /// Windows whose RMS exceeds `min_amplitude`
    Intensity {
        #[serde(rename = "minAmplitude")]
        min_amplitude: f32,

        /// Carried for the profile store; matching only uses `min_amplitude`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f32>,
    },

    /// Windows whose sample variance exceeds `sensitivity`
    Transition {
        sensitivity: f32,

        #[serde(rename = "windowSizeSec", default = "default_transition_window_sec")]
        window_size_sec: f64,
    },

    /// User-defined parameters with no built-in matching rule
    Custom(BTreeMap<String, serde_json::Value>),
}

impl ProfileRule {
    /// Short type label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Quiet { .. } => "quiet",
            Self::Intensity { .. } => "intensity",
            Self::Transition { .. } => "transition",
            Self::Custom(_) => "custom",
        }
    }

    /// Matching window carried by the rule itself, if any
    pub fn window_sec(&self) -> Option<f64> {
        match self {
            Self::Transition {
                window_size_sec, ..
            } => Some(*window_size_sec),
            Self::Quiet { .. } | Self::Intensity { .. } | Self::Custom(_) => None,
        }
    }
}

/// A classification profile supplied by the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub rule: ProfileRule,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rule: ProfileRule) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule,
        }
    }

    /// The store's preloaded defaults: "Quiet Section", "High Intensity", "Transition"
    pub fn builtin() -> Vec<Profile> {
        vec![
            Profile::new(
                "quiet-section",
                "Quiet Section",
                ProfileRule::Quiet {
                    max_amplitude: 0.1,
                    min_duration_sec: 1.0,
                },
            ),
            Profile::new(
                "high-intensity",
                "High Intensity",
                ProfileRule::Intensity {
                    min_amplitude: 0.7,
                    threshold: Some(0.8),
                },
            ),
            Profile::new(
                "transition",
                "Transition",
                ProfileRule::Transition {
                    sensitivity: 0.3,
                    window_size_sec: 0.5,
                },
            ),
        ]
    }

    /// Parse a profile from JSON, reporting missing or mistyped fields as invalid parameters
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Profile = serde_json::from_str(json).map_err(|e| ProfileError::InvalidParameters {
            profile_id: "<unparsed>".to_string(),
            details: e.to_string(),
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check the rule's numeric parameters
    pub fn validate(&self) -> Result<()> {
        match &self.rule {
            ProfileRule::Quiet {
                max_amplitude,
                min_duration_sec,
            } => {
                self.require_positive("maxAmplitude", *max_amplitude as f64)?;
                self.require_positive("minDurationSec", *min_duration_sec)?;
            }
            ProfileRule::Intensity {
                min_amplitude,
                threshold,
            } => {
                self.require_positive("minAmplitude", *min_amplitude as f64)?;
                if let Some(threshold) = threshold {
                    if !threshold.is_finite() {
                        return Err(self.invalid(format!("threshold must be finite, got {}", threshold)));
                    }
                }
            }
            ProfileRule::Transition {
                sensitivity,
                window_size_sec,
            } => {
                if !sensitivity.is_finite() || *sensitivity < 0.0 {
                    return Err(self.invalid(format!(
                        "sensitivity must be a non-negative number, got {}",
                        sensitivity
                    )));
                }
                self.require_positive("windowSizeSec", *window_size_sec)?;
            }
            ProfileRule::Custom(_) => {}
        }
        Ok(())
    }

    fn require_positive(&self, name: &str, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(self.invalid(format!("{} must be positive, got {}", name, value)));
        }
        Ok(())
    }

    pub(crate) fn invalid(&self, details: String) -> EngineError {
        ProfileError::InvalidParameters {
            profile_id: self.id.clone(),
            details,
        }
        .into()
    }
}

/// A labeled time span where a profile matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// `"{profile_id}-{n}"`, stable across repeated analyses
    pub id: String,

    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    pub profile_id: String,

    /// Match strength in 0.0..=1.0
    pub confidence: f32,

    /// Amplitude statistics of the matched window
    pub descriptor: AmplitudeDescriptor,
}

impl Region {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether two regions share any time
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start < other.end && other.start < self.end
    }
}
