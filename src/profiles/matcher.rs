use crate::audio::stats::{self, offset_error};
use crate::audio::types::{AmplitudeDescriptor, SampleBuffer};
use crate::error::{AnalysisError, Result};
use crate::profiles::types::{Profile, ProfileRule, Region};

/// Confidence reported for every transition match
pub const TRANSITION_CONFIDENCE: f32 = 0.5;

/// Evaluates a profile over non-overlapping windows and emits matching regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileMatcher {
    default_window_sec: f64,
}

impl Default for ProfileMatcher {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ProfileMatcher {
    /// `default_window_sec` applies to rules that carry no window of their own
    pub fn new(default_window_sec: f64) -> Self {
        Self { default_window_sec }
    }

    /// Match one profile against the whole buffer, in time order
    pub fn match_profile(&self, buffer: &SampleBuffer, profile: &Profile) -> Result<Vec<Region>> {
        buffer.validate_sample_rate()?;
        profile.validate()?;
        if buffer.is_empty() {
            return Err(AnalysisError::empty("profile matching on an empty buffer").into());
        }

        if let ProfileRule::Custom(_) = profile.rule {
            tracing::debug!("Profile '{}' is custom; no built-in rule to evaluate", profile.id);
            return Ok(Vec::new());
        }

        let window_sec = profile.rule.window_sec().unwrap_or(self.default_window_sec);
        let window_size = (window_sec * buffer.sample_rate as f64).floor();
        if !window_size.is_finite() || window_size < 1.0 {
            return Err(profile.invalid(format!(
                "matching window of {}s holds no samples at {} Hz",
                window_sec, buffer.sample_rate
            )));
        }
        let window_size = window_size as usize;

        let mut regions = Vec::new();
        for (i, window) in buffer.samples.chunks(window_size).enumerate() {
            let offset = i * window_size;
            let descriptor = stats::amplitude(window).map_err(|e| offset_error(e, offset))?;

            let confidence = match evaluate(&profile.rule, window, &descriptor) {
                Ok(Some(confidence)) => confidence,
                Ok(None) => continue,
                Err(e) => return Err(offset_error(e, offset)),
            };

            regions.push(Region {
                id: format!("{}-{}", profile.id, regions.len()),
                start: buffer.time_for_sample(offset),
                end: buffer.time_for_sample(offset + window.len()),
                profile_id: profile.id.clone(),
                confidence,
                descriptor,
            });
        }

        tracing::debug!(
            "Profile '{}' ({}): {} regions from {}-sample windows",
            profile.id,
            profile.rule.kind(),
            regions.len(),
            window_size
        );

        Ok(regions)
    }
}

/// Confidence of a match, or `None` when the window does not match
fn evaluate(rule: &ProfileRule, window: &[f32], descriptor: &AmplitudeDescriptor) -> Result<Option<f32>> {
    let rms = descriptor.rms;
    let confidence = match rule {
        ProfileRule::Quiet { max_amplitude, .. } => {
            (rms < *max_amplitude).then(|| (1.0 - rms / max_amplitude).clamp(0.0, 1.0))
        }
        ProfileRule::Intensity { min_amplitude, .. } => {
            (rms > *min_amplitude).then(|| (rms / min_amplitude).clamp(0.0, 1.0))
        }
        ProfileRule::Transition { sensitivity, .. } => {
            (stats::variance(window)? > *sensitivity).then_some(TRANSITION_CONFIDENCE)
        }
        ProfileRule::Custom(_) => None,
    };
    Ok(confidence)
}
