use crate::audio::stats::{self, offset_error};
use crate::audio::types::{PatternSummary, SampleBuffer, Section, Transition, TransitionDirection};
use crate::error::{AnalysisError, Result};

/// Windows with RMS above this are loud, independent of the quiet threshold
pub const LOUD_RMS: f32 = 0.7;

/// Span compared on each side of a transition boundary, in seconds
pub const TRANSITION_SPAN_SEC: f64 = 0.1;

/// Finds quiet/loud sections and abrupt loudness changes across a buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternDetector {
    threshold: f32,
    min_duration_sec: f64,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(0.1, 0.1)
    }
}

impl PatternDetector {
    /// `threshold` is the quiet RMS ceiling and the transition delta; `min_duration_sec`
    /// the section window length
    pub fn new(threshold: f32, min_duration_sec: f64) -> Self {
        Self {
            threshold,
            min_duration_sec,
        }
    }

    /// Detect sections and transitions over the whole buffer
    pub fn detect(&self, buffer: &SampleBuffer) -> Result<PatternSummary> {
        buffer.validate_sample_rate()?;
        if buffer.is_empty() {
            return Err(AnalysisError::empty("pattern detection on an empty buffer").into());
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(AnalysisError::InvalidParameter {
                name: "threshold".to_string(),
                value: self.threshold.to_string(),
            }
            .into());
        }

        let window_size = self.samples_for(self.min_duration_sec, buffer.sample_rate, "minDurationSec")?;
        let (quiet_sections, loud_sections) = self.classify_sections(buffer, window_size)?;
        let transitions = self.detect_transitions(buffer)?;

        tracing::debug!(
            "Patterns: {} quiet, {} loud, {} transitions ({}-sample windows)",
            quiet_sections.len(),
            loud_sections.len(),
            transitions.len(),
            window_size
        );

        Ok(PatternSummary {
            quiet_sections,
            loud_sections,
            transitions,
        })
    }

    fn samples_for(&self, seconds: f64, sample_rate: u32, name: &str) -> Result<usize> {
        let samples = (seconds * sample_rate as f64).floor();
        if !samples.is_finite() || samples < 1.0 {
            return Err(AnalysisError::InvalidParameter {
                name: name.to_string(),
                value: seconds.to_string(),
            }
            .into());
        }
        Ok(samples as usize)
    }

    fn classify_sections(
        &self,
        buffer: &SampleBuffer,
        window_size: usize,
    ) -> Result<(Vec<Section>, Vec<Section>)> {
        let mut quiet = Vec::new();
        let mut loud = Vec::new();

        for (i, window) in buffer.samples.chunks(window_size).enumerate() {
            let offset = i * window_size;
            let rms = stats::rms(window).map_err(|e| offset_error(e, offset))?;

            let section = Section {
                start: buffer.time_for_sample(offset),
                end: buffer.time_for_sample(offset + window.len()),
                rms,
            };

            if rms < self.threshold {
                quiet.push(section);
            } else if rms > LOUD_RMS {
                loud.push(section);
            }
        }

        Ok((quiet, loud))
    }

    fn detect_transitions(&self, buffer: &SampleBuffer) -> Result<Vec<Transition>> {
        let mut transitions = Vec::new();
        let step = (TRANSITION_SPAN_SEC * buffer.sample_rate as f64).floor() as usize;
        if step == 0 {
            return Ok(transitions);
        }

        let samples = &buffer.samples;
        let mut boundary = step;
        while boundary + step <= samples.len() {
            let before_rms = stats::rms(&samples[boundary - step..boundary])
                .map_err(|e| offset_error(e, boundary - step))?;
            let after_rms = stats::rms(&samples[boundary..boundary + step])
                .map_err(|e| offset_error(e, boundary))?;

            if (after_rms - before_rms).abs() > self.threshold {
                let direction = if after_rms > before_rms {
                    TransitionDirection::Increasing
                } else {
                    TransitionDirection::Decreasing
                };
                transitions.push(Transition {
                    time: buffer.time_for_sample(boundary),
                    direction,
                    before_rms,
                    after_rms,
                });
            }

            boundary += step;
        }

        Ok(transitions)
    }
}
