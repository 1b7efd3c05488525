use crate::audio::types::{AmplitudeDescriptor, SampleBuffer, Window};
use crate::error::{AnalysisError, EngineError, Result};

/// Window-level amplitude statistics
pub struct WindowStats;

impl WindowStats {
    /// Compute the amplitude descriptor of `window` within `buffer`
    pub fn analyze(buffer: &SampleBuffer, window: Window) -> Result<AmplitudeDescriptor> {
        let samples = buffer.slice(window)?;
        amplitude(samples).map_err(|err| offset_error(err, window.offset))
    }
}

/// Single-pass amplitude descriptor of a non-empty, finite slice
pub fn amplitude(samples: &[f32]) -> Result<AmplitudeDescriptor> {
    if samples.is_empty() {
        return Err(AnalysisError::empty("amplitude window has no samples").into());
    }

    let mut sum_abs = 0.0f64;
    let mut sum_squares = 0.0f64;
    let mut peak = 0.0f32;
    let mut zero_crossings = 0usize;
    let mut previous_non_negative: Option<bool> = None;

    for (index, &sample) in samples.iter().enumerate() {
        if !sample.is_finite() {
            return Err(AnalysisError::NonFiniteSample { index }.into());
        }

        let magnitude = sample.abs();
        sum_abs += magnitude as f64;
        sum_squares += sample as f64 * sample as f64;
        peak = peak.max(magnitude);

        // 0.0 counts as non-negative
        let non_negative = sample >= 0.0;
        if previous_non_negative.is_some_and(|prev| prev != non_negative) {
            zero_crossings += 1;
        }
        previous_non_negative = Some(non_negative);
    }

    let n = samples.len() as f64;
    let average = (sum_abs / n) as f32;
    // Rounding in the mean can push rms a hair above peak
    let rms = ((sum_squares / n).sqrt() as f32).min(peak);

    let (dynamic_range_db, crest_factor) = if peak > 0.0 && rms > 0.0 {
        let crest = peak / rms;
        (20.0 * crest.log10(), crest)
    } else {
        (0.0, 0.0)
    };

    Ok(AmplitudeDescriptor {
        rms,
        peak,
        average,
        dynamic_range_db,
        crest_factor,
        zero_crossings,
    })
}

/// RMS of a non-empty, finite slice
pub fn rms(samples: &[f32]) -> Result<f32> {
    Ok(amplitude(samples)?.rms)
}

/// Population variance of the signed samples
pub fn variance(samples: &[f32]) -> Result<f32> {
    if samples.is_empty() {
        return Err(AnalysisError::empty("variance window has no samples").into());
    }

    let mut sum = 0.0f64;
    let mut sum_squares = 0.0f64;
    for (index, &sample) in samples.iter().enumerate() {
        if !sample.is_finite() {
            return Err(AnalysisError::NonFiniteSample { index }.into());
        }
        sum += sample as f64;
        sum_squares += sample as f64 * sample as f64;
    }

    let n = samples.len() as f64;
    let mean = sum / n;
    Ok((sum_squares / n - mean * mean).max(0.0) as f32)
}

/// Re-base a window-relative sample index onto the enclosing buffer
pub(crate) fn offset_error(err: EngineError, offset: usize) -> EngineError {
    match err {
        EngineError::Analysis(AnalysisError::NonFiniteSample { index }) => {
            AnalysisError::NonFiniteSample {
                index: index + offset,
            }
            .into()
        }
        other => other,
    }
}
