use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::profiles::{Profile, Region};

/// Default sample rate assumed when a request does not carry one
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// A decoded single-channel sample sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleBuffer {
    /// Mono samples, nominally in -1.0..=1.0
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Build a mono buffer from interleaved multi-channel samples by averaging each frame
    pub fn from_interleaved(samples: &[f32], sample_rate: u32, channels: u16) -> Self {
        if channels <= 1 {
            return Self::new(samples.to_vec(), sample_rate);
        }

        let mut mono = Vec::with_capacity(samples.len() / channels as usize);

        for frame in samples.chunks(channels as usize) {
            let sum: f32 = frame.iter().sum();
            mono.push(sum / frame.len() as f32);
        }

        Self::new(mono, sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Get time in seconds for a sample index
    pub fn time_for_sample(&self, sample_index: usize) -> f64 {
        sample_index as f64 / self.sample_rate as f64
    }

    /// Borrow the samples covered by a window
    pub fn slice(&self, window: Window) -> Result<&[f32]> {
        window.check_bounds(self.samples.len())?;
        Ok(&self.samples[window.offset..window.end()])
    }

    pub(crate) fn validate_sample_rate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            }
            .into());
        }
        Ok(())
    }
}

/// A contiguous `(offset, length)` view into a [`SampleBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub offset: usize,
    pub length: usize,
}

impl Window {
    /// Create a window, checking it is non-empty and fits inside `buffer_len` samples
    pub fn new(offset: usize, length: usize, buffer_len: usize) -> Result<Self> {
        let window = Self { offset, length };
        window.check_bounds(buffer_len)?;
        Ok(window)
    }

    /// Window covering a whole buffer
    pub fn whole(buffer: &SampleBuffer) -> Result<Self> {
        Self::new(0, buffer.len(), buffer.len())
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    fn check_bounds(&self, buffer_len: usize) -> Result<()> {
        if self.length == 0 {
            return Err(AnalysisError::empty("window length is zero").into());
        }
        match self.offset.checked_add(self.length) {
            Some(end) if end <= buffer_len => Ok(()),
            _ => Err(AnalysisError::WindowOutOfBounds {
                offset: self.offset,
                length: self.length,
                buffer_len,
            }
            .into()),
        }
    }
}

/// Amplitude statistics of a single window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmplitudeDescriptor {
    /// Root-mean-square amplitude
    pub rms: f32,

    /// Largest absolute sample
    pub peak: f32,

    /// Mean absolute sample
    pub average: f32,

    /// `20·log10(peak/rms)`, 0 for silence
    pub dynamic_range_db: f32,

    /// `peak/rms`, 0 for silence
    pub crest_factor: f32,

    /// Number of sign changes between consecutive samples
    pub zero_crossings: usize,
}

/// Energy per frequency band (sum of squared bin magnitudes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyBands {
    /// Below 250 Hz
    pub bass: f32,

    /// 250 Hz – 4 kHz
    pub mid: f32,

    /// 4 kHz up to Nyquist
    pub treble: f32,
}

/// A prominent spectral peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominantFrequency {
    pub frequency_hz: f32,
    pub magnitude: f32,
}

/// Frequency-content summary of one FFT block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralDescriptor {
    /// Magnitude-weighted mean frequency (brightness)
    pub spectral_centroid_hz: f32,

    pub frequency_bands: FrequencyBands,

    /// Up to five peaks, loudest first
    pub dominant_frequencies: Vec<DominantFrequency>,
}

/// A window classified as quiet or loud
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    pub rms: f32,
}

/// Direction of an abrupt loudness change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionDirection {
    Increasing,
    Decreasing,
}

/// Abrupt change in RMS between two adjacent 100 ms spans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Boundary time in seconds
    pub time: f64,

    pub direction: TransitionDirection,

    pub before_rms: f32,

    pub after_rms: f32,
}

impl Transition {
    /// Absolute RMS change across the boundary
    pub fn magnitude(&self) -> f32 {
        (self.after_rms - self.before_rms).abs()
    }
}

/// Temporal patterns found across a whole buffer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    pub quiet_sections: Vec<Section>,
    pub loud_sections: Vec<Section>,
    pub transitions: Vec<Transition>,
}

/// Resolved options for one orchestration call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Sample rate assumed for requests that omit one (Hz)
    pub sample_rate: u32,

    /// FFT block size for spectral analysis
    pub fft_size: usize,

    /// RMS threshold for quiet sections and transitions
    pub threshold: f32,

    /// Pattern window length in seconds
    pub min_duration_sec: f64,

    /// Matching window in seconds for profiles that do not carry their own
    pub window_size_sec: f64,

    /// Profiles to match against the buffer
    pub profiles: Vec<Profile>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            fft_size: 2048,
            threshold: 0.1,
            min_duration_sec: 0.1,
            window_size_sec: 1.0,
            profiles: Vec::new(),
        }
    }
}

/// Wire form of the analysis options; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub sample_rate: Option<u32>,
    pub window_size: Option<f64>,
    pub fft_size: Option<usize>,
    pub threshold: Option<f32>,
    pub min_duration_sec: Option<f64>,
    pub profiles: Option<Vec<Profile>>,
}

impl RequestOptions {
    /// Fill unset fields from `defaults`
    pub fn resolve(self, defaults: &AnalysisOptions) -> AnalysisOptions {
        AnalysisOptions {
            sample_rate: self.sample_rate.unwrap_or(defaults.sample_rate),
            fft_size: self.fft_size.unwrap_or(defaults.fft_size),
            threshold: self.threshold.unwrap_or(defaults.threshold),
            min_duration_sec: self.min_duration_sec.unwrap_or(defaults.min_duration_sec),
            window_size_sec: self.window_size.unwrap_or(defaults.window_size_sec),
            profiles: self.profiles.unwrap_or_else(|| defaults.profiles.clone()),
        }
    }
}

/// Analysis request as exchanged with the HTTP layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub samples: Vec<f32>,

    #[serde(default)]
    pub options: RequestOptions,
}

impl AnalysisRequest {
    /// Split into a buffer and fully resolved options
    pub fn into_parts(self, defaults: &AnalysisOptions) -> (SampleBuffer, AnalysisOptions) {
        let options = self.options.resolve(defaults);
        let buffer = SampleBuffer::new(self.samples, options.sample_rate);
        (buffer, options)
    }
}

/// Complete result of one analysis call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Fresh identifier per call
    pub id: String,

    /// When the analysis finished (ISO-8601 when serialized)
    pub timestamp: DateTime<Utc>,

    pub sample_count: usize,

    pub sample_rate: u32,

    pub duration_secs: f64,

    /// Amplitude statistics over the whole buffer
    pub amplitude: AmplitudeDescriptor,

    /// Spectrum of the leading FFT block
    pub spectral: SpectralDescriptor,

    pub patterns: PatternSummary,

    /// Regions from every profile, in profile order, never merged
    pub regions: Vec<Region>,
}

impl AnalysisResult {
    /// Regions emitted by one profile
    pub fn regions_for_profile<'a>(&'a self, profile_id: &'a str) -> impl Iterator<Item = &'a Region> + 'a {
        self.regions.iter().filter(move |r| r.profile_id == profile_id)
    }

    /// Regions overlapping a time range
    pub fn regions_in_range(&self, start: f64, end: f64) -> Vec<&Region> {
        self.regions
            .iter()
            .filter(|region| region.start < end && region.end > start)
            .collect()
    }
}
