use chrono::Utc;
use rayon::prelude::*;
use uuid::Uuid;

use crate::audio::patterns::PatternDetector;
use crate::audio::spectral::SpectralAnalyzer;
use crate::audio::stats::WindowStats;
use crate::audio::types::{AnalysisOptions, AnalysisRequest, AnalysisResult, SampleBuffer, Window};
use crate::error::{AnalysisError, Result};
use crate::profiles::{ProfileMatcher, Region};

/// Runs every analysis over one buffer and assembles a single [`AnalysisResult`]
///
/// The analyzer holds only options; each call is a pure function of the buffer and
/// options apart from the result's `id` and `timestamp`.
pub struct AudioAnalyzer {
    options: AnalysisOptions,
}

impl AudioAnalyzer {
    /// Create a new analyzer with default options and no profiles
    pub fn new() -> Self {
        Self::with_options(AnalysisOptions::default())
    }

    /// Create a new analyzer with custom options
    pub fn with_options(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Perform the complete analysis
    ///
    /// Fails with the first sub-analysis error; no partial result is returned.
    pub fn analyze(&self, buffer: &SampleBuffer) -> Result<AnalysisResult> {
        buffer.validate_sample_rate()?;
        if buffer.is_empty() {
            return Err(AnalysisError::empty("analysis buffer has no samples").into());
        }

        tracing::info!(
            "Analyzing {} samples ({:.2}s at {} Hz) against {} profiles",
            buffer.len(),
            buffer.duration_secs(),
            buffer.sample_rate,
            self.options.profiles.len()
        );

        // Step 1: Whole-buffer amplitude statistics
        let amplitude = WindowStats::analyze(buffer, Window::whole(buffer)?)?;

        // Step 2: Spectrum of the leading block
        tracing::debug!("Spectral analysis over leading {} samples", self.options.fft_size);
        let mut spectral_analyzer = SpectralAnalyzer::new(self.options.fft_size)?;
        let spectral = spectral_analyzer.analyze(&buffer.samples, buffer.sample_rate)?;

        // Step 3: Temporal patterns
        let detector = PatternDetector::new(self.options.threshold, self.options.min_duration_sec);
        let patterns = detector.detect(buffer)?;

        // Step 4: Profiles, matched independently and concatenated in order
        let regions = self.match_profiles(buffer)?;

        let result = AnalysisResult {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            sample_count: buffer.len(),
            sample_rate: buffer.sample_rate,
            duration_secs: buffer.duration_secs(),
            amplitude,
            spectral,
            patterns,
            regions,
        };

        tracing::info!(
            "Analysis {} complete: rms {:.3}, peak {:.3}, centroid {:.1} Hz, {} regions",
            result.id,
            result.amplitude.rms,
            result.amplitude.peak,
            result.spectral.spectral_centroid_hz,
            result.regions.len()
        );

        Ok(result)
    }

    /// Analyze a wire request, filling unset options from this analyzer's options
    pub fn analyze_request(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        let (buffer, options) = request.into_parts(&self.options);
        AudioAnalyzer::with_options(options).analyze(&buffer)
    }

    fn match_profiles(&self, buffer: &SampleBuffer) -> Result<Vec<Region>> {
        let matcher = ProfileMatcher::new(self.options.window_size_sec);

        let per_profile: Vec<Vec<Region>> = self
            .options
            .profiles
            .par_iter()
            .map(|profile| matcher.match_profile(buffer, profile))
            .collect::<Result<_>>()?;

        Ok(per_profile.into_iter().flatten().collect())
    }
}

impl Default for AudioAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::types::RequestOptions;
    use crate::error::{EngineError, ProfileError};
    use crate::profiles::{Profile, ProfileRule};

    fn create_test_buffer() -> SampleBuffer {
        // 1 s of 440 Hz at 0.5, then 1 s of near-silence
        let sample_rate = 44100;
        let samples: Vec<f32> = (0..sample_rate * 2)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                let amplitude = if i < sample_rate { 0.5 } else { 0.001 };
                (2.0 * std::f32::consts::PI * 440.0 * t).sin() * amplitude
            })
            .collect();
        SampleBuffer::new(samples, sample_rate as u32)
    }

    fn options_with_profiles(profiles: Vec<Profile>) -> AnalysisOptions {
        AnalysisOptions {
            profiles,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_analysis() {
        let buffer = create_test_buffer();
        let analyzer = AudioAnalyzer::with_options(options_with_profiles(Profile::builtin()));
        let result = analyzer.analyze(&buffer).unwrap();

        assert_eq!(result.sample_count, 88200);
        assert_eq!(result.duration_secs, 2.0);
        assert!(result.amplitude.rms > 0.0 && result.amplitude.rms <= result.amplitude.peak);
        assert!((result.spectral.spectral_centroid_hz - 440.0).abs() < 44100.0 / 2048.0);
        assert_eq!(result.patterns.quiet_sections.len(), 10);
        assert!(result
            .patterns
            .transitions
            .iter()
            .any(|t| (t.time - 1.0).abs() < 1e-9));

        // Only the second second is quiet
        let quiet: Vec<_> = result.regions_for_profile("quiet-section").collect();
        assert_eq!(quiet.len(), 1);
        assert_eq!(quiet[0].start, 1.0);

        for region in &result.regions {
            assert!(region.start < region.end);
            assert!((0.0..=1.0).contains(&region.confidence));
        }
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let buffer = create_test_buffer();
        let analyzer = AudioAnalyzer::with_options(options_with_profiles(Profile::builtin()));

        let first = analyzer.analyze(&buffer).unwrap();
        let second = analyzer.analyze(&buffer).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.amplitude, second.amplitude);
        assert_eq!(first.spectral, second.spectral);
        assert_eq!(first.patterns, second.patterns);
        assert_eq!(first.regions, second.regions);
    }

    #[test]
    fn test_overlapping_profiles_are_not_merged() {
        let buffer = SampleBuffer::new(vec![0.0; 2000], 1000);
        let profiles = vec![
            Profile::new(
                "strict",
                "Strict",
                ProfileRule::Quiet {
                    max_amplitude: 0.01,
                    min_duration_sec: 1.0,
                },
            ),
            Profile::new(
                "lenient",
                "Lenient",
                ProfileRule::Quiet {
                    max_amplitude: 0.5,
                    min_duration_sec: 2.0,
                },
            ),
        ];
        let result = AudioAnalyzer::with_options(options_with_profiles(profiles))
            .analyze(&buffer)
            .unwrap();

        // Both quiet profiles match each 1 s default window
        assert_eq!(result.regions.len(), 4);
        assert_eq!(result.regions[0].profile_id, "strict");
        assert_eq!(result.regions[2].profile_id, "lenient");
        assert!(result.regions[0].overlaps(&result.regions[2]));
        assert_eq!(result.regions_in_range(0.5, 0.6).len(), 2);
    }

    #[test]
    fn test_sub_analysis_errors_propagate_unchanged() {
        let mut buffer = create_test_buffer();
        buffer.samples[60000] = f32::NAN;
        let err = AudioAnalyzer::new().analyze(&buffer).unwrap_err();
        assert_eq!(err.as_analysis(), Some(&AnalysisError::NonFiniteSample { index: 60000 }));

        let options = AnalysisOptions {
            fft_size: 1000,
            ..Default::default()
        };
        let err = AudioAnalyzer::with_options(options)
            .analyze(&create_test_buffer())
            .unwrap_err();
        assert_eq!(err.as_analysis(), Some(&AnalysisError::InvalidFftSize { size: 1000 }));

        let bad_profile = Profile::new(
            "bad",
            "Bad",
            ProfileRule::Intensity {
                min_amplitude: 0.0,
                threshold: None,
            },
        );
        let err = AudioAnalyzer::with_options(options_with_profiles(vec![bad_profile]))
            .analyze(&create_test_buffer())
            .unwrap_err();
        assert!(matches!(err, EngineError::Profile(ProfileError::InvalidParameters { .. })));
    }

    #[test]
    fn test_empty_buffer_and_zero_sample_rate() {
        let err = AudioAnalyzer::new().analyze(&SampleBuffer::new(vec![], 44100)).unwrap_err();
        assert!(matches!(err, EngineError::Analysis(AnalysisError::EmptyInput { .. })));

        let err = AudioAnalyzer::new().analyze(&SampleBuffer::new(vec![0.1], 0)).unwrap_err();
        assert_eq!(err.as_analysis(), Some(&AnalysisError::InvalidSampleRate { sample_rate: 0 }));
    }

    #[test]
    fn test_short_buffer_is_zero_padded() {
        let buffer = SampleBuffer::new(vec![0.25; 1000], 44100);
        let result = AudioAnalyzer::new().analyze(&buffer).unwrap();
        assert_eq!(result.sample_count, 1000);
        assert!(result.spectral.frequency_bands.bass > 0.0);
    }

    #[test]
    fn test_analyze_request_resolves_options() {
        let request = AnalysisRequest {
            samples: vec![0.0; 8000],
            options: RequestOptions {
                sample_rate: Some(8000),
                fft_size: Some(256),
                profiles: Some(Profile::builtin()),
                ..Default::default()
            },
        };
        let result = AudioAnalyzer::new().analyze_request(request).unwrap();

        assert_eq!(result.sample_rate, 8000);
        assert_eq!(result.duration_secs, 1.0);
        // 1 s quiet-section window, two 0.5 s transition windows with zero variance
        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].profile_id, "quiet-section");
    }

    #[test]
    fn test_result_serializes_to_camel_case_json() {
        let buffer = SampleBuffer::new(vec![0.0; 4410], 44100);
        let result = AudioAnalyzer::new().analyze(&buffer).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert!(json["id"].is_string());
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
        assert_eq!(json["sampleCount"], 4410);
        assert!(json["spectral"]["spectralCentroidHz"].is_number());
        assert!(json["patterns"]["quietSections"].is_array());
    }
}
