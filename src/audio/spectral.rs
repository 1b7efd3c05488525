use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

use crate::audio::types::{DominantFrequency, FrequencyBands, SpectralDescriptor};
use crate::error::{AnalysisError, Result};

/// Upper edge of the bass band in Hz
pub const BASS_CUTOFF_HZ: f32 = 250.0;

/// Upper edge of the mid band in Hz
pub const MID_CUTOFF_HZ: f32 = 4000.0;

/// Maximum number of dominant frequencies reported
pub const MAX_DOMINANT_FREQUENCIES: usize = 5;

/// Peaks must exceed this fraction of the strongest bin
const DOMINANT_THRESHOLD_RATIO: f32 = 0.1;

/// FFT-based spectral summary of a single block
///
/// Blocks shorter than `fft_size` are zero-padded; the Hann taper always spans the
/// full `fft_size` frame.
pub struct SpectralAnalyzer {
    fft_size: usize,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input_buffer: Vec<f32>,
    spectrum_buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectralAnalyzer {
    /// Plan an analyzer for `fft_size`-point blocks (power of two, at least 2)
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(AnalysisError::InvalidFftSize { size: fft_size }.into());
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let input_buffer = fft.make_input_vec();
        let spectrum_buffer = fft.make_output_vec();
        let magnitudes = vec![0.0; spectrum_buffer.len()];

        Ok(Self {
            fft_size,
            fft,
            window: hann_window(fft_size),
            input_buffer,
            spectrum_buffer,
            magnitudes,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Width of one FFT bin in Hz
    pub fn bin_width(&self, sample_rate: u32) -> f32 {
        sample_rate as f32 / self.fft_size as f32
    }

    /// Analyze the leading `fft_size` samples of `samples`
    pub fn analyze(&mut self, samples: &[f32], sample_rate: u32) -> Result<SpectralDescriptor> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate { sample_rate }.into());
        }
        if samples.is_empty() {
            return Err(AnalysisError::empty("spectral block has no samples").into());
        }

        let block = &samples[..samples.len().min(self.fft_size)];
        if block.len() < self.fft_size {
            tracing::debug!(
                "Zero-padding spectral block from {} to {} samples",
                block.len(),
                self.fft_size
            );
        }

        self.input_buffer.fill(0.0);
        for (i, &sample) in block.iter().enumerate() {
            if !sample.is_finite() {
                return Err(AnalysisError::NonFiniteSample { index: i }.into());
            }
            self.input_buffer[i] = sample * self.window[i];
        }

        self.fft
            .process(&mut self.input_buffer, &mut self.spectrum_buffer)
            .map_err(|e| AnalysisError::InvalidParameter {
                name: "fft".to_string(),
                value: e.to_string(),
            })?;

        for (magnitude, bin) in self.magnitudes.iter_mut().zip(self.spectrum_buffer.iter()) {
            let (re, im) = (bin.re as f64, bin.im as f64);
            *magnitude = (re * re + im * im).sqrt() as f32;
        }

        let bin_width = self.bin_width(sample_rate);
        let spectral_centroid_hz = self.centroid(bin_width);
        let frequency_bands = self.bands(sample_rate);
        let dominant_frequencies = self.dominant_frequencies(bin_width);

        tracing::debug!(
            "Spectrum: centroid {:.1} Hz, {} dominant peaks",
            spectral_centroid_hz,
            dominant_frequencies.len()
        );

        Ok(SpectralDescriptor {
            spectral_centroid_hz,
            frequency_bands,
            dominant_frequencies,
        })
    }

    fn centroid(&self, bin_width: f32) -> f32 {
        let mut weighted_sum = 0.0f64;
        let mut total_magnitude = 0.0f64;
        for (k, &mag) in self.magnitudes.iter().enumerate() {
            weighted_sum += (k as f32 * bin_width) as f64 * mag as f64;
            total_magnitude += mag as f64;
        }

        if total_magnitude > 0.0 {
            (weighted_sum / total_magnitude) as f32
        } else {
            0.0
        }
    }

    fn bands(&self, sample_rate: u32) -> FrequencyBands {
        let bins = self.magnitudes.len();
        let edge = |freq_hz: f32| -> usize {
            let index = (self.fft_size as f64 * freq_hz as f64 / sample_rate as f64).floor();
            (index as usize).min(bins)
        };
        let bass_edge = edge(BASS_CUTOFF_HZ);
        let mid_edge = edge(MID_CUTOFF_HZ).max(bass_edge);

        // Saturates instead of overflowing to infinity on extreme input
        let energy = |range: &[f32]| -> f32 {
            let sum: f64 = range.iter().map(|&m| m as f64 * m as f64).sum();
            sum.min(f32::MAX as f64) as f32
        };

        FrequencyBands {
            bass: energy(&self.magnitudes[..bass_edge]),
            mid: energy(&self.magnitudes[bass_edge..mid_edge]),
            treble: energy(&self.magnitudes[mid_edge..]),
        }
    }

    fn dominant_frequencies(&self, bin_width: f32) -> Vec<DominantFrequency> {
        // Bins below Nyquist only
        let half = &self.magnitudes[..self.fft_size / 2];
        let max_magnitude = half.iter().fold(0.0f32, |acc, &m| acc.max(m));
        let threshold = max_magnitude * DOMINANT_THRESHOLD_RATIO;

        let mut peaks: Vec<DominantFrequency> = half
            .iter()
            .enumerate()
            .filter(|&(_, &mag)| mag > threshold)
            .map(|(k, &magnitude)| DominantFrequency {
                frequency_hz: k as f32 * bin_width,
                magnitude,
            })
            .collect();

        peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        peaks.truncate(MAX_DOMINANT_FREQUENCIES);
        peaks
    }
}

/// Hann taper `0.5·(1 − cos(2πi/(N−1)))`
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn sine(frequency: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude
            })
            .collect()
    }

    #[test]
    fn test_hann_window_shape() {
        let window = hann_window(1025);
        assert!(window[0].abs() < 1e-6);
        assert!(window[1024].abs() < 1e-6);
        assert!((window[512] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sine_440_centroid_and_peak() {
        let mut analyzer = SpectralAnalyzer::new(2048).unwrap();
        let samples = sine(440.0, 44100, 44100, 0.5);
        let spectrum = analyzer.analyze(&samples, 44100).unwrap();
        let bin_width = analyzer.bin_width(44100);

        assert!((spectrum.spectral_centroid_hz - 440.0).abs() <= bin_width);
        let top = spectrum.dominant_frequencies[0];
        assert!((top.frequency_hz - 440.0).abs() <= bin_width);
    }

    #[test]
    fn test_dominant_frequencies_sorted_and_capped() {
        let mut analyzer = SpectralAnalyzer::new(2048).unwrap();
        let samples: Vec<f32> = (0..2048)
            .map(|i| {
                let t = i as f32 / 44100.0;
                [300.0f32, 1000.0, 2500.0, 5000.0, 8000.0, 12000.0]
                    .iter()
                    .enumerate()
                    .map(|(n, f)| (2.0 * std::f32::consts::PI * f * t).sin() / (n + 1) as f32)
                    .sum::<f32>()
            })
            .collect();

        let spectrum = analyzer.analyze(&samples, 44100).unwrap();
        let peaks = &spectrum.dominant_frequencies;
        assert!(!peaks.is_empty());
        assert!(peaks.len() <= MAX_DOMINANT_FREQUENCIES);
        assert!(peaks.windows(2).all(|pair| pair[0].magnitude >= pair[1].magnitude));
    }

    #[test]
    fn test_band_energy_follows_tone() {
        let mut analyzer = SpectralAnalyzer::new(2048).unwrap();

        let low = analyzer.analyze(&sine(100.0, 44100, 2048, 0.8), 44100).unwrap();
        assert!(low.frequency_bands.bass > low.frequency_bands.mid);
        assert!(low.frequency_bands.bass > low.frequency_bands.treble);

        let high = analyzer.analyze(&sine(8000.0, 44100, 2048, 0.8), 44100).unwrap();
        assert!(high.frequency_bands.treble > high.frequency_bands.mid);
        assert!(high.frequency_bands.treble > high.frequency_bands.bass);
    }

    #[test]
    fn test_silence_has_empty_spectrum() {
        let mut analyzer = SpectralAnalyzer::new(1024).unwrap();
        let spectrum = analyzer.analyze(&[0.0; 1024], 44100).unwrap();
        assert_eq!(spectrum, SpectralDescriptor::default());
    }

    #[test]
    fn test_short_block_is_zero_padded() {
        let mut analyzer = SpectralAnalyzer::new(2048).unwrap();
        let spectrum = analyzer.analyze(&sine(1000.0, 44100, 1500, 0.5), 44100).unwrap();
        assert!(spectrum.spectral_centroid_hz > 0.0);
        assert!(!spectrum.dominant_frequencies.is_empty());
    }

    #[test]
    fn test_extreme_amplitudes_stay_finite() {
        let mut analyzer = SpectralAnalyzer::new(2048).unwrap();
        let spectrum = analyzer.analyze(&sine(440.0, 44100, 2048, 1e30), 44100).unwrap();

        assert!(spectrum.spectral_centroid_hz.is_finite());
        assert!((spectrum.spectral_centroid_hz - 440.0).abs() < analyzer.bin_width(44100));
        assert!(spectrum.frequency_bands.bass.is_finite());
        assert!(spectrum.dominant_frequencies.iter().all(|d| d.magnitude.is_finite()));
    }

    #[test]
    fn test_invalid_fft_size() {
        for size in [0, 1, 1000, 3000] {
            let err = SpectralAnalyzer::new(size).err().unwrap();
            assert_eq!(err.as_analysis(), Some(&AnalysisError::InvalidFftSize { size }));
        }
    }

    #[test]
    fn test_empty_and_non_finite_blocks() {
        let mut analyzer = SpectralAnalyzer::new(256).unwrap();
        let err = analyzer.analyze(&[], 44100).unwrap_err();
        assert!(matches!(err, EngineError::Analysis(AnalysisError::EmptyInput { .. })));

        let err = analyzer.analyze(&[0.0, f32::NEG_INFINITY], 44100).unwrap_err();
        assert_eq!(err.as_analysis(), Some(&AnalysisError::NonFiniteSample { index: 1 }));
    }

    #[test]
    fn test_repeat_analysis_is_identical() {
        let mut analyzer = SpectralAnalyzer::new(512).unwrap();
        let samples = sine(700.0, 22050, 512, 0.3);
        let first = analyzer.analyze(&samples, 22050).unwrap();
        let second = analyzer.analyze(&samples, 22050).unwrap();
        assert_eq!(first, second);
    }
}
