//! # Audio Analysis Module
//!
//! Turns a decoded mono sample buffer into loudness, spectral and temporal descriptors.
//!
//! ## Core Features
//!
//! - **Amplitude Statistics**: RMS, peak, crest factor and zero crossings per window
//! - **Spectral Analysis**: Hann-windowed FFT with centroid, band energy and dominant peaks
//! - **Pattern Detection**: quiet/loud sections and abrupt loudness transitions
//! - **Orchestration**: one call producing a complete [`AnalysisResult`]
//!
//! ## Usage
//!
//! ```rust
//! use waveform_insight::audio::{AudioAnalyzer, SampleBuffer};
//!
//! let samples: Vec<f32> = (0..44100)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin() * 0.5)
//!     .collect();
//! let buffer = SampleBuffer::new(samples, 44100);
//!
//! let analysis = AudioAnalyzer::new().analyze(&buffer).unwrap();
//! println!("RMS: {:.3}", analysis.amplitude.rms);
//! println!("Centroid: {:.1} Hz", analysis.spectral.spectral_centroid_hz);
//! ```

pub mod analyzer;
pub mod patterns;
pub mod spectral;
pub mod stats;
pub mod types;

pub use analyzer::AudioAnalyzer;
pub use patterns::PatternDetector;
pub use spectral::SpectralAnalyzer;
pub use stats::WindowStats;
pub use types::{
    AmplitudeDescriptor, AnalysisOptions, AnalysisRequest, AnalysisResult, PatternSummary,
    RequestOptions, SampleBuffer, SpectralDescriptor, Window,
};
