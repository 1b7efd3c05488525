//! # Waveform Insight
//!
//! Summarize and auto-annotate audio for waveform editors.
//!
//! This library turns a decoded mono sample buffer into quantitative descriptors
//! (loudness, spectral shape, temporal patterns) and into labeled time regions matched
//! against user-defined classification profiles.
//!
//! ## Quick Start
//!
//! ```rust
//! use waveform_insight::{
//!     audio::{AnalysisOptions, AudioAnalyzer, SampleBuffer},
//!     profiles::Profile,
//! };
//!
//! # fn main() -> waveform_insight::Result<()> {
//! let buffer = SampleBuffer::new(vec![0.0; 44100], 44100);
//! let options = AnalysisOptions {
//!     profiles: Profile::builtin(),
//!     ..Default::default()
//! };
//!
//! let analysis = AudioAnalyzer::with_options(options).analyze(&buffer)?;
//! for region in &analysis.regions {
//!     println!("{} {:.2}s-{:.2}s ({:.2})", region.profile_id, region.start, region.end, region.confidence);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`audio`] - Amplitude statistics, spectral analysis, pattern detection and orchestration
//! - [`profiles`] - Classification profiles and region matching
//! - [`config`] - Configuration management
//! - [`error`] - Error types shared by every analyzer
//!
//! Every analyzer is a synchronous, side-effect-free function of its inputs, so separate
//! analyses can run on separate threads without coordination.

pub mod audio;
pub mod config;
pub mod error;
pub mod profiles;

// Re-export commonly used types for convenience
pub use crate::{
    audio::{AnalysisOptions, AnalysisRequest, AnalysisResult, AudioAnalyzer, SampleBuffer},
    config::Config,
    error::{AnalysisError, EngineError, Result},
    profiles::{Profile, ProfileRule, Region},
};
