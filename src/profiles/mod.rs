//! # Classification Profiles
//!
//! Profiles are user-defined rules that label windows of audio as regions of interest.
//! Each profile carries one [`ProfileRule`] variant with its own typed parameters, and the
//! [`ProfileMatcher`] turns matching windows into confidence-scored [`Region`]s.
//!
//! Regions from different profiles are independent verdicts; overlapping regions are
//! reported as-is and never merged.
//!
//! ```rust
//! use waveform_insight::audio::SampleBuffer;
//! use waveform_insight::profiles::{Profile, ProfileMatcher};
//!
//! let buffer = SampleBuffer::new(vec![0.0; 44100], 44100);
//! let matcher = ProfileMatcher::default();
//!
//! for profile in Profile::builtin() {
//!     let regions = matcher.match_profile(&buffer, &profile).unwrap();
//!     println!("{}: {} regions", profile.name, regions.len());
//! }
//! ```

pub mod matcher;
pub mod types;

pub use matcher::ProfileMatcher;
pub use types::{Profile, ProfileRule, Region};
