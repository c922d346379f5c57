//! # Relative Mode
//!
//! Tonal affinity estimation for audio: how major-like or minor-like a piece
//! of music sounds, and how that changes over time.
//!
//! ## Features
//!
//! - **Chroma Extraction**: STFT, constant-Q and CENS pitch-class features
//! - **Template Matching**: Pearson correlation against 24 rotated key templates
//!   from several published profiles (Sapp, Albrecht & Shanahan, Krumhansl-Kessler, ...)
//! - **Relative Mode**: `tondeltamax`, the best major fit minus the best minor fit,
//!   under two chroma configurations of the same audio
//! - **Across Time**: windowed `tondeltamax` plus a distance between consecutive windows
//!
//! ## Quick Start
//!
//! ```no_run
//! use relative_mode::{relative_mode, rme_across_time, RmeConfig};
//!
//! // Load audio samples (mono, f32)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 22050;
//!
//! let (cqt, stft) = relative_mode(&samples, sample_rate, "simple")?;
//! println!("tondeltamax: {:.3} (CQT), {:.3} (STFT)", cqt.tondeltamax, stft.tondeltamax);
//!
//! let series = rme_across_time(&samples, sample_rate, &RmeConfig::default())?;
//! for point in &series.points {
//!     println!("{:6.1}s  {:+.3}  {:?}", point.start_time, point.tondeltamax, point.distance);
//! }
//! # Ok::<(), relative_mode::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio Input → Preprocessing → Chroma Extraction → Template Matching → Windowing → Output
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::across_time::{rme_across_time, rme_across_time_file, rme_across_time_with};
pub use analysis::distance::DistanceMetric;
pub use analysis::relative_mode::{relative_mode, relative_mode_with};
pub use analysis::result::{Key, RelativeModeResult, TimeSeries, TimeSeriesPoint, TonalFragment};
pub use config::{ChromaConfig, FragmentConfig, RelativeModeConfig, RmeConfig};
pub use error::AnalysisError;
pub use features::chroma::{ChromaExtractor, ChromaType, Chromagram, PitchClassVector};
pub use features::key::{estimate, TemplateBank};
pub use io::decoder::decode_audio;
