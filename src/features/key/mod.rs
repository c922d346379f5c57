//! Key template matching
//!
//! Correlate a fragment's pitch-class distribution against major and minor
//! templates at all 12 tonics:
//! - Named template profiles (simple, albrecht, krumhansl, temperley, aarden)
//! - Pearson correlation under circular rotation
//! - Tonal fragment estimation (best major, best minor, `tondeltamax`)

pub mod correlation;
pub mod detector;
pub mod templates;

pub use correlation::{pearson, rotation_correlations};
pub use detector::{estimate, estimate_vector, estimate_with_templates};
pub use templates::{ProfileTemplates, TemplateBank, TemplateSet};
