//! Tonal profile templates
//!
//! A profile is one 12-bin major template and one 12-bin minor template,
//! both with the tonic at index 0 (C). Templates for other tonics are
//! obtained by circular rotation.
//!
//! # References
//!
//! - Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//!   Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*, 89(4).
//! - Temperley, D. (1999). What's Key for Key? The Krumhansl-Schmuckler Key-Finding
//!   Algorithm Reconsidered. *Music Perception*, 17(1).
//! - Aarden, B. (2003). *Dynamic Melodic Expectancy*. PhD thesis, Ohio State University.
//! - Albrecht, J., & Shanahan, D. (2013). The Use of Large Corpora to Train a New Type of
//!   Key-Finding Algorithm. *Music Perception*, 31(1).

use crate::error::AnalysisError;
use crate::features::chroma::PitchClassVector;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Built-in template sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateSet {
    /// Sapp's "simple" profile: tonic and dominant weighted 2, other scale tones 1
    Simple,
    /// Albrecht & Shanahan corpus-derived profile
    Albrecht,
    /// Krumhansl-Kessler probe-tone ratings
    KrumhanslKessler,
    /// Temperley (Kostka-Payne corpus)
    Temperley,
    /// Aarden-Essen folk song corpus
    Aarden,
}

impl TemplateSet {
    /// All built-in template sets, in registration order
    pub const ALL: [TemplateSet; 5] = [
        TemplateSet::Simple,
        TemplateSet::Albrecht,
        TemplateSet::KrumhanslKessler,
        TemplateSet::Temperley,
        TemplateSet::Aarden,
    ];

    /// Profile name under which this set is registered
    pub fn name(&self) -> &'static str {
        match self {
            TemplateSet::Simple => "simple",
            TemplateSet::Albrecht => "albrecht",
            TemplateSet::KrumhanslKessler => "krumhansl",
            TemplateSet::Temperley => "temperley",
            TemplateSet::Aarden => "aarden",
        }
    }

    /// Major template with tonic C
    pub fn major(&self) -> PitchClassVector {
        PitchClassVector::new(match self {
            TemplateSet::Simple => [2.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 1.0],
            TemplateSet::Albrecht => [
                0.238, 0.006, 0.111, 0.006, 0.137, 0.094, 0.016, 0.214, 0.009, 0.080, 0.008, 0.081,
            ],
            TemplateSet::KrumhanslKessler => [
                6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
            ],
            TemplateSet::Temperley => [
                0.748, 0.060, 0.488, 0.082, 0.670, 0.460, 0.096, 0.715, 0.104, 0.366, 0.057, 0.400,
            ],
            TemplateSet::Aarden => [
                17.7661, 0.145624, 14.9265, 0.160186, 19.8049, 11.3587, 0.291248, 22.062,
                0.145624, 8.15494, 0.232998, 4.95122,
            ],
        })
    }

    /// Minor template with tonic C
    pub fn minor(&self) -> PitchClassVector {
        PitchClassVector::new(match self {
            TemplateSet::Simple => [2.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 2.0, 1.0, 0.0, 0.5, 0.5],
            TemplateSet::Albrecht => [
                0.220, 0.006, 0.104, 0.123, 0.019, 0.103, 0.012, 0.214, 0.062, 0.022, 0.061, 0.052,
            ],
            TemplateSet::KrumhanslKessler => [
                6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
            ],
            TemplateSet::Temperley => [
                0.712, 0.084, 0.474, 0.618, 0.049, 0.460, 0.105, 0.747, 0.404, 0.067, 0.133, 0.330,
            ],
            TemplateSet::Aarden => [
                18.2648, 0.737619, 14.0499, 16.8599, 0.702494, 14.4362, 0.702494, 18.6161,
                4.56621, 1.93186, 7.37619, 1.75623,
            ],
        })
    }
}

/// Major and minor templates of one named profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTemplates {
    /// Profile name
    pub name: String,

    /// Major template (tonic C)
    pub major: PitchClassVector,

    /// Minor template (tonic C)
    pub minor: PitchClassVector,
}

impl ProfileTemplates {
    /// Major template for a tonic (0 = C, 1 = C#, ..., 11 = B)
    pub fn major_for(&self, tonic: u32) -> PitchClassVector {
        self.major.rotate(tonic as i32)
    }

    /// Minor template for a tonic (0 = C, 1 = C#, ..., 11 = B)
    pub fn minor_for(&self, tonic: u32) -> PitchClassVector {
        self.minor.rotate(tonic as i32)
    }
}

impl From<TemplateSet> for ProfileTemplates {
    fn from(set: TemplateSet) -> Self {
        Self {
            name: set.name().to_string(),
            major: set.major(),
            minor: set.minor(),
        }
    }
}

static BUILTIN_BANK: Lazy<TemplateBank> = Lazy::new(TemplateBank::with_builtin_profiles);

/// Registry of named profiles
///
/// Built once, then shared read-only. Extensions are added by value with
/// [`TemplateBank::with_profile`] before the bank is handed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateBank {
    profiles: BTreeMap<String, ProfileTemplates>,
}

impl TemplateBank {
    /// Empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank holding every built-in [`TemplateSet`]
    pub fn with_builtin_profiles() -> Self {
        let profiles = TemplateSet::ALL
            .iter()
            .map(|set| (set.name().to_string(), ProfileTemplates::from(*set)))
            .collect();
        Self { profiles }
    }

    /// Process-wide built-in bank
    pub fn builtin() -> &'static TemplateBank {
        &BUILTIN_BANK
    }

    /// Register an additional profile
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if either template is not 12 elements long, and
    /// `DegenerateInput` if a template has no variance (it could never be correlated).
    pub fn with_profile(
        mut self,
        name: &str,
        major: &[f32],
        minor: &[f32],
    ) -> Result<Self, AnalysisError> {
        let major = PitchClassVector::from_slice(major)?;
        let minor = PitchClassVector::from_slice(minor)?;

        for (mode, template) in [("major", &major), ("minor", &minor)] {
            let first = template[0];
            if template.values().iter().all(|&v| v == first) {
                return Err(AnalysisError::DegenerateInput(format!(
                    "Profile '{}' has a constant {} template",
                    name, mode
                )));
            }
        }

        log::debug!("Registering profile '{}'", name);
        self.profiles.insert(
            name.to_string(),
            ProfileTemplates {
                name: name.to_string(),
                major,
                minor,
            },
        );
        Ok(self)
    }

    /// Look up a profile by name
    ///
    /// # Errors
    ///
    /// Returns `UnknownProfile` if `name` is not registered.
    pub fn get_profile(&self, name: &str) -> Result<&ProfileTemplates, AnalysisError> {
        self.profiles.get(name).ok_or_else(|| {
            AnalysisError::UnknownProfile(format!(
                "'{}' (available: {})",
                name,
                self.profile_names().join(", ")
            ))
        })
    }

    /// Registered profile names, sorted
    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Number of registered profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True if no profile is registered
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
