use serde::{Deserialize, Serialize};

/// Toggles for the classification stages of candidate validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Ask the classification capability about names and foreign email domains.
    pub ai_classification: bool,
    /// Reject obvious non-names locally before any classification call.
    pub name_prefilter: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ai_classification: true,
            name_prefilter: true,
        }
    }
}
