use serde::{Deserialize, Serialize};

/// Knobs for a single signing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignOptions {
    /// Stroke a red outline around the requested target box on each drawn page.
    pub debug_outline: bool,
    /// Compress uncompressed streams before serializing.
    pub compress: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            debug_outline: false,
            compress: true,
        }
    }
}

impl SignOptions {
    pub fn with_debug_outline(mut self, enabled: bool) -> Self {
        self.debug_outline = enabled;
        self
    }
}
