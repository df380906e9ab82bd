//! Configuration for the retargeting engine.

/// Controls which rewrites are applied and how results are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetargetConfig {
    /// Replace native-interop stubs with synthesized accessor and dummy bodies (default: true).
    pub strip_internal: bool,

    /// Remove the target-framework attribute from the module (default: true).
    pub strip_target: bool,

    /// Run every rewrite but skip serialization (default: false).
    pub dry_run: bool,

    /// Replace existing output files (default: false).
    pub overwrite: bool,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            strip_internal: true,
            strip_target: true,
            dry_run: false,
            overwrite: false,
        }
    }
}

impl RetargetConfig {
    /// Builder-style toggle for [`Self::strip_internal`]
    #[must_use]
    pub fn with_strip_internal(mut self, enabled: bool) -> Self {
        self.strip_internal = enabled;
        self
    }

    /// Builder-style toggle for [`Self::strip_target`]
    #[must_use]
    pub fn with_strip_target(mut self, enabled: bool) -> Self {
        self.strip_target = enabled;
        self
    }

    /// Builder-style toggle for [`Self::dry_run`]
    #[must_use]
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builder-style toggle for [`Self::overwrite`]
    #[must_use]
    pub fn with_overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }
}
