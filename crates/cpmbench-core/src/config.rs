use crate::EngineKind;

/// What one run of the harness is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HarnessConfig {
    /// Engine executing the program.
    pub engine: EngineKind,
    /// Stack a [`crate::StateCounter`] instead of a passthrough.
    pub count_state: bool,
    /// Stack a [`crate::MemoryCounter`] instead of a passthrough.
    pub count_memory: bool,
}

impl HarnessConfig {
    /// Default engine with every statistics layer enabled.
    #[must_use]
    pub fn with_all_stats() -> Self {
        Self {
            count_state: true,
            count_memory: true,
            ..Self::default()
        }
    }
}
