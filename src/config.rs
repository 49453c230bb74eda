use serde::{Deserialize, Serialize};

/// Per-instance sanitizer configuration.
///
/// Deserializable with every field optional, so it can live in an
/// application's own configuration file:
///
/// ```
/// use input_sanitizer::SanitizerConfig;
///
/// let config: SanitizerConfig = serde_json::from_str(r#"{ "freeze_output": false }"#).unwrap();
/// assert!(!config.freeze_output);
///
/// let config: SanitizerConfig = serde_json::from_str("{}").unwrap();
/// assert!(config.freeze_output);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Freeze the cleaned output at the end of the pass.
    pub freeze_output: bool,
}

impl SanitizerConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `freeze_output`.
    pub fn freeze_output(mut self, freeze: bool) -> Self {
        self.freeze_output = freeze;
        self
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            freeze_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezes_by_default() {
        assert!(SanitizerConfig::default().freeze_output);
        assert!(SanitizerConfig::new().freeze_output);
    }

    #[test]
    fn builder_disables_freezing() {
        let config = SanitizerConfig::new().freeze_output(false);
        assert!(!config.freeze_output);
    }

    #[test]
    fn round_trips_through_json() {
        let config = SanitizerConfig::new().freeze_output(false);
        let json = serde_json::to_string(&config).unwrap();

        assert_eq!(json, r#"{"freeze_output":false}"#);
    }
}
