use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "coiguard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "coiguard_lib=info,warn"
}

/// Get the application data directory (~/.coiguard/).
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".coiguard")
}

/// Default directory for rendered certificates and stored analyses.
pub fn renders_dir() -> PathBuf {
    app_data_dir().join("renders")
}

/// Window sizes for the extraction and scanning passes.
///
/// Every scan over document text is bounded by one of these, so a huge or
/// malformed document costs linear time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Characters after a coverage label that belong to its block.
    pub block_window_chars: usize,
    /// Lines a free-text block may span.
    pub block_max_lines: usize,
    /// Characters inspected before an endorsement phrase for negation.
    pub negation_lookback_chars: usize,
    /// Lines of context kept before an exclusion match.
    pub context_lines_before: usize,
    /// Lines of context kept after an exclusion match.
    pub context_lines_after: usize,
    /// Cap on raw text carried by the raw-text fallback strategy.
    pub raw_text_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_window_chars: 500,
            block_max_lines: 10,
            negation_lookback_chars: 50,
            context_lines_before: 2,
            context_lines_after: 3,
            raw_text_limit: 20_000,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `COIGUARD_*` environment variables.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        override_from_env("COIGUARD_BLOCK_WINDOW", &mut config.block_window_chars);
        override_from_env("COIGUARD_BLOCK_MAX_LINES", &mut config.block_max_lines);
        override_from_env("COIGUARD_NEGATION_LOOKBACK", &mut config.negation_lookback_chars);
        override_from_env("COIGUARD_RAW_TEXT_LIMIT", &mut config.raw_text_limit);
        config
    }
}

fn override_from_env(var: &str, slot: &mut usize) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => *slot = value,
        _ => tracing::warn!(var, value = %raw, "Ignoring invalid engine config override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_dir_under_app_data() {
        let renders = renders_dir();
        let app = app_data_dir();
        assert!(renders.starts_with(app));
        assert!(renders.ends_with("renders"));
    }

    #[test]
    fn app_name_is_coiguard() {
        assert_eq!(APP_NAME, "coiguard");
    }

    #[test]
    fn defaults_match_documented_windows() {
        let c = EngineConfig::default();
        assert_eq!(c.block_window_chars, 500);
        assert_eq!(c.block_max_lines, 10);
        assert_eq!(c.negation_lookback_chars, 50);
        assert_eq!((c.context_lines_before, c.context_lines_after), (2, 3));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{"block_window_chars": 800}"#).unwrap();
        assert_eq!(c.block_window_chars, 800);
        assert_eq!(c.block_max_lines, 10);
    }

    #[test]
    fn env_override_applies() {
        std::env::set_var("COIGUARD_BLOCK_MAX_LINES", "12");
        let c = EngineConfig::from_env();
        std::env::remove_var("COIGUARD_BLOCK_MAX_LINES");
        assert_eq!(c.block_max_lines, 12);
    }
}
