use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::nations::NationRegistry;

const DEFAULT_REVEAL_MS: u64 = 350;
const DEFAULT_PRESET: &str = "wc2026";

/// Runtime knobs read from the environment (after `.env` files are loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub reveal_delay: Duration,
    pub export_dir: PathBuf,
    pub nations_file: Option<PathBuf>,
    pub preset_id: String,
    pub force_home_away: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_MS),
            export_dir: PathBuf::from("."),
            nations_file: None,
            preset_id: DEFAULT_PRESET.to_string(),
            force_home_away: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let reveal_ms = env::var("DRAW_REVEAL_MS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REVEAL_MS)
            .min(5_000);
        Self {
            reveal_delay: Duration::from_millis(reveal_ms),
            export_dir: non_empty_env("DRAW_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            nations_file: non_empty_env("NATIONS_FILE").map(PathBuf::from),
            preset_id: non_empty_env("DRAW_PRESET").unwrap_or(defaults.preset_id),
            force_home_away: env::var("SCHEDULE_HOME_AWAY")
                .map(|val| parse_flag(&val))
                .unwrap_or(false),
        }
    }

    /// The override file when configured, otherwise the built-in registry.
    pub fn load_registry(&self) -> Result<NationRegistry> {
        match self.nations_file.as_deref() {
            Some(path) => NationRegistry::load(path),
            None => NationRegistry::builtin().cloned(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_truthy_values() {
        for raw in ["1", "true", "YES", " on "] {
            assert!(parse_flag(raw), "{raw}");
        }
        for raw in ["0", "false", "", "maybe"] {
            assert!(!parse_flag(raw), "{raw}");
        }
    }

    #[test]
    fn defaults_use_builtin_registry() {
        let settings = Settings::default();
        assert_eq!(settings.reveal_delay, Duration::from_millis(350));
        let registry = settings.load_registry().expect("registry");
        assert!(registry.get("Mexico").is_some());
    }
}
