// Runtime settings, merged from defaults, environment variables and flags.

use std::path::PathBuf;

use poketeam_core::core_api::TYRADEX_API_BASE;

use crate::GlobalArgs;

/// Origin used in share links when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base path of the Tyradex API.
    pub api_base: String,
    /// Offline catalog dump; takes over from the HTTP client when set.
    pub catalog_file: Option<PathBuf>,
    /// Roster file. `None` means the platform data directory.
    pub store_path: Option<PathBuf>,
    /// Origin prefixed to share links.
    pub origin: String,
}

impl Config {
    /// Load configuration from environment variables and CLI flags.
    ///
    /// Environment variables:
    /// - `POKETEAM_API_BASE` - upstream base path (default: the public Tyradex API)
    /// - `POKETEAM_CATALOG_FILE` - JSON dump to read instead of the API
    /// - `POKETEAM_STORE` - roster file path
    /// - `POKETEAM_ORIGIN` - origin of share links (default: `http://localhost:3000`)
    ///
    /// The matching `--api-base`, `--catalog-file`, `--store` and `--origin`
    /// flags take precedence.
    pub fn load(flags: &GlobalArgs) -> Self {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    fn resolve(flags: &GlobalArgs, env: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let api_base = flags
            .api_base
            .clone()
            .or_else(|| lookup("POKETEAM_API_BASE"))
            .unwrap_or_else(|| TYRADEX_API_BASE.to_string());

        let catalog_file = flags
            .catalog_file
            .clone()
            .or_else(|| lookup("POKETEAM_CATALOG_FILE").map(PathBuf::from));

        let store_path = flags
            .store
            .clone()
            .or_else(|| lookup("POKETEAM_STORE").map(PathBuf::from));

        let origin = flags
            .origin
            .clone()
            .or_else(|| lookup("POKETEAM_ORIGIN"))
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        Config {
            api_base,
            catalog_file,
            store_path,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let config = Config::resolve(&GlobalArgs::default(), env_of(&[]));
        assert_eq!(config.api_base, TYRADEX_API_BASE);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert!(config.catalog_file.is_none());
        assert!(config.store_path.is_none());
    }

    #[test]
    fn env_fills_in_and_flags_win() {
        let env = env_of(&[
            ("POKETEAM_API_BASE", "http://env/api"),
            ("POKETEAM_ORIGIN", "https://env.app"),
            ("POKETEAM_STORE", "/tmp/env-team.json"),
            ("POKETEAM_CATALOG_FILE", ""),
        ]);
        let flags = GlobalArgs {
            origin: Some("https://flag.app".to_string()),
            ..GlobalArgs::default()
        };
        let config = Config::resolve(&flags, env);
        assert_eq!(config.api_base, "http://env/api");
        assert_eq!(config.origin, "https://flag.app");
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/env-team.json")));
        assert!(config.catalog_file.is_none());
    }
}
