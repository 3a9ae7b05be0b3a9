//! Alias configuration for filter labels.
//!
//! `$name` tokens in a filter label expand to a user-configurable list of
//! terms. The mapping persists as pretty-printed JSON. Loading never fails
//! from the caller's point of view: a missing file produces the defaults
//! (and persists them), a corrupt file is logged and replaced by the
//! defaults, and a loaded file is merged with any default aliases it does
//! not mention -- user edits always win over shipped defaults.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Errors that can occur when persisting alias configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or serialize JSON content.
    #[error("failed to parse config JSON: {source}")]
    Json {
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

/// The alias table: filter alias name to list of terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Alias name to the terms it expands to.
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
}

impl FilterConfig {
    /// A configuration with no aliases at all.
    pub const fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// The shipped default aliases: common warehouse term groups.
    pub fn defaults() -> Self {
        let mut config = Self::empty();
        config.set_alias_strs("metals", &["iron", "gold", "copper", "tin"]);
        config.set_alias_strs("timbers", &["oak", "pine", "birch"]);
        config.set_alias_strs(
            "foodstuffs",
            &["bread", "apple", "salted", "dried", "honey"],
        );
        config.set_alias_strs("textiles", &["wool", "linen", "canvas"]);
        config.set_alias_strs("tools", &["hammer", "wrench", "saw", "crowbar"]);
        config.set_alias_strs("fuels", &["coal", "coke", "lamp_oil"]);
        config.set_alias_strs("gems", &["quartz", "amber", "jade"]);
        config.set_alias_strs("containers", &["bundle_crate", "cask"]);
        config
    }

    /// The full alias table.
    pub const fn aliases(&self) -> &BTreeMap<String, Vec<String>> {
        &self.aliases
    }

    /// The terms an alias expands to, if configured.
    pub fn alias(&self, name: &str) -> Option<&[String]> {
        self.aliases.get(name).map(Vec::as_slice)
    }

    /// Set or replace an alias.
    pub fn set_alias(&mut self, name: &str, terms: Vec<String>) {
        self.aliases.insert(String::from(name), terms);
    }

    fn set_alias_strs(&mut self, name: &str, terms: &[&str]) {
        self.set_alias(name, terms.iter().map(|t| String::from(*t)).collect());
    }

    /// Remove an alias. Returns whether it existed.
    pub fn remove_alias(&mut self, name: &str) -> bool {
        self.aliases.remove(name).is_some()
    }

    /// Add any default alias missing from this configuration.
    ///
    /// Aliases the user edited or deleted-and-recreated keep their values;
    /// only names absent entirely are filled in. This lets new shipped
    /// defaults appear after an upgrade without clobbering user data.
    pub fn merge_missing_defaults(&mut self) {
        for (name, terms) in Self::defaults().aliases {
            self.aliases.entry(name).or_insert(terms);
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load configuration from a JSON file.
    ///
    /// Never fails: a missing or unparseable file is logged and replaced
    /// by [`defaults`](Self::defaults) (which are persisted back), and a
    /// parsed file is merged with any missing default aliases.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        config.merge_missing_defaults();
                        return config;
                    }
                    Err(source) => {
                        error!(%source, ?path, "failed to parse config, using defaults");
                    }
                },
                Err(source) => {
                    error!(%source, ?path, "failed to read config, using defaults");
                }
            }
        }

        let config = Self::defaults();
        if let Err(source) = config.save(path) {
            error!(%source, ?path, "failed to persist default config");
        } else {
            info!(?path, "default filter aliases persisted");
        }
        config
    }

    /// Persist the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on serialization or I/O failure. Callers in
    /// the behavior path log and continue; persistence failures never
    /// reach the transport core.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("haulage-{tag}-{}.json", uuid::Uuid::now_v7()))
    }

    #[test]
    fn defaults_include_metals() {
        let config = FilterConfig::defaults();
        let metals = config.alias("metals");
        assert!(metals.is_some_and(|terms| terms.iter().any(|t| t == "iron")));
    }

    #[test]
    fn set_and_get_alias() {
        let mut config = FilterConfig::empty();
        config.set_alias("ores", vec![String::from("hematite")]);
        assert_eq!(
            config.alias("ores").and_then(|t| t.first()).map(String::as_str),
            Some("hematite")
        );
        assert!(config.alias("missing").is_none());
    }

    #[test]
    fn merge_preserves_user_edits() {
        let mut config = FilterConfig::empty();
        config.set_alias("metals", vec![String::from("only_mine")]);
        config.merge_missing_defaults();
        // The edited alias keeps its value; other defaults appear.
        assert_eq!(
            config.alias("metals").map(<[String]>::len),
            Some(1)
        );
        assert!(config.alias("tools").is_some());
    }

    #[test]
    fn load_missing_file_persists_defaults() {
        let path = temp_path("missing");
        let config = FilterConfig::load(&path);
        assert!(config.alias("metals").is_some());
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_round_trips_saved_config() {
        let path = temp_path("roundtrip");
        let mut config = FilterConfig::defaults();
        config.set_alias("custom", vec![String::from("special")]);
        assert!(config.save(&path).is_ok());

        let loaded = FilterConfig::load(&path);
        assert_eq!(
            loaded.alias("custom").and_then(|t| t.first()).map(String::as_str),
            Some("special")
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_corrupt_file_falls_back_to_defaults() {
        let path = temp_path("corrupt");
        assert!(std::fs::write(&path, "{ not json").is_ok());
        let config = FilterConfig::load(&path);
        assert!(config.alias("metals").is_some());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_merges_new_defaults_into_old_file() {
        let path = temp_path("merge");
        let mut old = FilterConfig::empty();
        old.set_alias("metals", vec![String::from("adamantine")]);
        assert!(old.save(&path).is_ok());

        let loaded = FilterConfig::load(&path);
        // User value preserved, missing defaults added.
        assert_eq!(
            loaded.alias("metals").and_then(|t| t.first()).map(String::as_str),
            Some("adamantine")
        );
        assert!(loaded.alias("textiles").is_some());
        let _ = std::fs::remove_file(&path);
    }
}
