//! Runtime settings resolved from the environment.
//!
//! The binary loads `.env` with `dotenvy` first, so anything set there is
//! visible here as a regular environment variable.

use crate::fetch::graphql::DEFAULT_ENDPOINT;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Your details)";
pub const DEFAULT_ZIP_PROPERTY: &str = "ZCTA5CE10";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/gas_price_map.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// GraphQL endpoint the station queries are posted to.
    pub endpoint: String,
    /// Static `User-Agent` sent with every request.
    pub user_agent: String,
    /// GeoJSON feature property holding the zip code.
    pub zip_property: String,
    pub log_file_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            zip_property: DEFAULT_ZIP_PROPERTY.to_string(),
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Reads `GAS_PRICE_ENDPOINT`, `GAS_PRICE_USER_AGENT`, `ZIP_PROPERTY` and
    /// `LOG_FILE_PATH`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same resolution as [`Settings::from_env`] over an arbitrary lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: String| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
        };
        let defaults = Self::default();

        Self {
            endpoint: get("GAS_PRICE_ENDPOINT", defaults.endpoint),
            user_agent: get("GAS_PRICE_USER_AGENT", defaults.user_agent),
            zip_property: get("ZIP_PROPERTY", defaults.zip_property),
            log_file_path: get("LOG_FILE_PATH", defaults.log_file_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_lookup_uses_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.endpoint, "https://www.gasbuddy.com/graphql");
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GAS_PRICE_ENDPOINT", "http://localhost:8080/graphql"),
            ("ZIP_PROPERTY", "ZCTA5CE20"),
            ("LOG_FILE_PATH", "   "),
        ]
        .into_iter()
        .collect();

        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.endpoint, "http://localhost:8080/graphql");
        assert_eq!(settings.zip_property, "ZCTA5CE20");
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        // blank values fall back
        assert_eq!(settings.log_file_path, DEFAULT_LOG_FILE_PATH);
    }
}
