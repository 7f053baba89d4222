//! Layered configuration loading (spec §3 "Configuration", §6).
//!
//! Precedence, lowest to highest: the file named by `GATEWAY_CONFIG`
//! (falling back to a short list of standard search paths), then
//! `GATEWAY_`-prefixed environment variables. The result is handed to
//! callers as one explicit [`RagConfig`] value; nothing is cached in a
//! global (spec §9 "Global config singleton").

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use ragate_domain::config::RagConfig;
use ragate_domain::error::{Error, Result};

/// Env var naming an explicit config file path, checked before the
/// standard search paths.
const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG";

/// Prefix for environment-variable overrides, e.g. `GATEWAY_AUTH_TOKEN`.
const ENV_PREFIX: &str = "GATEWAY_";

/// Searched in order when `GATEWAY_CONFIG` is unset; the first file
/// found is used.
const STANDARD_SEARCH_PATHS: &[&str] = &["ragate.toml", "config/ragate.toml", "/etc/ragate/config.toml"];

/// Loads configuration from the filesystem and environment.
pub fn load() -> Result<RagConfig> {
    let figment = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => Figment::new().merge(Toml::file(path)),
        Err(_) => STANDARD_SEARCH_PATHS
            .iter()
            .fold(Figment::new(), |figment, path| figment.merge(Toml::file(path))),
    };
    extract(figment)
}

/// Describes which config source `load()` would resolve, for startup
/// logging only (spec §A "config source resolved"). Mirrors `load()`'s
/// own precedence without duplicating the actual merge.
#[must_use]
pub fn describe_source() -> String {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return format!("{CONFIG_PATH_VAR}={path}");
    }
    STANDARD_SEARCH_PATHS
        .iter()
        .find(|path| std::path::Path::new(path).is_file())
        .map_or_else(|| "no config file found, using defaults + env".to_owned(), |path| (*path).to_owned())
}

/// Loads configuration from an in-memory TOML document, still honoring
/// `GATEWAY_`-prefixed environment overrides. Used by tests and by
/// callers embedding a default config.
pub fn load_from_str(toml_source: &str) -> Result<RagConfig> {
    let figment = Figment::new().merge(Toml::string(toml_source));
    extract(figment)
}

fn extract(figment: Figment) -> Result<RagConfig> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| Error::config(e.to_string()))
}
