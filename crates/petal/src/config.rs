//! CLI configuration: thin wrapper around `petal_config`.
//!
//! Adds flag overrides from `GlobalOpts` (--base-url, --token, --city,
//! --timeout) on top of the file and environment layers.

use petal_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use petal_config::{Config, config_path, load_config, save_config_to};

/// Apply flag overrides to a loaded config. Flags win over file and env.
pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(url) = &global.base_url {
        cfg.base_url = Some(url.clone());
    }
    if let Some(token) = &global.token {
        cfg.access_token = Some(token.clone());
    }
    if let Some(city) = &global.city {
        cfg.city_id.clone_from(city);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    cfg
}

/// Effective configuration: file, then env, then flags.
pub fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(apply_overrides(load_config()?, global))
}

/// Build the runtime `BackendConfig` for data commands.
pub fn build_backend_config(global: &GlobalOpts) -> Result<BackendConfig, CliError> {
    Ok(effective_config(global)?.to_backend_config()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    #[test]
    fn flags_override_loaded_values() {
        let cli = Cli::try_parse_from([
            "petal",
            "--base-url",
            "https://flags.example.com",
            "--city",
            "9",
            "--timeout",
            "3",
            "config",
            "show",
        ])
        .unwrap();

        let base = Config {
            base_url: Some("https://file.example.com".into()),
            ..Config::default()
        };
        let cfg = apply_overrides(base, &cli.global);
        assert_eq!(cfg.base_url.as_deref(), Some("https://flags.example.com"));
        assert_eq!(cfg.city_id, "9");
        assert_eq!(cfg.timeout, 3);
    }
}
