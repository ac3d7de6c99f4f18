//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the access token.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    match cfg.base_url {
        Some(ref url) => {
            let _ = writeln!(out, "base_url = \"{url}\"");
        }
        None => {
            let _ = writeln!(out, "# base_url is not set");
        }
    }
    if cfg.access_token.is_some() {
        let _ = writeln!(out, "access_token = \"****\"");
    }
    let _ = writeln!(out, "city_id = \"{}\"", cfg.city_id);
    if let Some(shop) = cfg.shop_id {
        let _ = writeln!(out, "shop_id = {shop}");
    }
    if let Some(ref ca) = cfg.ca_cert {
        let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
    }
    let _ = writeln!(out, "timeout = {}", cfg.timeout);
    let _ = writeln!(out, "read_retries = {}", cfg.read_retries);
    let _ = writeln!(out, "retry_base_delay_ms = {}", cfg.retry_base_delay_ms);
    let _ = writeln!(out, "cache_ttl = {}", cfg.cache_ttl);
    let _ = writeln!(out, "batch_size = {}", cfg.batch_size);
    let _ = writeln!(out, "item_timeout = {}", cfg.item_timeout);
    let _ = writeln!(out, "orders_per_customer = {}", cfg.orders_per_customer);
    let _ = writeln!(out, "breaker_threshold = {}", cfg.breaker_threshold);
    let _ = write!(out, "breaker_reset = {}", cfg.breaker_reset);

    out
}

fn redacted(cfg: &Config) -> Config {
    Config {
        access_token: cfg.access_token.as_ref().map(|_| "****".into()),
        ..cfg.clone()
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::effective_config(global)?;
            let out = output::render_single(
                &global.output,
                &redacted(&cfg),
                format_config_redacted,
                |c| c.base_url.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            base_url,
            city,
            force,
        } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config {
                base_url: Some(base_url),
                ..Config::default()
            };
            if let Some(city) = city {
                cfg.city_id = city;
            }
            // Fails early on a malformed URL instead of saving it.
            cfg.to_backend_config()?;

            config::save_config_to(&cfg, &path)?;
            output::note(
                &format!("Configuration saved to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
