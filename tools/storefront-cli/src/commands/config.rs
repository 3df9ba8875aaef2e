//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { base_url, force } => init_config(&base_url, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    let config = &ctx.config;
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("timeout_ms", &config.api.timeout_ms.to_string());
    ctx.output.kv("max_retries", &config.api.max_retries.to_string());

    ctx.output.info("[storage]");
    ctx.output.kv(
        "dir",
        &config.storage_dir(ctx.base_dir()).display().to_string(),
    );
    ctx.output.kv("cart_slot", &config.storage.cart_slot);
    ctx.output.kv("token_slot", &config.storage.token_slot);

    ctx.output.info("[store]");
    ctx.output.kv("name", &config.store.name);
    ctx.output.kv("currency", &config.store.currency);
    ctx.output.kv(
        "payment_key",
        if config.store.payment_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        },
    );

    Ok(())
}

fn init_config(base_url: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config(base_url))
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = ctx.config.check();

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
