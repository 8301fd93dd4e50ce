//! Resolve command and the resolution setup shared with `explain`

use std::time::Duration;

use colored::Colorize;
use polyconf_core::{Context, LayerValues, Registry, Settings, Status};
use polyconf_plugins::builtin_plugins;
use serde_json::Value;

use crate::cli::{OutputFormat, SourceArgs};
use crate::error::{CliError, Result};

/// Run the resolve command
pub async fn run_resolve(source: &SourceArgs, output: OutputFormat) -> Result<Status> {
    let context = resolve_context(source).await?;

    match output {
        OutputFormat::Primitive => {
            let native = context.result().as_native_value();
            println!("{}", serde_json::to_string_pretty(&native)?);
        }
        OutputFormat::Serialized => print!("{}", context.result().serialize()),
        OutputFormat::Raw => println!("{}", serde_json::to_string_pretty(&context.raw())?),
    }

    Ok(context.status())
}

/// Registry holding the built-in plugins.
pub(crate) fn builtin_registry() -> Result<Registry> {
    Ok(Registry::with_plugins(builtin_plugins(LayerValues::new()))?)
}

/// Run a full resolution for `source` and report its status on stderr.
pub(crate) async fn resolve_context(source: &SourceArgs) -> Result<Context> {
    let settings = load_settings(source)?;
    let context = build_context(source)?;
    let registry = builtin_registry()?;

    tracing::debug!(
        app_name = %source.app_name,
        plugins = ?source.select_plugin,
        "Resolving configuration"
    );

    match registry
        .resolve(context, source.select_plugin.as_slice(), &settings)
        .await
    {
        Ok(resolved) => {
            print_status(resolved.status());
            Ok(resolved)
        }
        Err(e) => {
            if let Some(partial) = e.partial_context() {
                print_status(partial.status());
            }
            Err(e.into())
        }
    }
}

fn load_settings(source: &SourceArgs) -> Result<Settings> {
    let mut settings = match &source.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(ms) = source.timeout_ms {
        settings = settings.with_plugin_timeout(Duration::from_millis(ms));
    }
    Ok(settings)
}

fn build_context(source: &SourceArgs) -> Result<Context> {
    let prefix = source
        .app_prefix
        .clone()
        .unwrap_or_else(|| source.app_name.to_uppercase());

    let overrides = source
        .set
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>>>()?;
    let context = Context::builder(source.app_name.as_str())
        .app_prefix(prefix)
        .given_all(overrides)?
        .build();
    Ok(context)
}

/// Split `key.path=value`; the value is JSON when it parses, else a string.
fn parse_override(raw: &str) -> Result<(&str, Value)> {
    let (path, value) = raw.split_once('=').ok_or_else(|| {
        CliError::user(format!("Invalid override '{raw}': expected key.path=value"))
    })?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((path, value))
}

fn print_status(status: Status) {
    let label = match status {
        Status::Success => status.as_str().green().bold(),
        Status::Degraded => status.as_str().yellow().bold(),
        Status::Failed => status.as_str().red().bold(),
        Status::Init | Status::Running => status.as_str().normal(),
    };
    eprintln!("Result Status: {label}");
}
