//! Explain command

use colored::Colorize;
use polyconf_core::{KeyPath, Status};

use super::resolve::resolve_context;
use crate::cli::SourceArgs;
use crate::error::{CliError, Result};

/// Run the explain command
pub async fn run_explain(path: &str, source: &SourceArgs) -> Result<Status> {
    let path = KeyPath::parse(path)?;
    let context = resolve_context(source).await?;
    let result = context.result();

    let entries = result.explain(&path);
    if entries.is_empty() {
        return Err(CliError::user(format!("No value at '{path}'")));
    }

    let layer_count = context.layers().len();
    for (leaf, provenance) in entries {
        let value = match result.get(&leaf) {
            Some(value) => serde_json::to_string(value)?,
            None => continue,
        };
        println!(
            "{} = {}  {} {} (rank {})",
            leaf.to_string().cyan(),
            value,
            "from".dimmed(),
            provenance.source().green(),
            provenance.rank(layer_count)
        );
    }

    Ok(context.status())
}
