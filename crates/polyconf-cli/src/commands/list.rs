//! List command

use colored::Colorize;
use polyconf_core::ALL_PLUGINS;

use super::resolve::builtin_registry;
use crate::error::Result;

/// Run the list command
pub fn run_list() -> Result<()> {
    let registry = builtin_registry()?;
    let selection = registry.select(&[ALL_PLUGINS])?;

    println!("{}", "Plugins (execution order)".bold());
    println!();
    for plugin in selection.plugins() {
        println!(
            "  {:<12} {} {}",
            plugin.name().green(),
            "priority".dimmed(),
            plugin.priority()
        );
    }
    println!();
    println!("{} {} plugins registered.", "Total:".dimmed(), selection.len());

    Ok(())
}
