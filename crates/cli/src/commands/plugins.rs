//! Plugins command implementation.

use console::style;
use miette::Result;
use shine_plugin::PluginRegistry;

/// Lists every successfully loaded plugin, in dispatch order.
pub fn execute(registry: &PluginRegistry) -> Result<()> {
    let plugins = registry.plugins();

    if plugins.is_empty() {
        println!("No plugins loaded.");
        return Ok(());
    }

    println!("{}", style("Loaded plugins:").bold());
    println!();

    for plugin in plugins {
        println!(
            "  {} {} - {}",
            style(&plugin.name).cyan().bold(),
            style(format!("v{}", plugin.version)).dim(),
            style(plugin.extensions.join(", ")).dim()
        );
    }

    Ok(())
}
