use std::path::Path;

use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use petcare_core::config::DashboardConfig;

use crate::output::Output;

/// Show current configuration
pub fn show(config: &DashboardConfig, output: &Output) -> Result<()> {
    output.section("Current Configuration");
    output.print("");

    let toml_str = toml::to_string_pretty(config).into_diagnostic()?;
    for line in toml_str.lines() {
        output.print(line);
    }

    Ok(())
}

/// Write the default configuration to `path`
pub fn init(path: &Path, force: bool, output: &Output) -> Result<()> {
    if path.exists() && !force {
        return Err(miette::miette!(
            help = "pass --force to overwrite it",
            "Config file already exists: {}",
            path.display()
        ));
    }

    output.info("💾", &format!("Writing default configuration to: {}", path.display()));
    DashboardConfig::default().save(path)?;

    output.success("Configuration saved successfully!");
    output.print("");
    output.status("To use this configuration, run:");
    output.status(&format!(
        "{} --config {} refresh --fixture <pets.json>",
        "petcare".bright_green(),
        path.display()
    ));

    Ok(())
}
