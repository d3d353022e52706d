use anyhow::{Context, Result};
use rota_core::model::PlanScenario;
use std::path::Path;

/// Parse a plan scenario from a YAML file and validate its structure.
pub fn parse_scenario(path: &Path) -> Result<PlanScenario> {
    if !path.exists() {
        anyhow::bail!(
            "Scenario file not found: {}\nPlease check the file path and try again.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read scenario file: {}\nPlease check file permissions.",
            path.display()
        )
    })?;

    // serde_path_to_error points at the offending field instead of a
    // bare line/column pair
    let deserializer = serde_yaml::Deserializer::from_str(&content);
    let scenario: PlanScenario =
        serde_path_to_error::deserialize(deserializer).with_context(|| {
            format!(
                "Failed to parse YAML from: {}\n\
                 This usually means there's a syntax error or missing required field.",
                path.display()
            )
        })?;

    scenario
        .validate()
        .with_context(|| format!("Invalid scenario structure in: {}", path.display()))?;

    Ok(scenario)
}
