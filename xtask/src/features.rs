use std::process::Command;

use anyhow::{Context, Result};

const FEATURE_COMBINATIONS: &[(&str, &[&str])] = &[
    ("markethub-common", &[]), // default
    ("markethub-common", &["platform"]),
    ("markethub-common", &["test-utils"]),
    ("markethub-common", &["platform", "test-utils"]),
    ("markethub-infra", &[]),
    ("markethub-infra", &["keychain"]),
];

/// Check that all supported feature combinations compile successfully.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, (package, features)) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let feature_arg = (!features.is_empty()).then_some(joined);
        let display_label = format!("{package} [{}]", feature_arg.as_deref().unwrap_or("default"));

        println!(
            "\n[{}/{}] cargo check -p {package}{}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            feature_arg.as_ref().map(|arg| format!(" --features {arg}")).unwrap_or_default()
        );

        let mut command = Command::new("cargo");
        command.arg("check").arg("-p").arg(package);

        if let Some(feature_list) = feature_arg.as_ref() {
            command.arg("--features").arg(feature_list.as_str());
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed to compile");
        }

        println!("✅ {display_label} compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
