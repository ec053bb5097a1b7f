use crate::estimate::{self, EstimateValue};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Read};
use std::path::PathBuf;

pub fn handle_extract(
    text: Option<String>,
    file: Option<PathBuf>,
    fallback: EstimateValue,
    json: bool,
) -> Result<()> {
    let text = match (text, file) {
        (Some(t), _) => t,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            content
        }
    };

    let result = estimate::extract(&text, fallback);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let matched = if result.matched {
            "matched".green()
        } else {
            "fallback".yellow()
        };
        println!(
            "{} {} ({}, {})",
            "Estimate:".bold(),
            result.value.to_string().cyan(),
            result.method_label(),
            matched
        );
    }
    Ok(())
}
