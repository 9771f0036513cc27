//! Check command - validates the config and shows what would be queried

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::Config;
use crate::models::category::format_threshold;

pub fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    let builder = config.query_builder()?;

    println!(
        "{} {} is valid",
        "✓".green().bold(),
        config_path.display()
    );
    println!(
        "  detector every {}s, resolver every {}s, summary {}",
        config.detector.interval_secs,
        config.resolver.interval_secs,
        if config.detector.summary.enabled {
            format!("every {}s at most", config.detector.summary.min_interval_secs)
        } else {
            "disabled".to_string()
        }
    );

    for category in config.categories() {
        let query = builder
            .category_query(&category)
            .with_context(|| format!("Failed to build query for {}", category.name))?;

        println!();
        println!(
            "{} {} {}",
            "→".cyan().bold(),
            category.name.bold(),
            format!("(stale after {})", format_threshold(category.threshold)).dimmed()
        );
        println!("  {}", category.render_headline(0).dimmed());
        for line in query.to_string().lines() {
            println!("  {line}");
        }
    }

    Ok(())
}
