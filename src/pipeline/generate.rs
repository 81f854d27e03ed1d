// src/pipeline/generate.rs

//! Batch run over several brands and the combined flavor report.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::browser::SessionFactory;
use crate::error::Result;
use crate::models::{Config, FlavorEntry, FlavorReport, Location, LocationRegistry};
use crate::pipeline::fetch::FetchOrchestrator;
use crate::pipeline::scrape::SocialScraper;

/// Scrape every enabled location of `brands` and assemble the report.
///
/// Each location runs its blocking pipeline on the blocking thread pool; at
/// most `scrape.max_concurrent` run at once. Records keep registry order.
pub async fn run_generate<F>(
    factory: F,
    config: Arc<Config>,
    registry: &LocationRegistry,
    brands: &[String],
) -> FlavorReport
where
    F: SessionFactory + Clone + Send + 'static,
{
    let jobs: Vec<(usize, String, Location)> = brands
        .iter()
        .flat_map(|brand| {
            let locations = registry.locations_for(brand);
            if locations.is_empty() {
                log::warn!("{}: No enabled locations", brand.to_uppercase());
            }
            locations.into_iter().map(move |l| (brand.clone(), l))
        })
        .enumerate()
        .map(|(i, (brand, location))| (i, brand, location))
        .collect();

    log::info!(
        "Scraping {} location(s) across {} brand(s)",
        jobs.len(),
        brands.len()
    );

    let concurrency = config.scrape.max_concurrent.max(1);
    let mut results: Vec<(usize, FlavorEntry)> = stream::iter(jobs)
        .map(|(i, brand, location)| {
            let factory = factory.clone();
            let config = Arc::clone(&config);
            async move {
                let name = location.name.clone();
                let task = tokio::task::spawn_blocking(move || {
                    let orchestrator = FetchOrchestrator::new(factory, &config);
                    SocialScraper::new(brand, orchestrator, config.scrape.clone())
                        .scrape_location(&location)
                });
                match task.await {
                    Ok(entry) => entry.map(|e| (i, e)),
                    Err(e) => {
                        log::error!("Scrape task for {} failed: {}", name, e);
                        None
                    }
                }
            }
        })
        .buffer_unordered(concurrency)
        .filter_map(|r| async move { r })
        .collect()
        .await;

    results.sort_by_key(|(i, _)| *i);
    let flavors: Vec<FlavorEntry> = results.into_iter().map(|(_, e)| e).collect();

    log::info!("Collected {} flavor(s)", flavors.len());
    FlavorReport::new(config.scrape.now(), flavors)
}

/// Write the report as pretty JSON, replacing `path` atomically.
pub async fn write_report(path: &Path, report: &FlavorReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(report)?;
    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    log::info!("Wrote {} flavor(s) to {}", report.flavor_count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SnapshotFactory;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"
        [[bigdeal]]
        id = "bigdeal-vliet"
        name = "Big Deal Burgers"
        facebook = "https://www.facebook.com/bigdeal"
        lat = 43.05627
        lng = -87.98273

        [[bigdeal]]
        name = "Big Deal (second)"
        facebook = "https://www.facebook.com/bigdeal2"

        [[bigdeal]]
        name = "Big Deal (closed)"
        facebook = "https://www.facebook.com/bigdeal3"
        enabled = false
    "#;

    const PAGE: &str = r#"
        <div role="article"><p>2h</p><p>Flavor of the Day: Mint Oreo 🍨</p></div>
    "#;

    fn config(max_concurrent: usize) -> Arc<Config> {
        let mut config = Config::default();
        config.scrape.max_concurrent = max_concurrent;
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_generate_collects_enabled_locations_in_order() {
        let registry: LocationRegistry = toml::from_str(REGISTRY).unwrap();

        let report = run_generate(
            SnapshotFactory::new(PAGE),
            config(2),
            &registry,
            &["bigdeal".to_string(), "kopps".to_string()],
        )
        .await;

        assert_eq!(report.flavor_count, 2);
        assert_eq!(report.flavors[0].location, "Big Deal Burgers");
        assert_eq!(report.flavors[1].location, "Big Deal (second)");
        assert!(report.flavors.iter().all(|f| f.flavor == "Mint Oreo"));
        assert_eq!(
            report.generated_date,
            report.generated_at.format("%Y-%m-%d").to_string()
        );
    }

    #[tokio::test]
    async fn test_generate_without_announcements_is_empty() {
        let registry: LocationRegistry = toml::from_str(REGISTRY).unwrap();

        let report = run_generate(
            SnapshotFactory::new("<div role=\"article\"><p>Closed for the holiday</p></div>"),
            config(1),
            &registry,
            &["bigdeal".to_string()],
        )
        .await;

        assert_eq!(report.flavor_count, 0);
        assert!(report.flavors.is_empty());
    }

    #[tokio::test]
    async fn test_write_report() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("flavors.json");
        let registry: LocationRegistry = toml::from_str(REGISTRY).unwrap();
        let report = run_generate(
            SnapshotFactory::new(PAGE),
            config(1),
            &registry,
            &["bigdeal".to_string()],
        )
        .await;

        write_report(&path, &report).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"flavor_count\": 2"));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["flavors"][0]["flavor"], "Mint Oreo");
        assert_eq!(value["flavors"][0]["brand"], "Bigdeal");
        assert_eq!(value["flavors"][0]["lat"], 43.05627);
        assert!(value["flavors"][1].get("lat").is_none());
        assert!(!path.with_extension("tmp").exists());
    }
}
