use anyhow::Result;
use chrono::Utc;
use wedplan_core::config::WedplanConfig;
use wedplan_core::stats::WeddingStats;

use super::read_document;
use crate::render::render_stats;

pub async fn run(config: &WedplanConfig) -> Result<()> {
    let document = read_document(config).await?;
    let stats = WeddingStats::compute(&document, Utc::now());

    for line in render_stats(&stats, &document) {
        println!("{line}");
    }

    Ok(())
}
