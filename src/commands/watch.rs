use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use tokio::sync::broadcast::error::RecvError;
use wedplan_core::SyncEvent;
use wedplan_core::config::WedplanConfig;
use wedplan_core::stats::WeddingStats;

use super::open_session;
use crate::render::{Render, render_stats};

pub async fn run(config: &WedplanConfig) -> Result<()> {
    let session = open_session(config).await?;
    let mut events = session.events();

    print_summary(&session.document());
    println!("{}", "Watching for changes, Ctrl-C to stop".dimmed());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    let time = Local::now().format("%H:%M:%S").to_string();
                    println!("{} {}", time.dimmed(), event.render());
                    if event == SyncEvent::RemoteApplied {
                        print_summary(&session.document());
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    session.shutdown().await?;
    Ok(())
}

fn print_summary(document: &wedplan_core::WeddingDocument) {
    let stats = WeddingStats::compute(document, chrono::Utc::now());
    for line in render_stats(&stats, document) {
        println!("{line}");
    }
}
