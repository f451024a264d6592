use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use wedplan_core::config::WedplanConfig;
use wedplan_core::mutation::Mutation;
use wedplan_google::{FirebaseStorage, couple_image_path};

use super::{commit, open_session};
use crate::utils::tui::create_spinner;

pub async fn run(config: &WedplanConfig, file: &Path) -> Result<()> {
    let bucket = config.google.storage_bucket.as_deref().context(
        "No storage bucket configured. Set google.storage_bucket in the config file \
         or WEDPLAN__GOOGLE__STORAGE_BUCKET",
    )?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let storage = FirebaseStorage::new(bucket);
    let path = couple_image_path(Utc::now().timestamp_millis());

    let spinner = create_spinner("Uploading photo");
    let uploaded = storage.upload(bytes, &path, content_type(file)).await;
    spinner.finish_and_clear();
    let url = uploaded?;

    let session = open_session(config).await?;
    commit(session, [Mutation::SetCoupleImage(Some(url.clone()))]).await?;

    println!("{} {}", "Photo updated".green(), url.dimmed());
    Ok(())
}

fn content_type(file: &Path) -> &'static str {
    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guesses_image_content_type() {
        assert_eq!(content_type(Path::new("boda.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("boda.png")), "image/png");
        assert_eq!(content_type(Path::new("boda")), "application/octet-stream");
    }
}
