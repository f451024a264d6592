pub mod budget;
pub mod calendar;
pub mod guest;
pub mod photo;
pub mod set;
pub mod status;
pub mod suggest;
pub mod table;
pub mod task;
pub mod timeline;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use tracing::debug;
use wedplan_core::config::{StoreConfig, WedplanConfig};
use wedplan_core::store::{FileStore, MemoryStore};
use wedplan_core::{Mutation, SyncSession, WeddingDocument};
use wedplan_google::FirestoreStore;

use crate::utils::tui::create_spinner;

/// How long to wait for the first snapshot before giving up.
const LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Start a sync session against the configured store and wait until the
/// wedding document has been loaded.
pub async fn open_session(config: &WedplanConfig) -> Result<SyncSession> {
    let debounce = config.debounce();
    let poll_interval = config.store.poll_interval();
    debug!(
        document_id = %config.document_id,
        debounce_ms = debounce.as_millis() as u64,
        "opening sync session"
    );

    let session = match &config.store {
        StoreConfig::Local { .. } => {
            let store = FileStore::new(&config.data_path(), &config.document_id, poll_interval);
            SyncSession::start(Arc::new(store), debounce)
        }
        StoreConfig::Memory => SyncSession::start(Arc::new(MemoryStore::new()), debounce),
        StoreConfig::Firestore {
            project_id,
            api_key,
            collection,
            ..
        } => {
            let store = FirestoreStore::new(
                project_id,
                collection,
                &config.document_id,
                api_key.clone(),
                poll_interval,
            )?;
            SyncSession::start(Arc::new(store), debounce)
        }
    };

    let spinner = create_spinner("Loading wedding");
    let loaded = tokio::time::timeout(LOAD_TIMEOUT, session.ready()).await;
    spinner.finish_and_clear();

    match loaded {
        Ok(result) => result.context("Failed to load the wedding document")?,
        Err(_) => anyhow::bail!(
            "Timed out after {}s waiting for the wedding document",
            LOAD_TIMEOUT.as_secs()
        ),
    }

    debug!(state = ?session.state(), "wedding document loaded");
    Ok(session)
}

/// Load the current document and close the session.
pub async fn read_document(config: &WedplanConfig) -> Result<WeddingDocument> {
    let session = open_session(config).await?;
    let document = session.document();
    session.shutdown().await?;
    Ok(document)
}

/// Apply `mutations` in order, save right away and close the session.
/// Returns the document as saved.
pub async fn commit(
    session: SyncSession,
    mutations: impl IntoIterator<Item = Mutation>,
) -> Result<WeddingDocument> {
    let mut applied = 0usize;
    for mutation in mutations {
        session.apply(mutation).await?;
        applied += 1;
    }
    debug!(applied, "flushing local edits");

    let spinner = create_spinner("Saving");
    let flushed = session.flush().await;
    spinner.finish_and_clear();

    let document = session.document();
    session.shutdown().await?;
    flushed.context("Failed to save the wedding document")?;
    debug!(updated_at = document.updated_at, "wedding document committed");

    Ok(document)
}

/// Find the id of the item matching `query` exactly or by unique prefix.
pub fn resolve_id<T>(
    items: &[T],
    id_of: impl Fn(&T) -> &str,
    query: &str,
    kind: &str,
) -> Result<String> {
    if let Some(item) = items.iter().find(|item| id_of(item) == query) {
        return Ok(id_of(item).to_string());
    }

    let matches: Vec<&str> = items
        .iter()
        .map(&id_of)
        .filter(|id| id.starts_with(query))
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => anyhow::bail!("No {kind} with id '{query}'"),
        _ => anyhow::bail!(
            "'{query}' matches {} {kind}s, use more characters",
            matches.len()
        ),
    }
}

/// Ask before deleting, unless `--yes` was given.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<String> {
        vec!["abc123".into(), "abd456".into(), "xyz".into()]
    }

    #[test]
    fn test_resolves_exact_and_prefix() {
        let items = ids();
        assert_eq!(resolve_id(&items, |s| s.as_str(), "xyz", "task").unwrap(), "xyz");
        assert_eq!(resolve_id(&items, |s| s.as_str(), "abc", "task").unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_commit_saves_against_memory_store() {
        let config = WedplanConfig {
            store: StoreConfig::Memory,
            ..WedplanConfig::default()
        };
        let session = open_session(&config).await.unwrap();

        let saved = commit(session, [Mutation::SetWeddingTheme("Boho".into())])
            .await
            .unwrap();
        assert_eq!(saved.wedding_theme, "Boho");
        assert!(saved.updated_at > 0);
    }

    #[test]
    fn test_ambiguous_or_missing_prefix_fails() {
        let items = ids();
        assert!(resolve_id(&items, |s| s.as_str(), "ab", "task").is_err());
        assert!(resolve_id(&items, |s| s.as_str(), "q", "task").is_err());
    }
}
