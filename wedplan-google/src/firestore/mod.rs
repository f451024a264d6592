//! Firestore-backed document store (REST).
//!
//! Saves use `PATCH` with an update mask naming exactly the fields being
//! written, so fields this client does not know about survive. Change
//! notification is done by polling the document and emitting whenever its
//! `updateTime` moves.

pub mod value;

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use wedplan_core::model::WeddingDocument;
use wedplan_core::store::{Delivery, DocumentStore, Subscription};
use wedplan_core::{WeddingError, WeddingResult};

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    update_time: Option<String>,
}

/// What a poll saw: the document (if any) and the server's change marker.
type Fetched = Option<(WeddingDocument, String)>;

#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    document_url: Url,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl FirestoreStore {
    pub fn new(
        project_id: &str,
        collection: &str,
        document_id: &str,
        api_key: Option<String>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let document_url = document_url(project_id, collection, document_id)?;

        Ok(FirestoreStore {
            http: reqwest::Client::new(),
            document_url,
            api_key,
            poll_interval,
        })
    }

    fn url(&self) -> Url {
        let mut url = self.document_url.clone();
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        url
    }

    async fn write(&self, document: &WeddingDocument) -> Result<()> {
        let fields = document
            .to_fields()
            .context("Failed to serialize wedding document")?;

        let mut url = self.url();
        {
            let mut query = url.query_pairs_mut();
            for field in fields.keys() {
                query.append_pair("updateMask.fieldPaths", field);
            }
        }

        let body = json!({ "fields": value::encode_fields(&fields) });
        let response = self
            .http
            .patch(url)
            .json(&body)
            .send()
            .await
            .context("Failed to send document to Firestore")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Firestore rejected the write ({status}): {error_text}");
        }

        Ok(())
    }

    async fn fetch(&self) -> Result<Fetched> {
        let response = self
            .http
            .get(self.url())
            .send()
            .await
            .context("Failed to fetch document from Firestore")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Firestore read failed ({status}): {error_text}");
        }

        let raw: FirestoreDocument = response
            .json()
            .await
            .context("Failed to parse Firestore document")?;

        parse_document(raw).map(Some)
    }

    async fn poll(self, tx: mpsc::UnboundedSender<Delivery>) {
        // `None` = nothing emitted yet; `Some(None)` = last seen absent.
        let mut last_marker: Option<Option<String>> = None;
        let mut last_error: Option<String> = None;
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let fetched = match self.fetch().await {
                Ok(fetched) => fetched,
                Err(e) => {
                    let message = format!("{e:#}");
                    warn!("Firestore poll failed: {message}");
                    // Repeat failures are reported once; the next success is re-sent.
                    last_marker = None;
                    if last_error.as_deref() != Some(message.as_str()) {
                        if tx.send(Err(WeddingError::Remote(message.clone()))).is_err() {
                            break;
                        }
                        last_error = Some(message);
                    }
                    continue;
                }
            };
            last_error = None;

            let marker = fetched.as_ref().map(|(_, update_time)| update_time.clone());
            if last_marker.as_ref() == Some(&marker) {
                continue;
            }
            debug!(update_time = ?marker, "Firestore document changed");
            last_marker = Some(marker);

            if tx.send(Ok(fetched.map(|(doc, _)| doc))).is_err() {
                break;
            }
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn save(&self, document: &WeddingDocument) -> WeddingResult<()> {
        self.write(document)
            .await
            .map_err(|e| WeddingError::Remote(format!("{e:#}")))
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = tokio::spawn(self.clone().poll(tx));
        Subscription::polled(rx, poller)
    }
}

fn document_url(project_id: &str, collection: &str, document_id: &str) -> Result<Url> {
    let mut url = Url::parse(FIRESTORE_API).context("Invalid Firestore base URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Firestore base URL cannot have path segments"))?
        .extend([
            "projects",
            project_id,
            "databases",
            "(default)",
            "documents",
            collection,
            document_id,
        ]);
    Ok(url)
}

fn parse_document(raw: FirestoreDocument) -> Result<(WeddingDocument, String)> {
    let fields = value::decode_fields(&raw.fields);
    let document = WeddingDocument::from_value(Value::Object(fields))
        .context("Firestore document is not a wedding document")?;
    Ok((document, raw.update_time.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_document_url() {
        let url = document_url("mi-boda", "weddings", "default-wedding").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/mi-boda/databases/(default)/documents/weddings/default-wedding"
        );
    }

    #[test]
    fn test_api_key_goes_in_query() {
        let store = FirestoreStore::new(
            "p",
            "weddings",
            "w",
            Some("secret".into()),
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(store.url().query(), Some("key=secret"));
    }

    #[tokio::test]
    async fn test_unreachable_firestore_is_delivered_as_error() {
        let store = FirestoreStore {
            http: reqwest::Client::new(),
            document_url: Url::parse("http://127.0.0.1:9/weddings/w").unwrap(),
            api_key: None,
            poll_interval: Duration::from_millis(50),
        };
        let mut sub = store.subscribe();

        let first = tokio::time::timeout(Duration::from_secs(5), sub.next())
            .await
            .expect("first delivery should not wait for a good poll")
            .unwrap();
        assert!(matches!(first, Err(WeddingError::Remote(_))));
    }

    #[test]
    fn test_parses_remote_document_with_defaults() {
        let raw: FirestoreDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/weddings/w",
            "fields": {
                "weddingTheme": { "stringValue": "Boho" },
                "updatedAt": { "integerValue": "1718000000000" },
                "guests": { "arrayValue": {} }
            },
            "updateTime": "2025-01-01T00:00:00.000000Z"
        }))
        .unwrap();

        let (doc, update_time) = parse_document(raw).unwrap();
        assert_eq!(doc.wedding_theme, "Boho");
        assert_eq!(doc.wedding_date, "2025-06-21");
        assert_eq!(doc.updated_at, 1_718_000_000_000);
        assert_eq!(doc.tasks.len(), 2);
        assert_eq!(update_time, "2025-01-01T00:00:00.000000Z");
    }
}
