//! Google Calendar event insertion.

use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;

use wedplan_core::calendar::{CalendarApi, CalendarEvent};
use wedplan_core::{WeddingError, WeddingResult};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Calendar client authorized with a short-lived OAuth access token.
pub struct GoogleCalendar {
    http: reqwest::Client,
    events_url: Url,
    access_token: String,
}

impl GoogleCalendar {
    pub fn new(calendar_id: &str, access_token: &str) -> Result<Self> {
        Ok(GoogleCalendar {
            http: reqwest::Client::new(),
            events_url: events_url(calendar_id)?,
            access_token: access_token.to_string(),
        })
    }

    /// POST /calendars/:id/events
    async fn create(&self, event: &CalendarEvent) -> Result<()> {
        let response = self
            .http
            .post(self.events_url.clone())
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await
            .context("Failed to reach Google Calendar")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Google Calendar returned {status}: {error_text}");
        }

        Ok(())
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendar {
    async fn insert_event(&self, event: &CalendarEvent) -> WeddingResult<()> {
        self.create(event)
            .await
            .map_err(|e| WeddingError::Remote(format!("{e:#}")))
    }
}

fn events_url(calendar_id: &str) -> Result<Url> {
    let mut url = Url::parse(CALENDAR_API).context("Invalid Calendar base URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Calendar base URL cannot have path segments"))?
        .extend(["calendars", calendar_id, "events"]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_calendar_url() {
        assert_eq!(
            events_url("primary").unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
    }

    #[test]
    fn test_calendar_id_is_escaped() {
        let url = events_url("boda#casa@group.calendar.google.com").unwrap();
        assert!(url.path().contains("boda%23casa@group.calendar.google.com"));
    }
}
