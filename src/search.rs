use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use log::info;
use serde::Serialize;

use crate::headers::{HeaderSet, SenderIdentity, DATE, FROM, LIST_UNSUBSCRIBE, SUBJECT};
use crate::mailbox::MessageSource;
use crate::pagination::walk_messages;

pub const SEARCH_HEADERS: &[&str] = &[FROM, SUBJECT, DATE, LIST_UNSUBSCRIBE];

/// Metadata for one message matched by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub date: String,
    pub has_unsubscribe: bool,
}

impl SearchResult {
    pub fn from_headers(id: String, headers: &HeaderSet) -> Self {
        let sender = SenderIdentity::from_headers(headers);

        SearchResult {
            id,
            from_name: sender.display_name,
            from_email: sender.email_address,
            subject: headers.get(SUBJECT).unwrap_or_default().to_string(),
            date: headers.get(DATE).unwrap_or_default().to_string(),
            has_unsubscribe: headers.contains(LIST_UNSUBSCRIBE),
        }
    }

    /// `Date` header parsed as RFC 2822, if it is well formed
    pub fn received_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc2822(self.date.trim()).ok()
    }
}

/// List up to `max_results` messages matching a Gmail search query
pub async fn search_emails<S>(source: &S, query: &str, max_results: usize) -> Result<Vec<SearchResult>>
where
    S: MessageSource + ?Sized,
{
    info!("Searching emails (query: '{}', max: {})", query, max_results);

    let mut results = Vec::new();

    walk_messages(source, query, max_results, SEARCH_HEADERS, |message| {
        results.push(SearchResult::from_headers(message.id, &message.headers));
    })
    .await?;

    info!("Search returned {} email(s)", results.len());

    Ok(results)
}
