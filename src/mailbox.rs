use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::headers::HeaderSet;

/// One page of message ids returned by a listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Message metadata handed to walker callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMetadata {
    pub id: String,
    pub headers: HeaderSet,
}

/// Mailbox capability the scanners are driven by.
///
/// `GmailClient` is the production implementation; tests provide in-memory
/// mailboxes. Errors are returned as-is to the caller, nothing is retried.
pub trait MessageSource: Send + Sync {
    /// List message ids matching `query`, at most `page_size` of them
    fn list_messages<'a>(
        &'a self,
        query: &'a str,
        page_size: u32,
        page_token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<MessagePage>> + Send + 'a>>;

    /// Fetch only the headers named in `header_names` for one message
    fn get_message_metadata<'a>(
        &'a self,
        message_id: &'a str,
        header_names: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = Result<HeaderSet>> + Send + 'a>>;
}
