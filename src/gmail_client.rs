use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use google_gmail1::{hyper, hyper_rustls, oauth2, Gmail};
use log::{debug, info};

use crate::config::GmailConfig;
use crate::headers::{Header, HeaderSet};
use crate::mailbox::{MessagePage, MessageSource};

const USER_ID: &str = "me";

pub struct GmailClient {
    hub: Gmail<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
}

impl GmailClient {
    pub async fn new(config: &GmailConfig) -> Result<Self> {
        info!("Connecting to Gmail API via OAuth2");

        // Read OAuth2 client credentials from file
        let secret = oauth2::read_application_secret(&config.credentials_path)
            .await
            .context("Unable to read OAuth2 client credentials file")?;

        // Tokens are cached on disk so the browser flow only runs once
        let auth = oauth2::InstalledFlowAuthenticator::builder(
            secret,
            oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(&config.token_cache_path)
        .build()
        .await
        .context("Unable to create OAuth2 authenticator")?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();

        let client = hyper::Client::builder().build(connector);

        let hub = Gmail::new(client, auth);

        info!("✅ Gmail API connection established successfully");

        Ok(GmailClient { hub })
    }

    async fn fetch_page(&self, query: &str, page_size: u32, page_token: Option<&str>) -> Result<MessagePage> {
        debug!("messages.list q='{}' maxResults={} pageToken={:?}", query, page_size, page_token);

        let mut call = self
            .hub
            .users()
            .messages_list(USER_ID)
            .q(query)
            .max_results(page_size)
            .add_scope(google_gmail1::api::Scope::Modify);

        if let Some(token) = page_token {
            call = call.page_token(token);
        }

        let (_, response) = call.doit().await.context("Error listing messages")?;

        let ids: Vec<String> = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| msg.id)
            .collect();

        debug!("Page returned {} message(s)", ids.len());

        Ok(MessagePage {
            ids,
            next_page_token: response.next_page_token,
        })
    }

    /// Retrieve only the requested headers with the METADATA format
    async fn fetch_headers(&self, message_id: &str, header_names: &[&str]) -> Result<HeaderSet> {
        debug!("Retrieving metadata for message {}", message_id);

        let mut call = self
            .hub
            .users()
            .messages_get(USER_ID, message_id)
            .format("metadata")
            .add_scope(google_gmail1::api::Scope::Modify);

        for name in header_names {
            call = call.add_metadata_headers(name);
        }

        let (_, message) = call
            .doit()
            .await
            .with_context(|| format!("Unable to retrieve metadata for message {}", message_id))?;

        let headers = message
            .payload
            .and_then(|payload| payload.headers)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|header| match (header.name, header.value) {
                (Some(name), Some(value)) => Some(Header { name, value }),
                _ => None,
            })
            .collect();

        Ok(HeaderSet::new(headers))
    }
}

impl MessageSource for GmailClient {
    fn list_messages<'a>(
        &'a self,
        query: &'a str,
        page_size: u32,
        page_token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<MessagePage>> + Send + 'a>> {
        Box::pin(self.fetch_page(query, page_size, page_token))
    }

    fn get_message_metadata<'a>(
        &'a self,
        message_id: &'a str,
        header_names: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = Result<HeaderSet>> + Send + 'a>> {
        Box::pin(self.fetch_headers(message_id, header_names))
    }
}
