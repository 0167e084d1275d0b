use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{redirect, Client};
use scraper::Html;

use crate::error::UnsubscribeError;

/// Phrases landing pages use to acknowledge an unsubscribe
pub const CONFIRMATION_KEYWORDS: &[&str] = &[
    "unsubscribed",
    "removed",
    "successfully unsubscribed",
    "you have been unsubscribed",
    "has been removed",
    "opted out",
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const MAX_REDIRECTS: usize = 10;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// An unsubscribe target known to use the http or https scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribeUrl(String);

impl UnsubscribeUrl {
    pub fn parse(url: &str) -> Result<Self, UnsubscribeError> {
        let lower = url.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(UnsubscribeUrl(url.to_string()))
        } else {
            Err(UnsubscribeError::InvalidScheme(url.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnsubscribeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verdict for a landing page that was fetched and parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Confirmed { keyword: &'static str },
    NotConfirmed,
}

impl UnsubscribeOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, UnsubscribeOutcome::Confirmed { .. })
    }
}

/// Visits unsubscribe links and decides whether the landing page confirms
/// the request.
///
/// Cloning shares the underlying connection pool, so one confirmer can serve
/// concurrent attempts.
#[derive(Debug, Clone)]
pub struct UnsubscribeConfirmer {
    client: Client,
}

impl UnsubscribeConfirmer {
    pub fn new() -> Result<Self, UnsubscribeError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, UnsubscribeError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(UnsubscribeError::Client)?;

        Ok(UnsubscribeConfirmer { client })
    }

    /// Fetch the page and run keyword detection on it.
    ///
    /// The status code is ignored: error pages saying "already removed" count.
    pub async fn attempt(&self, url: &UnsubscribeUrl) -> Result<UnsubscribeOutcome, UnsubscribeError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(UnsubscribeError::Transport)?;

        debug!("Landing page {} answered {}", response.url(), response.status());

        let body = response.text().await.map_err(UnsubscribeError::Body)?;

        Ok(detect_confirmation(&body))
    }

    /// Visit `url` and report whether the unsubscribe was confirmed.
    /// Any failure is logged and reported as `false`.
    pub async fn confirm(&self, url: &UnsubscribeUrl) -> bool {
        info!("Visiting unsubscribe link {}", url);

        match self.attempt(url).await {
            Ok(UnsubscribeOutcome::Confirmed { keyword }) => {
                info!("✅ Unsubscribe confirmed for {} (matched '{}')", url, keyword);
                true
            }
            Ok(UnsubscribeOutcome::NotConfirmed) => {
                info!("No confirmation found on landing page for {}", url);
                false
            }
            Err(e) => {
                warn!("⚠️  Unsubscribe attempt for {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Look for a confirmation phrase in the page's visible text or raw markup
pub fn detect_confirmation(body: &str) -> UnsubscribeOutcome {
    let document = Html::parse_document(body);
    let visible_text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let raw_text = body.to_lowercase();

    CONFIRMATION_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| visible_text.contains(keyword) || raw_text.contains(keyword))
        .map(|keyword| UnsubscribeOutcome::Confirmed { keyword })
        .unwrap_or(UnsubscribeOutcome::NotConfirmed)
}

/// Validate `url` and visit it with a default confirmer.
///
/// Only a non-http(s) URL is an error; every failure after validation is
/// reported as `Ok(false)`.
pub async fn confirm_unsubscribe(url: &str) -> Result<bool, UnsubscribeError> {
    let url = UnsubscribeUrl::parse(url)?;

    let confirmer = match UnsubscribeConfirmer::new() {
        Ok(confirmer) => confirmer,
        Err(e) => {
            warn!("⚠️  {}", e);
            return Ok(false);
        }
    };

    Ok(confirmer.confirm(&url).await)
}
