use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const FROM: &str = "From";
pub const SUBJECT: &str = "Subject";
pub const DATE: &str = "Date";
pub const LIST_UNSUBSCRIBE: &str = "List-Unsubscribe";

/// A single header as delivered by the mailbox metadata endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Ordered, immutable set of message headers.
///
/// Names are compared ASCII case-insensitively and the first match wins,
/// so duplicated headers keep the value the server listed first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<Header>,
}

impl HeaderSet {
    pub fn new(headers: Vec<Header>) -> Self {
        HeaderSet { headers }
    }

    /// Value of the first header named `name` (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        HeaderSet {
            headers: iter
                .into_iter()
                .map(|(name, value)| Header {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }
}

/// Sender display name and address taken from the `From` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderIdentity {
    pub display_name: String,
    pub email_address: String,
}

impl SenderIdentity {
    /// Extract the sender from the first `From` header.
    ///
    /// `"Name" <addr>` yields the unquoted name and the bare address. Any
    /// other shape uses the trimmed raw value for both fields, and a missing
    /// header yields empty strings.
    pub fn from_headers(headers: &HeaderSet) -> Self {
        match headers.get(FROM) {
            Some(value) => Self::parse(value),
            None => SenderIdentity::default(),
        }
    }

    pub fn parse(from: &str) -> Self {
        if let Some(caps) = from_pattern().captures(from) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let address = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

            return SenderIdentity {
                display_name: strip_quotes(name.trim()).to_string(),
                email_address: address.trim().to_string(),
            };
        }

        let raw = from.trim();
        SenderIdentity {
            display_name: raw.to_string(),
            email_address: raw.to_string(),
        }
    }

    /// Key used to group messages from the same sender
    pub fn key(&self) -> String {
        self.email_address.to_lowercase()
    }
}

fn from_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Greedy name so "a <b> <c@d>" resolves to the last bracketed address
    PATTERN.get_or_init(|| Regex::new(r"^(.+)<(.+?)>\s*$").expect("valid From pattern"))
}

fn strip_quotes(name: &str) -> &str {
    let name = name.strip_prefix('"').unwrap_or(name);
    name.strip_suffix('"').unwrap_or(name)
}

/// Unsubscribe targets advertised by one `List-Unsubscribe` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsubscribeSignal {
    pub http_links: Vec<String>,
    pub mailto_links: Vec<String>,
}

impl UnsubscribeSignal {
    /// Collect every `<...>` token, keeping HTTP(S) and mailto targets in
    /// order of appearance. Tokens with any other scheme are dropped.
    pub fn parse(value: &str) -> Self {
        let mut signal = UnsubscribeSignal::default();

        for caps in token_pattern().captures_iter(value) {
            let target = &caps[1];
            if target.starts_with("http://") || target.starts_with("https://") {
                signal.http_links.push(target.to_string());
            } else if target.starts_with("mailto:") {
                signal.mailto_links.push(target.to_string());
            }
        }

        signal
    }

    pub fn is_empty(&self) -> bool {
        self.http_links.is_empty() && self.mailto_links.is_empty()
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<([^>]+)>").expect("valid List-Unsubscribe pattern"))
}
