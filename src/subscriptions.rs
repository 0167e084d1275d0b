use std::collections::HashMap;

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;

use crate::headers::{HeaderSet, SenderIdentity, UnsubscribeSignal, FROM, LIST_UNSUBSCRIBE, SUBJECT};
use crate::mailbox::MessageSource;
use crate::pagination::walk_messages;

/// Gmail query covering the tabs where bulk mail usually lands
pub const DEFAULT_QUERY: &str = "category:promotions OR category:updates";

/// Headers needed to build subscription records
pub const SUBSCRIPTION_HEADERS: &[&str] = &[FROM, SUBJECT, LIST_UNSUBSCRIBE];

/// All messages seen from one sender during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub sender_email: String,
    pub sender_name: String,
    pub subject_examples: Vec<String>,
    pub message_ids: Vec<String>,
    pub unsubscribe_links: Vec<String>,
    pub unsubscribe_mailto: Vec<String>,
    pub email_count: usize,
}

impl Subscription {
    fn new(sender: SenderIdentity) -> Self {
        Subscription {
            sender_email: sender.email_address,
            sender_name: sender.display_name,
            subject_examples: Vec::new(),
            message_ids: Vec::new(),
            unsubscribe_links: Vec::new(),
            unsubscribe_mailto: Vec::new(),
            email_count: 0,
        }
    }

    fn add_message(&mut self, message_id: &str, subject: &str, signal: UnsubscribeSignal) {
        self.subject_examples.push(subject.to_string());
        self.message_ids.push(message_id.to_string());
        self.unsubscribe_links.extend(signal.http_links);
        self.unsubscribe_mailto.extend(signal.mailto_links);
        self.email_count += 1;
    }

    pub fn has_http_link(&self) -> bool {
        !self.unsubscribe_links.is_empty()
    }
}

/// Groups messages carrying a `List-Unsubscribe` header by sender address
#[derive(Debug, Default)]
pub struct SubscriptionAggregator {
    index: HashMap<String, usize>,
    subscriptions: Vec<Subscription>,
}

impl SubscriptionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one message into the matching subscription.
    ///
    /// Returns `false` when the message has no usable `List-Unsubscribe`
    /// header and was skipped.
    pub fn record(&mut self, message_id: &str, headers: &HeaderSet) -> bool {
        let list_unsubscribe = match headers.get(LIST_UNSUBSCRIBE) {
            Some(value) if !value.is_empty() => value,
            _ => {
                debug!("Message {} has no List-Unsubscribe header, skipping", message_id);
                return false;
            }
        };

        let sender = SenderIdentity::from_headers(headers);
        let subject = headers.get(SUBJECT).unwrap_or_default();
        let signal = UnsubscribeSignal::parse(list_unsubscribe);

        let key = sender.key();
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                debug!("New subscription from {}", sender.email_address);
                self.subscriptions.push(Subscription::new(sender));
                self.index.insert(key, self.subscriptions.len() - 1);
                self.subscriptions.len() - 1
            }
        };

        self.subscriptions[position].add_message(message_id, subject, signal);
        true
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Subscriptions ordered by message count, busiest first. Senders with
    /// the same count stay in the order they were first seen.
    pub fn finish(self) -> Vec<Subscription> {
        let mut subscriptions = self.subscriptions;
        subscriptions.sort_by(|a, b| b.email_count.cmp(&a.email_count));
        subscriptions
    }
}

/// Scan the default promotional query for subscriptions
pub async fn list_subscriptions<S>(source: &S, max_results: usize) -> Result<Vec<Subscription>>
where
    S: MessageSource + ?Sized,
{
    list_subscriptions_matching(source, DEFAULT_QUERY, max_results).await
}

/// Scan up to `max_results` messages matching `query` for subscriptions.
///
/// Messages without a `List-Unsubscribe` header still use up the budget.
pub async fn list_subscriptions_matching<S>(
    source: &S,
    query: &str,
    max_results: usize,
) -> Result<Vec<Subscription>>
where
    S: MessageSource + ?Sized,
{
    info!("Scanning up to {} message(s) for subscriptions", max_results);

    let mut aggregator = SubscriptionAggregator::new();
    let mut retained = 0;

    let examined = walk_messages(source, query, max_results, SUBSCRIPTION_HEADERS, |message| {
        if aggregator.record(&message.id, &message.headers) {
            retained += 1;
        }
    })
    .await?;

    info!(
        "Found {} subscription(s) in {} message(s) ({} examined)",
        aggregator.len(),
        retained,
        examined
    );

    Ok(aggregator.finish())
}
