// Library exports for gmail-unsubscribe crate
// This allows tests and the binary to use the modules

pub mod config;
pub mod error;
pub mod gmail_client;
pub mod headers;
pub mod mailbox;
pub mod pagination;
pub mod report;
pub mod search;
pub mod subscriptions;
pub mod unsubscribe;

pub use error::UnsubscribeError;
pub use headers::{HeaderSet, SenderIdentity, UnsubscribeSignal};
pub use mailbox::{MessageMetadata, MessagePage, MessageSource};
pub use search::{search_emails, SearchResult};
pub use subscriptions::{list_subscriptions, Subscription};
pub use unsubscribe::{confirm_unsubscribe, UnsubscribeConfirmer, UnsubscribeOutcome, UnsubscribeUrl};
