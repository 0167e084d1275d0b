use anyhow::Result;
use log::debug;

use crate::mailbox::{MessageMetadata, MessageSource};

/// Largest page requested from the mailbox in a single listing call
pub const MAX_PAGE_SIZE: usize = 100;

/// Walk the messages matching `query`, fetching the requested headers for
/// each one and handing them to `visit` in listing order.
///
/// At most `max_results` messages are examined. The walk also ends on an
/// empty page or when the mailbox stops returning a continuation token.
/// Returns the number of messages examined.
pub async fn walk_messages<S, F>(
    source: &S,
    query: &str,
    max_results: usize,
    header_names: &[&str],
    mut visit: F,
) -> Result<usize>
where
    S: MessageSource + ?Sized,
    F: FnMut(MessageMetadata),
{
    let mut examined = 0;
    let mut page_token: Option<String> = None;

    while examined < max_results {
        let page_size = MAX_PAGE_SIZE.min(max_results - examined);

        debug!(
            "Listing page (query: '{}', size: {}, token: {:?})",
            query, page_size, page_token
        );

        let page = source
            .list_messages(query, page_size as u32, page_token.as_deref())
            .await?;

        if page.ids.is_empty() {
            debug!("Empty page, stopping after {} message(s)", examined);
            break;
        }

        for id in page.ids {
            let headers = source.get_message_metadata(&id, header_names).await?;
            visit(MessageMetadata { id, headers });

            examined += 1;
            if examined >= max_results {
                break;
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    debug!("Walk finished: {} message(s) examined", examined);

    Ok(examined)
}
