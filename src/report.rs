//! Text and JSON rendering for the command line.

use serde_json::json;

use crate::error::UnsubscribeError;
use crate::search::SearchResult;
use crate::subscriptions::Subscription;

pub const NO_SUBSCRIPTIONS: &str = "No subscriptions found.";
pub const NO_EMAILS: &str = "No emails found.";

const SUBJECT_EXAMPLES_SHOWN: usize = 3;

pub fn render_subscriptions(subscriptions: &[Subscription]) -> String {
    if subscriptions.is_empty() {
        return NO_SUBSCRIPTIONS.to_string();
    }

    let mut lines = vec!["# Detected subscriptions:".to_string(), String::new()];

    for (index, sub) in subscriptions.iter().enumerate() {
        lines.push(format!("{}. {} <{}>", index + 1, sub.sender_name, sub.sender_email));
        lines.push(format!("   - Emails received: {}", sub.email_count));

        if !sub.subject_examples.is_empty() {
            let examples: Vec<&str> = sub
                .subject_examples
                .iter()
                .take(SUBJECT_EXAMPLES_SHOWN)
                .map(String::as_str)
                .collect();
            lines.push(format!("   - Subject examples: {}", examples.join(", ")));
        }

        for link in &sub.unsubscribe_links {
            lines.push(format!("   - Unsubscribe (automatic): {}", link));
        }

        for mailto in &sub.unsubscribe_mailto {
            lines.push(format!("   - Unsubscribe by email: {}", mailto));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn render_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_EMAILS.to_string();
    }

    let mut lines = vec!["# Search results:".to_string(), String::new()];

    for result in results {
        let date = result
            .received_at()
            .map(|date| date.format("%Y-%m-%d %H:%M %z").to_string())
            .unwrap_or_else(|| result.date.clone());

        lines.push(format!("- {} <{}>", result.from_name, result.from_email));
        lines.push(format!("   - Subject: {}", result.subject));
        lines.push(format!("   - Date: {}", date));
        lines.push(format!(
            "   - Unsubscribe option: {}",
            if result.has_unsubscribe { "yes" } else { "no" }
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// One JSON line per unsubscribe attempt
pub fn render_unsubscribe_result(url: &str, result: &Result<bool, UnsubscribeError>) -> String {
    let value = match result {
        Ok(ok) => json!({ "ok": ok, "url": url }),
        Err(e) => json!({ "ok": false, "error": e.to_string() }),
    };

    value.to_string()
}
