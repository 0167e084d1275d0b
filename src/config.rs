use anyhow::Result;
use serde::Deserialize;

use crate::subscriptions::DEFAULT_QUERY;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gmail: GmailConfig,
    pub subscription_query: String,
    pub unsubscribe_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GmailConfig {
    pub credentials_path: String,
    pub token_cache_path: String,
}

const REQUIRED_VARS: [&str; 1] = ["GMAIL_CREDENTIALS_PATH"];

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source (the process
    /// environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::check_required_vars(&lookup)?;

        let credentials_path = lookup("GMAIL_CREDENTIALS_PATH").unwrap_or_default();

        Ok(Config {
            gmail: GmailConfig {
                credentials_path,
                token_cache_path: lookup("GMAIL_TOKEN_CACHE_PATH")
                    .unwrap_or_else(|| "./gmail-token-cache.json".to_string()),
            },
            subscription_query: lookup("SUBSCRIPTION_QUERY")
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            unsubscribe_timeout_secs: lookup("UNSUBSCRIBE_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(15),
        })
    }

    fn check_required_vars<F>(lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing_vars: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|var| lookup(*var).is_none())
            .collect();

        if !missing_vars.is_empty() {
            anyhow::bail!(
                "Missing environment variables: {}\n\
                 \n\
                 💡 Solutions:\n\
                 1. Create a .env file with your credentials:\n\
                    GMAIL_CREDENTIALS_PATH=/path/to/client_credentials.json\n\
                    GMAIL_TOKEN_CACHE_PATH=./gmail-token-cache.json\n\
                 \n\
                 2. Or export the variables manually:\n\
                    export GMAIL_CREDENTIALS_PATH=/path/to/client_credentials.json\n\
                    gmail-unsubscribe list",
                missing_vars.join(", ")
            );
        }

        Ok(())
    }
}
