use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use gmail_unsubscribe::config::Config;
use gmail_unsubscribe::gmail_client::GmailClient;
use gmail_unsubscribe::report;
use gmail_unsubscribe::search::search_emails;
use gmail_unsubscribe::subscriptions::list_subscriptions_matching;
use gmail_unsubscribe::unsubscribe::{UnsubscribeConfirmer, UnsubscribeUrl};
use gmail_unsubscribe::UnsubscribeError;

#[derive(Parser)]
#[command(name = "gmail-unsubscribe")]
#[command(about = "Find newsletter subscriptions in Gmail and unsubscribe from them")]
#[command(version = "0.1.0")]
struct Args {
    /// Check the configuration without connecting
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List senders offering a List-Unsubscribe header, busiest first
    List {
        /// Maximum number of emails to examine
        #[arg(short = 'n', long, default_value_t = 100)]
        max_results: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Search emails with Gmail query syntax
    Search {
        query: String,

        /// Maximum number of emails to return
        #[arg(short = 'n', long, default_value_t = 20)]
        max_results: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Visit unsubscribe links and report whether each one was confirmed
    Unsubscribe {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load the .env file if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::init();

    let config = Config::new()?;

    if args.check_config {
        println!("✅ Configuration valid!");
        println!("🔑 Credentials: {}", config.gmail.credentials_path);
        println!("💾 Token cache: {}", config.gmail.token_cache_path);
        println!("🔎 Subscription query: {}", config.subscription_query);
        println!("⏱️  Unsubscribe timeout: {}s", config.unsubscribe_timeout_secs);
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("No command given, see --help");
    };

    let result = match command {
        Command::List { max_results, json } => run_list(&config, max_results, json).await,
        Command::Search { query, max_results, json } => run_search(&config, &query, max_results, json).await,
        Command::Unsubscribe { urls } => run_unsubscribe(&config, urls).await,
    };

    if let Err(e) = &result {
        error!("❌ {:#}", e);
    }

    result
}

async fn run_list(config: &Config, max_results: usize, json: bool) -> Result<()> {
    let gmail = GmailClient::new(&config.gmail)
        .await
        .context("Unable to connect to Gmail API")?;

    let subscriptions = list_subscriptions_matching(&gmail, &config.subscription_query, max_results).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&subscriptions)?);
    } else {
        println!("{}", report::render_subscriptions(&subscriptions));
    }

    Ok(())
}

async fn run_search(config: &Config, query: &str, max_results: usize, json: bool) -> Result<()> {
    let gmail = GmailClient::new(&config.gmail)
        .await
        .context("Unable to connect to Gmail API")?;

    let results = search_emails(&gmail, query, max_results).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{}", report::render_search_results(&results));
    }

    Ok(())
}

async fn run_unsubscribe(config: &Config, urls: Vec<String>) -> Result<()> {
    let confirmer = UnsubscribeConfirmer::with_timeout(Duration::from_secs(config.unsubscribe_timeout_secs))?;

    info!("Confirming {} unsubscribe link(s)", urls.len());

    let attempts = urls.iter().map(|url| {
        let confirmer = confirmer.clone();
        async move {
            let result: Result<bool, UnsubscribeError> = match UnsubscribeUrl::parse(url) {
                Ok(parsed) => Ok(confirmer.confirm(&parsed).await),
                Err(e) => Err(e),
            };
            (url, result)
        }
    });

    for (url, result) in futures::future::join_all(attempts).await {
        println!("{}", report::render_unsubscribe_result(url, &result));
    }

    Ok(())
}
