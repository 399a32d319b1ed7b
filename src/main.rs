//! blindlink CLI — shorten and resolve zero-knowledge short links.
//!
//! Usage:
//!   blindlink shorten <url>
//!   blindlink lookup <identifier>#<secret>
//!   blindlink shorten-plain <captcha-response> <url>
//!
//! Configuration (validated at startup):
//!   BLINDLINK_BASE_URL      storage service root (required)
//!   BLINDLINK_EXPIRY_DAYS   record lifetime override (optional)

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use tracing::info;

use blindlink::client::{LookupClient, ShortLink, ShortenerClient};
use blindlink::config::Config;
use blindlink::error::Error;
use blindlink::storage::{HttpStorage, StorageBackend};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blindlink=info".into()),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    let config = Config::from_env().context("invalid configuration")?;
    let storage: Arc<dyn StorageBackend> = Arc::new(HttpStorage::new(config.base_url.clone()));

    let outcome = match command.as_str() {
        "shorten" => {
            let url = args.next().context("usage: blindlink shorten <url>")?;
            shorten(storage, &config, &url).await
        }
        "lookup" => {
            let link = args.next().context("usage: blindlink lookup <identifier>#<secret>")?;
            lookup(storage, &link).await
        }
        "shorten-plain" => {
            let captcha = args
                .next()
                .context("usage: blindlink shorten-plain <captcha-response> <url>")?;
            let url = args
                .next()
                .context("usage: blindlink shorten-plain <captcha-response> <url>")?;
            shorten_plain(storage, &captcha, &url).await
        }
        other => {
            bail!("unknown command '{other}' (expected shorten | lookup | shorten-plain)");
        }
    };

    match outcome {
        Ok(()) => Ok(()),
        // 429 gets its own message; everything else is a plain failure.
        Err(e) => match e.downcast_ref::<Error>() {
            Some(err) if err.is_rate_limited() => {
                bail!("the service is rate limited right now; try again later")
            }
            _ => Err(e),
        },
    }
}

async fn shorten(storage: Arc<dyn StorageBackend>, config: &Config, url: &str) -> Result<()> {
    let mut client = ShortenerClient::new(storage);
    if let Some(days) = config.expiry_days {
        client.set_expiry(Utc::now() + Duration::days(days));
    }

    let link = client.shorten(url).await?;
    info!(identifier = %link.identifier(), expiry = %client.expiry(), "record created");
    println!("{}/{link}", config.base_url);
    Ok(())
}

async fn lookup(storage: Arc<dyn StorageBackend>, link: &str) -> Result<()> {
    // Accept either a bare "<id>#<secret>" or a full URL with one.
    let link = link.rsplit('/').next().unwrap_or(link);
    let link = ShortLink::parse(link)?;

    let client = LookupClient::from_link(storage, &link)?;
    match client.lookup().await? {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => bail!("no record for '{}' (expired or never created)", link.identifier()),
    }
}

async fn shorten_plain(
    storage: Arc<dyn StorageBackend>,
    captcha_response: &str,
    url: &str,
) -> Result<()> {
    let identifier = storage.create_plaintext(captcha_response, url).await?;
    println!("{identifier}");
    Ok(())
}
