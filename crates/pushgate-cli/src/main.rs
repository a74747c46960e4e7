mod cli;
mod config;
mod history;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pushgate_core::{NotificationFields, parse_badge, parse_extra};
use pushgate_dispatch::{BatchDispatcher, GatewayStore, NotificationStore};

use cli::Cli;
use history::JsonlNotificationStore;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    let config = config::load(&args.config)?;
    let store = config::build_store(&config)?;

    // All validation happens here, before any network activity.
    let notification = NotificationFields {
        message: args.message.clone(),
        badge: parse_badge(args.badge.as_deref())?,
        sound: args.sound.clone(),
        extra: parse_extra(args.extra.as_deref())?,
        persist: args.persistence(),
    }
    .build()?;
    notification
        .validate_length(args.max_payload_bytes)
        .context("notification exceeds the maximum payload length, try making your message shorter")?;

    let gateway = store.lookup(args.service).await?;
    info!(gateway = gateway.id(), name = gateway.name(), "gateway resolved");

    let dispatcher = BatchDispatcher::with_concurrency(args.concurrency)?;
    let report = dispatcher
        .dispatch(&notification, gateway.as_ref(), args.batch_size)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            println!(
                "batch {}: {} devices, {}",
                outcome.batch_index, outcome.device_count, outcome.status
            );
            for error in &outcome.errors {
                match &error.token {
                    Some(token) => println!("  device {token}: {}", error.reason),
                    None => println!("  {}", error.reason),
                }
            }
        }
        println!(
            "{}/{} devices delivered across {} batches",
            report.devices_delivered,
            report.devices_attempted,
            report.outcomes.len()
        );
        if report.cancelled {
            println!("dispatch was cancelled before all batches were sent");
        }
    }

    if notification.persist.resolve(config.default_persist) && report.any_delivered() {
        match &config.history_path {
            Some(path) => {
                JsonlNotificationStore::new(path)
                    .persist(&notification)
                    .await?;
                info!(path = %path.display(), "notification recorded in history");
            }
            None => warn!("persist requested but no history_path configured"),
        }
    }

    if report.all_failed() {
        bail!("all {} batches failed to deliver", report.outcomes.len());
    }
    if report.batches_failed() > 0 || report.devices_delivered < report.devices_attempted {
        warn!(
            failed_batches = report.batches_failed(),
            "notification pushed with partial failures"
        );
    } else if !args.json {
        println!("Notification pushed successfully");
    }
    Ok(())
}
