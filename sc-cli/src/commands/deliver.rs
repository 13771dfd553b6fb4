//! Deliver command: feed one push message through a delivery handler.

use std::path::PathBuf;

use clap::Args;
use console::style;

use sc_core::config::ConfigHandle;
use sc_core::error::{ScError, ScResult};
use sc_services::{DeliveryHandler, DeliveryKind, InboundMessage};
use crate::OutputFormat;

/// App state the message is delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    /// The app is active.
    Foreground,
    /// The app is in the background.
    Background,
    /// The user tapped the notification, app resumed from the background.
    Opened,
    /// The user tapped the notification, app launched from terminated.
    Initial,
}

impl From<KindArg> for DeliveryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Foreground => DeliveryKind::Foreground,
            KindArg::Background => DeliveryKind::Background,
            KindArg::Opened => DeliveryKind::OpenedFromBackground,
            KindArg::Initial => DeliveryKind::OpenedFromTerminated,
        }
    }
}

#[derive(Args)]
pub struct DeliverArgs {
    /// Delivery kind.
    #[arg(short, long, default_value = "foreground")]
    pub kind: KindArg,
    /// Message id. Generated from the current time when omitted.
    #[arg(long)]
    pub id: Option<String>,
    /// Notification title.
    #[arg(short, long)]
    pub title: Option<String>,
    /// Notification body.
    #[arg(short, long)]
    pub body: Option<String>,
    /// Data payload entry (repeatable).
    #[arg(short, long = "data", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub data: Vec<(String, String)>,
    /// Deep link, stored under the configured deep-link data key.
    #[arg(short, long)]
    pub link: Option<String>,
    /// Read the whole remote message from a JSON file instead.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["id", "title", "body", "data", "link"])]
    pub json: Option<PathBuf>,
    /// Simulate a launch that was not caused by a notification.
    #[arg(long, conflicts_with = "json")]
    pub no_message: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Build the remote message from the command-line flags.
fn build_message(args: &DeliverArgs, deep_link_key: &str) -> ScResult<InboundMessage> {
    if let Some(path) = &args.json {
        let contents = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&contents)?;
        return InboundMessage::from_json(&value);
    }

    let mut message = InboundMessage::new(args.id.clone());
    if args.title.is_some() || args.body.is_some() {
        message = message.with_notification(args.title.clone(), args.body.clone());
    }
    for (key, value) in &args.data {
        message = message.with_data(key.clone(), value.clone());
    }
    if let Some(link) = &args.link {
        message = message.with_data(deep_link_key, link.clone());
    }
    Ok(message)
}

pub async fn run(
    config: ConfigHandle,
    args: DeliverArgs,
    ephemeral: bool,
    format: OutputFormat,
) -> ScResult<()> {
    if args.no_message && args.kind != KindArg::Initial {
        return Err(ScError::InvalidPayload(
            "--no-message only applies to --kind initial".into(),
        ));
    }

    let center = super::start_center(&config, ephemeral, format).await?;

    if args.no_message {
        center.on_initial_notification(None).await;
        match format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Text => println!("App launched without a notification."),
        }
        return Ok(());
    }

    let deep_link_key = config.read().await.notifications.deep_link_key.clone();
    let message = build_message(&args, &deep_link_key)?;
    let kind = DeliveryKind::from(args.kind);

    let Some(record) = center.deliver(kind, message).await else {
        return Err(ScError::Storage(format!("{kind} delivery was not recorded")));
    };
    let unread = center.unread_count().await;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "kind": kind,
                "record": record,
                "unread_count": unread,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("{} {} delivery", style("Stored").green().bold(), kind);
            super::print_record(&record);
            println!("Unread: {}", style(unread).bold());
        }
    }

    Ok(())
}
