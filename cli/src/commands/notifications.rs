//! NOTIFICATIONS command - Show the notification log, optionally marking it read.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use soldash_core::{NotificationEvent, NotificationKind};
use uuid::Uuid;

use super::{HumanReadable, api_url, format_timestamp, make_request, output, print_title};

/// Arguments for the notifications command.
#[derive(Args)]
pub struct NotificationsArgs {
    /// Mark notifications read after listing them
    #[arg(long)]
    pub mark_read: bool,

    /// With --mark-read, mark only this notification
    #[arg(long, requires = "mark_read")]
    pub id: Option<Uuid>,
}

/// The notification log, newest first.
#[derive(Debug, Deserialize, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationEvent>,
    pub unread_count: usize,
    pub refreshing: bool,
}

#[derive(Debug, Deserialize, Serialize)]
struct MarkReadResponse {
    unread_count: usize,
}

/// One notification line.
pub(crate) fn print_event(event: &NotificationEvent) {
    let icon = match event.kind {
        NotificationKind::Info => "ℹ".blue(),
        NotificationKind::Success => "✓".green(),
        NotificationKind::Error => "✗".red(),
    };
    let message = if event.read {
        event.message.dimmed()
    } else {
        event.message.bold()
    };
    println!(
        "  {} {}  {}",
        icon,
        message,
        format_timestamp(&event.created_at).dimmed()
    );
}

impl HumanReadable for NotificationsResponse {
    fn print_human(&self) {
        print_title("Notifications", 70);

        if self.notifications.is_empty() {
            println!("  {}", "(No notifications)".dimmed());
            return;
        }

        for event in &self.notifications {
            print_event(event);
        }
        println!();
        println!("  {} {}", "Unread:".cyan(), self.unread_count);
        if self.refreshing {
            println!("  {}", "A refresh is in progress".dimmed());
        }
    }
}

/// Execute the notifications command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: NotificationsArgs,
) -> Result<()> {
    let url = api_url(base_url, "/notifications");
    let mut response: NotificationsResponse = make_request(client.get(&url)).await?;

    if args.mark_read {
        let mut request = client.post(api_url(base_url, "/notifications/read"));
        if let Some(id) = args.id {
            request = request.query(&[("id", id.to_string())]);
        }
        let marked: MarkReadResponse = make_request(request).await?;
        response.unread_count = marked.unread_count;
    }

    output(&response, human)
}
