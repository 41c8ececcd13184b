//! Text and JSON rendering of command results.

use agora_core::AgoraError;
use agora_core::channel::{ChannelInfo, ChannelSummary, History, Message, NewMessages};
use chrono::{Local, TimeZone};
use serde_json::{Value, json};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// `[YYYY-MM-DD HH:MM:SS] agent: text` in local time.
pub fn message_line(message: &Message) -> String {
    message_line_in(message, &Local)
}

fn message_line_in<Tz>(message: &Message, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "[{}] {}: {}",
        message.timestamp.with_timezone(tz).format("%Y-%m-%d %H:%M:%S"),
        message.agent,
        message.text
    )
}

fn lines(messages: &[Message]) -> String {
    messages.iter().map(message_line).collect::<Vec<_>>().join("\n")
}

pub fn sent(format: OutputFormat, channel: &str, index: usize) -> String {
    match format {
        OutputFormat::Json => json!({ "success": true, "message_index": index }).to_string(),
        OutputFormat::Text => format!("Sent to {channel} (message #{index})"),
    }
}

pub fn new_messages(format: OutputFormat, channel: &str, read: &NewMessages) -> String {
    match format {
        OutputFormat::Json => json!({
            "messages": read.messages,
            "total": read.total,
            "new_messages": read.new_count,
            "skipped": read.skipped_count,
            "mode": "new",
        })
        .to_string(),
        OutputFormat::Text => {
            let mut out = Vec::new();
            if read.skipped_count > 0 {
                out.push(format!(
                    "({} older unread messages skipped)",
                    read.skipped_count
                ));
            }
            if read.messages.is_empty() {
                out.push(format!("No new messages in {channel}"));
            } else {
                out.push(lines(&read.messages));
            }
            out.join("\n")
        }
    }
}

pub fn history(format: OutputFormat, channel: &str, read: &History) -> String {
    match format {
        OutputFormat::Json => json!({
            "messages": read.messages,
            "total": read.total,
            "returned": read.returned_count,
            "mode": "history",
        })
        .to_string(),
        OutputFormat::Text if read.messages.is_empty() => format!("No messages in {channel}"),
        OutputFormat::Text => format!(
            "{}\n({} of {} messages)",
            lines(&read.messages),
            read.returned_count,
            read.total
        ),
    }
}

pub fn channels(format: OutputFormat, channels: &[ChannelSummary]) -> String {
    match format {
        OutputFormat::Json => json!({ "channels": channels }).to_string(),
        OutputFormat::Text if channels.is_empty() => "No channels".to_string(),
        OutputFormat::Text => channels
            .iter()
            .map(|c| format!("{}\t{}", c.name, c.message_count))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn info(format: OutputFormat, channel: &str, info: Option<&ChannelInfo>) -> String {
    match (format, info) {
        (OutputFormat::Json, Some(info)) => json!({
            "channel": info.name,
            "exists": true,
            "total": info.total,
            "recent": info.recent,
        })
        .to_string(),
        (OutputFormat::Json, None) => json!({ "channel": channel, "exists": false }).to_string(),
        (OutputFormat::Text, Some(info)) if info.recent.is_empty() => {
            format!("{}: 0 messages", info.name)
        }
        (OutputFormat::Text, Some(info)) => format!(
            "{}: {} messages\n{}",
            info.name,
            info.total,
            lines(&info.recent)
        ),
        (OutputFormat::Text, None) => format!("Channel {channel} does not exist"),
    }
}

pub fn error_body(err: &AgoraError) -> Value {
    match err {
        AgoraError::NotCaughtUp {
            unread_count, hint, ..
        } => json!({
            "error": err.to_string(),
            "unread_count": unread_count,
            "hint": hint,
        }),
        _ => json!({ "error": err.to_string() }),
    }
}

pub fn error_text(err: &AgoraError) -> String {
    match err {
        AgoraError::NotCaughtUp {
            channel,
            agent,
            unread_count,
            ..
        } => format!(
            "Error: {err}\n{unread_count} unread message(s) in {channel}. \
             Run: agora read --channel {channel} --agent {agent}"
        ),
        _ => format!("Error: {err}"),
    }
}

/// JSON errors go to stdout next to regular JSON output; text errors to stderr.
pub fn print_error(format: OutputFormat, err: &AgoraError) {
    match format {
        OutputFormat::Json => println!("{}", error_body(err)),
        OutputFormat::Text => eprintln!("{}", error_text(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn msg(agent: &str, text: &str) -> Message {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        Message::new(agent, text, ts)
    }

    #[test]
    fn test_message_line_format() {
        assert_eq!(
            message_line_in(&msg("bob", "hello team"), &Utc),
            "[2025-03-04 05:06:07] bob: hello team"
        );
        assert!(message_line(&msg("bob", "hi")).ends_with("] bob: hi"));
    }

    #[test]
    fn test_sent_json() {
        let value: Value = serde_json::from_str(&sent(OutputFormat::Json, "proj", 3)).unwrap();
        assert_eq!(value, json!({ "success": true, "message_index": 3 }));
    }

    #[test]
    fn test_new_messages_json_shape() {
        let read = NewMessages {
            messages: vec![msg("bob", "hi")],
            total: 31,
            new_count: 1,
            skipped_count: 0,
        };
        let value: Value =
            serde_json::from_str(&new_messages(OutputFormat::Json, "proj", &read)).unwrap();
        assert_eq!(value["mode"], "new");
        assert_eq!(value["total"], 31);
        assert_eq!(value["new_messages"], 1);
        assert_eq!(value["skipped"], 0);
        assert_eq!(value["messages"][0]["agent"], "bob");
        assert_eq!(value["messages"][0]["time"], "2025-03-04T05:06:07Z");
    }

    #[test]
    fn test_new_messages_text_reports_skips() {
        let read = NewMessages {
            messages: vec![msg("bob", "latest")],
            total: 50,
            new_count: 1,
            skipped_count: 30,
        };
        let text = new_messages(OutputFormat::Text, "proj", &read);
        assert!(text.starts_with("(30 older unread messages skipped)\n"));
        assert!(text.ends_with("bob: latest"));

        let empty = new_messages(OutputFormat::Text, "proj", &NewMessages::default());
        assert_eq!(empty, "No new messages in proj");
    }

    #[test]
    fn test_history_json_shape() {
        let read = History {
            messages: vec![msg("bob", "a"), msg("alice", "b")],
            total: 2,
            returned_count: 2,
        };
        let value: Value =
            serde_json::from_str(&history(OutputFormat::Json, "proj", &read)).unwrap();
        assert_eq!(value["mode"], "history");
        assert_eq!(value["returned"], 2);
        assert_eq!(value["messages"][1]["text"], "b");
    }

    #[test]
    fn test_channels_rendering() {
        let list = vec![
            ChannelSummary {
                name: "alpha".into(),
                message_count: 0,
            },
            ChannelSummary {
                name: "proj".into(),
                message_count: 12,
            },
        ];
        let value: Value = serde_json::from_str(&channels(OutputFormat::Json, &list)).unwrap();
        assert_eq!(
            value,
            json!({ "channels": [
                { "name": "alpha", "message_count": 0 },
                { "name": "proj", "message_count": 12 },
            ]})
        );
        assert_eq!(channels(OutputFormat::Text, &list), "alpha\t0\nproj\t12");
        assert_eq!(channels(OutputFormat::Text, &[]), "No channels");
    }

    #[test]
    fn test_info_missing_channel() {
        assert_eq!(
            info(OutputFormat::Text, "ghost", None),
            "Channel ghost does not exist"
        );
        let value: Value = serde_json::from_str(&info(OutputFormat::Json, "ghost", None)).unwrap();
        assert_eq!(value["exists"], false);
    }

    #[test]
    fn test_error_bodies() {
        let err = AgoraError::not_caught_up("proj", "alice", 2);
        assert_eq!(
            error_body(&err),
            json!({
                "error": "You have unread messages. Please check messages first.",
                "unread_count": 2,
                "hint": "GET /api/messages?channel=proj&agent=alice",
            })
        );
        assert!(error_text(&err).contains("agora read --channel proj --agent alice"));

        let err = AgoraError::validation("Missing channel parameter");
        assert_eq!(error_body(&err), json!({ "error": "Missing channel parameter" }));
        assert_eq!(error_text(&err), "Error: Missing channel parameter");
    }
}
