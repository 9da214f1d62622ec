//! CLI channel: stdin/stdout REPL for local testing.
//!
//! There are no attachments on a terminal, so `/photo` and `/document`
//! stand in for sending a picture of a document.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;
use crate::intake::{EventKind, KeyboardHint};

const CLI_USER: &str = "local-user";
const CLI_CONVERSATION: &str = "local";

/// Lines that simulate an attachment.
const ATTACHMENT_COMMANDS: [&str; 2] = ["/photo", "/document"];

/// A simple CLI channel that reads from stdin and writes to stdout.
#[derive(Default)]
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

/// Turn one input line into a message. Blank lines are skipped.
fn parse_line(line: &str) -> Option<IncomingMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or_default();
    let msg = if ATTACHMENT_COMMANDS
        .iter()
        .any(|cmd| head.eq_ignore_ascii_case(cmd))
    {
        let caption = parts.next().unwrap_or_default().trim();
        IncomingMessage::new("cli", CLI_USER, caption).with_kind(EventKind::Document)
    } else {
        IncomingMessage::new("cli", CLI_USER, line)
    };
    Some(msg.with_conversation(CLI_CONVERSATION))
}

fn keyboard_line(hint: KeyboardHint) -> &'static str {
    match hint {
        KeyboardHint::YesNo => "[ Yes ] [ No ]",
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprintln!("Type /start to begin. Use /photo to send a document.");
            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(msg) = parse_line(&line) else {
                            eprint!("> ");
                            continue;
                        };
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}", response.content);
        if let Some(hint) = response.keyboard {
            println!("{}", keyboard_line(hint));
        }
        println!();
        eprint!("> ");
        Ok(())
    }

    async fn send_status(
        &self,
        _msg: &IncomingMessage,
        status: StatusUpdate,
    ) -> Result<(), ChannelError> {
        match status {
            StatusUpdate::Typing => eprintln!("⏳ typing..."),
            StatusUpdate::Status(msg) => eprintln!("ℹ️  {}", msg),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   \t").is_none());
    }

    #[test]
    fn text_lines_share_one_session() {
        let a = parse_line("  yes ").unwrap();
        let b = parse_line("/start").unwrap();
        assert_eq!(a.kind, EventKind::Text);
        assert_eq!(a.content, "yes");
        assert_eq!(a.session_id(), b.session_id());
        assert_eq!(a.session_id().as_str(), "cli:local");
    }

    #[test]
    fn photo_command_simulates_attachment() {
        let msg = parse_line("/photo").unwrap();
        assert_eq!(msg.kind, EventKind::Document);
        assert!(msg.content.is_empty());

        let doc = parse_line("/DOCUMENT  front side").unwrap();
        assert_eq!(doc.kind, EventKind::Document);
        assert_eq!(doc.content, "front side");
    }

    #[test]
    fn lookalike_commands_stay_text() {
        let msg = parse_line("/photos").unwrap();
        assert_eq!(msg.kind, EventKind::Text);
    }

    #[test]
    fn yes_no_hint_is_rendered() {
        assert!(keyboard_line(KeyboardHint::YesNo).contains("Yes"));
    }
}
