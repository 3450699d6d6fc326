// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murshid shell` command implementation.
//!
//! Interactive REPL with streaming output and readline history. Plain
//! input is sent as a prompt; slash commands manage the conversation
//! list, bookmarks, and session lifecycle. Ctrl-C during a streaming
//! turn cancels it without leaving the shell.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use colored::Colorize;
use murshid_client::{ApiClient, ChatListItem};
use murshid_config::MurshidConfig;
use murshid_core::{ChatId, ChatListNotifier, ChatMessage, ChatRecord, MurshidError, Role};
use murshid_session::ChatSession;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

/// How many conversations the sidebar cache refetches at once.
const CHAT_LIST_LIMIT: u64 = 50;

/// Local chat-list cache fed by session notifications.
///
/// Mirrors what the web app's sidebar does: created conversations are
/// prepended optimistically, updates bump entries to the front, and a
/// refresh refetches the authoritative list.
pub struct CliChatList {
    client: ApiClient,
    entries: Mutex<Vec<ChatListItem>>,
}

impl CliChatList {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<ChatListItem> {
        self.entries.lock().expect("entries lock").clone()
    }

    fn upsert_front(&self, item: ChatListItem) {
        let mut entries = self.entries.lock().expect("entries lock");
        entries.retain(|e| e.id != item.id);
        entries.insert(0, item);
    }
}

#[async_trait]
impl ChatListNotifier for CliChatList {
    async fn chat_created(&self, chat: &ChatRecord) {
        self.upsert_front(ChatListItem {
            id: chat.id.clone(),
            title: chat.title.clone(),
            created_at: chat.created_at.clone(),
            updated_at: chat.updated_at.clone(),
        });
    }

    async fn chat_updated(&self, id: &ChatId, updated_at: &str) {
        let existing = {
            let entries = self.entries.lock().expect("entries lock");
            entries.iter().find(|e| &e.id == id).cloned()
        };
        if let Some(mut entry) = existing {
            entry.updated_at = Some(updated_at.to_string());
            self.upsert_front(entry);
        }
    }

    async fn refresh(&self) {
        match self.client.list_chats(CHAT_LIST_LIMIT, 0).await {
            Ok(page) => {
                *self.entries.lock().expect("entries lock") = page.data;
            }
            Err(e) => warn!(error = %e, "chat list refresh failed"),
        }
    }
}

/// Runs the `murshid chats` subcommand: a one-shot conversation listing.
pub async fn list_chats(config: &MurshidConfig, limit: u64) -> Result<(), MurshidError> {
    let client = ApiClient::new(&config.api)?;
    let page = client.list_chats(limit, 0).await?;
    for item in &page.data {
        let when = item.updated_at.as_deref().unwrap_or("-");
        println!("{}  {}  {}", item.id.to_string().dimmed(), when.dimmed(), item.title);
    }
    println!(
        "{}",
        format!("{} of {} conversations", page.data.len(), page.total).dimmed()
    );
    Ok(())
}

/// Runs the interactive shell until `/quit` or EOF.
pub async fn run_shell(config: MurshidConfig) -> Result<(), MurshidError> {
    let client = Arc::new(ApiClient::new(&config.api)?);
    let chat_list = Arc::new(CliChatList::new((*client).clone()));

    let mut session = ChatSession::new(
        client.clone(),
        client.clone(),
        client.clone(),
        chat_list.clone(),
    );
    session.load_bookmarks().await;

    // Ctrl-C cancels the active turn; rustyline handles it while idle.
    let stop = session.stop_handle();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                break;
            }
            stop.stop();
        }
    });

    let mut rl = DefaultEditor::new()
        .map_err(|e| MurshidError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "murshid shell".bold().green());
    println!(
        "Type a question to chat, {} for commands, {} to exit.\n",
        "/help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "murshid".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(command, &client, &chat_list, &mut session).await;
                } else {
                    run_turn(&mut session, trimmed).await;
                }

                if session.unauthorized() {
                    eprintln!(
                        "{}",
                        "session is not authorized; set api.token or MURSHID_API_TOKEN and sign in again"
                            .red()
                    );
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Sends one prompt and streams the reply to stdout as it arrives.
async fn run_turn(session: &mut ChatSession, prompt: &str) {
    session.set_input(prompt);
    let mut fragments = session.subscribe_fragments();
    let printer = tokio::spawn(async move {
        while let Some(fragment) = fragments.recv().await {
            print!("{fragment}");
            let _ = std::io::Write::flush(&mut std::io::stdout());
        }
    });

    session.send_prompt().await;
    session.clear_fragment_sink();
    let _ = printer.await;
    println!();

    if let Some(error) = session.error() {
        eprintln!("{}", error.red());
    }
    session.settle().await;
}

async fn handle_command(
    command: &str,
    client: &ApiClient,
    chat_list: &CliChatList,
    session: &mut ChatSession,
) {
    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "help" => print_help(),
        "new" => {
            session.reset();
            println!("{}", "started a new conversation".dimmed());
        }
        "chats" => {
            if chat_list.entries().is_empty() {
                chat_list.refresh().await;
            }
            let entries = chat_list.entries();
            if entries.is_empty() {
                println!("{}", "no conversations yet".dimmed());
            }
            for entry in entries {
                println!("{}  {}", entry.id.to_string().dimmed(), entry.title);
            }
        }
        "open" => {
            if arg.is_empty() {
                eprintln!("{}", "usage: /open <chat-id>".yellow());
                return;
            }
            let chat_id = ChatId(arg.to_string());
            match client.get_chat(&chat_id).await {
                Ok(detail) => {
                    let messages: Vec<ChatMessage> = detail
                        .messages
                        .into_iter()
                        .map(|m| m.into_message(&detail.id))
                        .collect();
                    let count = messages.len();
                    session.hydrate(detail.id, messages);
                    println!(
                        "{}",
                        format!("opened \"{}\" ({count} messages)", detail.title).dimmed()
                    );
                    print_tail(session, 6);
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        "delete" => {
            if arg.is_empty() {
                eprintln!("{}", "usage: /delete <chat-id>".yellow());
                return;
            }
            let chat_id = ChatId(arg.to_string());
            match client.delete_chat(&chat_id).await {
                Ok(()) => {
                    if session.chat_id() == Some(&chat_id) {
                        session.reset();
                    }
                    chat_list.refresh().await;
                    println!("{}", "conversation deleted".dimmed());
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        "history" => print_tail(session, usize::MAX),
        "save" => {
            let Ok(index) = arg.parse::<usize>() else {
                eprintln!("{}", "usage: /save <message-number> (see /history)".yellow());
                return;
            };
            let Some(message) = session.messages().get(index.wrapping_sub(1)) else {
                eprintln!("{}", "no such message".red());
                return;
            };
            let message_id = message.id.clone();
            session.toggle_bookmark(&message_id).await;
            let now_bookmarked = session
                .messages()
                .iter()
                .find(|m| m.id == message_id)
                .is_some_and(|m| m.bookmarked);
            if now_bookmarked {
                println!("{}", "saved to bookmarks".dimmed());
            } else {
                println!("{}", "removed from bookmarks".dimmed());
            }
        }
        "bookmarks" => {
            let bookmarks = session.bookmarks().bookmarks();
            if bookmarks.is_empty() {
                println!("{}", "no bookmarks".dimmed());
            }
            for bookmark in bookmarks {
                println!(
                    "{}  [{}] {}",
                    bookmark.saved_at.dimmed(),
                    bookmark.role,
                    preview(&bookmark.content)
                );
            }
        }
        other => eprintln!("{}", format!("unknown command: /{other} (try /help)").yellow()),
    }
}

fn print_help() {
    println!("  /new               start a new conversation");
    println!("  /chats             list conversations");
    println!("  /open <id>         open a conversation");
    println!("  /delete <id>       delete a conversation");
    println!("  /history           show the current conversation");
    println!("  /save <n>          toggle a bookmark on message n");
    println!("  /bookmarks         list saved bookmarks");
    println!("  /quit              exit");
}

fn print_tail(session: &ChatSession, count: usize) {
    let messages = session.messages();
    let start = messages.len().saturating_sub(count);
    for (index, message) in messages.iter().enumerate().skip(start) {
        let role = match message.role {
            Role::User => "you".cyan(),
            Role::Assistant => "murshid".green(),
            Role::System => "system".dimmed(),
        };
        let marker = if message.bookmarked { " *" } else { "" };
        println!(
            "{:>3} {role}{}: {}",
            index + 1,
            marker.yellow(),
            preview(&message.content)
        );
    }
}

/// First line of a message, shortened for list display.
fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(80).collect();
    if first_line.chars().count() > 80 || content.lines().count() > 1 {
        preview.push('…');
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_shortens_long_first_line() {
        let text = "x".repeat(200);
        let shortened = preview(&text);
        assert_eq!(shortened.chars().count(), 81);
        assert!(shortened.ends_with('…'));
    }

    #[test]
    fn preview_marks_multiline_content() {
        assert_eq!(preview("line one\nline two"), "line one…");
        assert_eq!(preview("only line"), "only line");
    }

    #[tokio::test]
    async fn chat_list_upserts_to_front() {
        let client = ApiClient::from_parts("http://localhost:0".into(), None).unwrap();
        let list = CliChatList::new(client);

        let record = ChatRecord {
            id: ChatId("c-1".into()),
            title: "First".into(),
            created_at: None,
            updated_at: None,
        };
        list.chat_created(&record).await;
        let second = ChatRecord {
            id: ChatId("c-2".into()),
            title: "Second".into(),
            created_at: None,
            updated_at: None,
        };
        list.chat_created(&second).await;
        assert_eq!(list.entries()[0].id, ChatId("c-2".into()));

        list.chat_updated(&ChatId("c-1".into()), "2026-02-01T00:00:00Z")
            .await;
        assert_eq!(list.entries()[0].id, ChatId("c-1".into()));
        assert_eq!(
            list.entries()[0].updated_at.as_deref(),
            Some("2026-02-01T00:00:00Z")
        );
    }
}
