//! # Chat Flow
//!
//! The stateful heart of the client: an append-only message log, a
//! server-assigned session identifier, and the send flow that ties them to
//! [`crate::api::ApiClient`] and the typing reveal.
//!
//! ## Message lifecycle
//!
//! Each entry in the [`ChatLog`] is keyed by a client-generated UUID and
//! moves through an explicit lifecycle:
//!
//! ```text
//! push_pending_user ──► Pending ──commit──► Committed
//!                          │
//!                          └──rollback──► (removed from the log)
//! ```
//!
//! A user message is appended optimistically the moment it is sent. On
//! success it is committed and, once the reveal has played out, a permanent
//! assistant entry is appended after it. On failure the pending entry is
//! removed by its id, leaving zero net new entries; the log never shows a
//! user message the server did not accept.
//!
//! ## Session identity
//!
//! The session id is never invented client-side. The first reply assigns
//! it; [`ChatLog::adopt_session`] replaces the held id whenever the server
//! returns a different one, and every subsequent send carries it.

use crate::{
    api::ApiClient,
    error::{ApiError, Result},
    models::Role,
    reveal::{RevealOutcome, TypingReveal},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Delivery state of a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Sent optimistically; the server has not confirmed it yet.
    Pending,
    /// Accepted by the server (or received from it).
    Committed,
}

/// One rendered line of the conversation.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub state: EntryState,
}

/// Append-only message log for one chat view, plus the session id the
/// server has assigned to it (if any).
#[derive(Debug, Default)]
pub struct ChatLog {
    entries: Vec<LogEntry>,
    session_id: Option<String>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume an existing session rather than letting the first send
    /// create one.
    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            session_id: Some(session_id.into()),
        }
    }

    /// The committed and pending entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The session id currently held, if the server has assigned one.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Append an optimistic user entry for `input`, returning its id.
    ///
    /// The input is trimmed first; empty or whitespace-only input appends
    /// nothing and returns `None`: a no-op, not an error.
    pub fn push_pending_user(&mut self, input: &str) -> Option<Uuid> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let id = Uuid::new_v4();
        self.entries.push(LogEntry {
            id,
            role: Role::User,
            text: trimmed.to_string(),
            timestamp: Utc::now(),
            state: EntryState::Pending,
        });
        Some(id)
    }

    /// Mark a pending entry as accepted. Unknown ids are ignored.
    pub fn commit(&mut self, id: Uuid) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.state = EntryState::Committed;
        }
    }

    /// Remove an entry by id, the rollback half of the optimistic update.
    /// Removing an id that is no longer present is a no-op.
    pub fn rollback(&mut self, id: Uuid) {
        self.entries.retain(|e| e.id != id);
    }

    /// Append a committed assistant entry. Called only after the reveal of
    /// the answer has completed.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(LogEntry {
            id,
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
            state: EntryState::Committed,
        });
        id
    }

    /// Hold the session id the server returned. Replaces the current id
    /// only when it actually differs; this is how the very first message
    /// in a session acquires one.
    pub fn adopt_session(&mut self, session_id: Option<String>) {
        if let Some(sid) = session_id {
            if self.session_id.as_deref() != Some(sid.as_str()) {
                self.session_id = Some(sid);
            }
        }
    }
}

/// Result of a successful send: the committed user entry's id and the full
/// answer text, ready for the reveal.
#[derive(Debug)]
pub struct Exchange {
    pub user_entry: Uuid,
    pub answer: String,
}

/// One chat view bound to a chatbot: the log plus the client used to send.
pub struct ChatView {
    client: ApiClient,
    chatbot_id: String,
    pub log: ChatLog,
}

impl ChatView {
    /// Bind a fresh log to `chatbot_id`. An empty id is a configuration
    /// error and terminal for the whole view, mirroring a route with no
    /// chatbot identifier.
    pub fn new(client: ApiClient, chatbot_id: &str) -> Result<Self> {
        if chatbot_id.trim().is_empty() {
            return Err(ApiError::Invalid(
                "no chatbot id given; the chat view cannot start".to_string(),
            ));
        }
        Ok(Self {
            client,
            chatbot_id: chatbot_id.to_string(),
            log: ChatLog::new(),
        })
    }

    /// Send `input` through the optimistic lifecycle.
    ///
    /// `Ok(None)` means the trimmed input was empty and nothing happened.
    /// On error the log is already rolled back; the message is derived from
    /// the error taxonomy (structured server error, network failure, or
    /// client-side construction failure) and is ready for display.
    pub async fn send(&mut self, input: &str) -> Result<Option<Exchange>> {
        let Some(entry_id) = self.log.push_pending_user(input) else {
            return Ok(None);
        };
        let text = input.trim();

        match self
            .client
            .send_message(&self.chatbot_id, text, self.log.session_id())
            .await
        {
            Ok(reply) => {
                self.log.adopt_session(reply.session_id);
                self.log.commit(entry_id);
                Ok(Some(Exchange {
                    user_entry: entry_id,
                    answer: reply.answer,
                }))
            }
            Err(e) => {
                self.log.rollback(entry_id);
                Err(e)
            }
        }
    }

    /// Full exchange: send `input`, play the typing reveal of the answer
    /// through `on_prefix`, then append the permanent assistant entry.
    ///
    /// The assistant entry is appended with the *full* answer even when the
    /// reveal was cancelled mid-way; cancellation only cuts the animation
    /// short, never the content.
    pub async fn send_and_reveal<F>(
        &mut self,
        input: &str,
        reveal_interval: std::time::Duration,
        on_prefix: F,
    ) -> Result<Option<RevealOutcome>>
    where
        F: FnMut(&str),
    {
        let Some(exchange) = self.send(input).await? else {
            return Ok(None);
        };

        let reveal = TypingReveal::with_interval(exchange.answer.clone(), reveal_interval);
        let outcome = reveal.play(on_prefix).await;
        self.log.push_assistant(exchange.answer);
        Ok(Some(outcome))
    }
}

/// Enters interactive conversation mode with a chatbot.
///
/// Reads lines from stdin until the user types "exit", sending each through
/// the optimistic log and revealing the answer at the standard pace.
/// Pressing Ctrl-C during a reveal cancels the animation and prints the
/// rest of the answer at once; the log always records the full text.
///
/// # Parameters
/// - `client: ApiClient`: Authenticated API client.
/// - `chatbot_id: &str`: The chatbot to converse with.
///
/// # Returns
/// - `Result<()>`: Success or error.
pub async fn interactive_mode(client: ApiClient, chatbot_id: &str) -> Result<()> {
    use crossterm::{
        ExecutableCommand,
        style::{Attribute, Color, SetAttribute, SetForegroundColor},
    };
    use std::io::Write;

    let mut view = ChatView::new(client, chatbot_id)?;
    let mut stdout = std::io::stdout();
    println!("Chatting with chatbot {chatbot_id}. Type \"exit\" to leave.");

    loop {
        stdout.execute(SetForegroundColor(Color::Green))?;
        print!("\nYou: ");
        stdout.flush()?;
        stdout.execute(SetForegroundColor(Color::Reset))?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        if input.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let exchange = match view.send(&input).await {
            Ok(Some(exchange)) => exchange,
            Ok(None) => continue,
            Err(e) => {
                // The pending entry is already rolled back; show the error
                // below the log and let the user try again.
                eprintln!("error: {e}");
                continue;
            }
        };

        stdout.execute(SetForegroundColor(Color::Blue))?;
        stdout.execute(SetAttribute(Attribute::Bold))?;
        print!("Bot: ");
        stdout.flush()?;

        let reveal = TypingReveal::new(exchange.answer.clone());
        let handle = reveal.handle();
        let printed = std::cell::Cell::new(0usize);
        let play = reveal.play(|prefix| {
            print!("{}", &prefix[printed.get()..]);
            printed.set(prefix.len());
            let _ = std::io::stdout().flush();
        });
        tokio::pin!(play);

        let outcome = tokio::select! {
            outcome = &mut play => outcome,
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                play.as_mut().await
            }
        };
        if outcome == RevealOutcome::Cancelled {
            print!("{}", &exchange.answer[printed.get()..]);
        }
        view.log.push_assistant(exchange.answer);

        stdout.execute(SetAttribute(Attribute::Reset))?;
        stdout.execute(SetForegroundColor(Color::Reset))?;
        println!();
    }

    Ok(())
}
