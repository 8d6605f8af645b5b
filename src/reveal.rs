//! # Typing reveal
//!
//! The cosmetic character-by-character display of an assistant answer that
//! has already arrived in full. The reveal is a timed sequence of successive
//! prefixes of the complete string, one character every 20 ms.
//!
//! Unlike the flat timer loop this replaces, the sequence is cancellable:
//! [`TypingReveal::handle`] returns a [`RevealHandle`] that any holder can
//! use to stop a stale reveal deterministically: the interactive chat loop
//! cancels the previous reveal before sending a new message, and dropping
//! the play future stops the ticker outright. Nothing here talks to the
//! network; the answer text is complete before the reveal starts.
//!
//! # Examples
//!
//! ```no_run
//! # async fn demo() {
//! use botdeck::reveal::TypingReveal;
//!
//! let reveal = TypingReveal::new("hello");
//! reveal.play(|prefix| print!("\r{prefix}")).await;
//! # }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

/// Interval between revealed characters.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(20);

/// How a reveal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The full text was revealed.
    Completed,
    /// A [`RevealHandle`] stopped the reveal early.
    Cancelled,
}

/// Cancellation handle for an in-flight [`TypingReveal`].
///
/// Cheap to clone; cancelling is idempotent and takes effect before the
/// next character is emitted.
#[derive(Debug, Clone)]
pub struct RevealHandle {
    cancelled: Arc<AtomicBool>,
}

impl RevealHandle {
    /// Stop the reveal before its next tick.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A pending reveal of one complete answer string.
#[derive(Debug)]
pub struct TypingReveal {
    text: String,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
}

impl TypingReveal {
    /// Prepare a reveal of `text` at the standard 20 ms/character pace.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_interval(text, REVEAL_INTERVAL)
    }

    /// Prepare a reveal with an explicit pace. Tests use a near-zero
    /// interval to keep themselves fast.
    pub fn with_interval(text: impl Into<String>, interval: Duration) -> Self {
        Self {
            text: text.into(),
            interval,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that can cancel this reveal from elsewhere.
    pub fn handle(&self) -> RevealHandle {
        RevealHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// The complete text this reveal will eventually show.
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Run the reveal, invoking `on_prefix` with each successive prefix of
    /// the full text (char-boundary safe). Returns how the reveal ended;
    /// on [`RevealOutcome::Completed`] the last prefix passed to the
    /// callback was the entire string.
    ///
    /// The callback runs between ticks on the caller's task, so a slow
    /// callback stretches the animation but never tears a prefix.
    pub async fn play<F>(self, mut on_prefix: F) -> RevealOutcome
    where
        F: FnMut(&str),
    {
        for prefix in prefixes(&self.text) {
            if self.cancelled.load(Ordering::Relaxed) {
                return RevealOutcome::Cancelled;
            }
            tokio::time::sleep(self.interval).await;
            on_prefix(prefix);
        }
        if self.cancelled.load(Ordering::Relaxed) {
            RevealOutcome::Cancelled
        } else {
            RevealOutcome::Completed
        }
    }
}

/// Successive prefixes of `text`, one per character, ending with the full
/// string. Slicing follows char boundaries, so multi-byte characters are
/// never split.
pub fn prefixes(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(|(i, c)| &text[..i + c.len_utf8()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_end_with_full_text() {
        let all: Vec<&str> = prefixes("hi!").collect();
        assert_eq!(all, vec!["h", "hi", "hi!"]);
    }

    #[test]
    fn prefixes_respect_char_boundaries() {
        let all: Vec<&str> = prefixes("héllo").collect();
        assert_eq!(all.len(), 5);
        assert_eq!(all[1], "hé");
        assert_eq!(*all.last().unwrap(), "héllo");
    }

    #[test]
    fn prefixes_of_empty_text_is_empty() {
        assert_eq!(prefixes("").count(), 0);
    }

    #[tokio::test]
    async fn play_reveals_every_prefix_in_order() {
        let reveal = TypingReveal::with_interval("abc", Duration::from_millis(1));
        let mut seen = Vec::new();
        let outcome = reveal.play(|p| seen.push(p.to_string())).await;

        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(seen, vec!["a", "ab", "abc"]);
    }

    #[tokio::test]
    async fn cancelled_reveal_stops_before_completion() {
        let reveal = TypingReveal::with_interval("abcdef", Duration::from_millis(1));
        let handle = reveal.handle();

        let mut seen = Vec::new();
        let outcome = reveal
            .play(|p| {
                seen.push(p.to_string());
                if p.len() == 2 {
                    handle.cancel();
                }
            })
            .await;

        assert_eq!(outcome, RevealOutcome::Cancelled);
        assert_eq!(seen.last().map(String::as_str), Some("ab"));
    }

    #[tokio::test]
    async fn empty_text_completes_immediately() {
        let reveal = TypingReveal::with_interval("", Duration::from_millis(1));
        let mut calls = 0;
        let outcome = reveal.play(|_| calls += 1).await;
        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(calls, 0);
    }
}
