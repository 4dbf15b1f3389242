//! The per-turn state machine.
//!
//! A [`Turn`] owns the optimistic placeholder opened for one send.  Every
//! transition that touches the conversation goes through the store, so the
//! placeholder is the only message a turn can ever change.

use std::time::{Duration, Instant};

use crate::chat::prompt::OutboundRequest;
use crate::chat::store::{ConversationStore, MessageId, NewMessage};

/// Appended in place of a response when a turn fails.
pub const APOLOGY: &str = "I apologize, but I encountered a temporary issue. Please try again.";

/// Where a turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// No turn in flight.
    Idle,
    /// The placeholder exists; the service has not accepted the request yet.
    Sending,
    /// The service is emitting fragments.
    Streaming,
    /// The stream ended cleanly.
    Completed,
    /// The request or the stream failed.
    Failed,
}

impl TurnState {
    /// True while a new send must be refused.
    pub fn is_active(self) -> bool {
        matches!(self, TurnState::Sending | TurnState::Streaming)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TurnState::Completed | TurnState::Failed)
    }
}

/// One in-flight turn, from committed send to completion or failure.
#[derive(Debug)]
pub struct Turn {
    placeholder: MessageId,
    state: TurnState,
    accumulated: String,
    outbound: OutboundRequest,
    started: Instant,
}

impl Turn {
    /// Opens the placeholder and enters `Sending`.
    ///
    /// Returns `None`, touching nothing, if the store already has an open
    /// placeholder.
    pub(crate) fn begin(store: &mut ConversationStore, outbound: OutboundRequest) -> Option<Self> {
        let placeholder = store.open_placeholder()?;
        Some(Self {
            placeholder,
            state: TurnState::Sending,
            accumulated: String::new(),
            outbound,
            started: Instant::now(),
        })
    }

    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The request this turn sends.
    pub fn outbound(&self) -> &OutboundRequest {
        &self.outbound
    }

    /// Everything received so far.
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `Sending -> Streaming`.  Returns false from any other state.
    pub(crate) fn accept(&mut self) -> bool {
        if self.state == TurnState::Sending {
            self.state = TurnState::Streaming;
            true
        } else {
            false
        }
    }

    /// Accumulates `fragment` and overwrites the placeholder with the
    /// cumulative text.
    ///
    /// A fragment arriving while still `Sending` implies acceptance.  Returns
    /// false once the turn is terminal.
    pub(crate) fn apply_fragment(&mut self, store: &mut ConversationStore, fragment: &str) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = TurnState::Streaming;
        self.accumulated.push_str(fragment);
        let accumulated = &self.accumulated;
        store.update(self.placeholder, |text| text.clone_from(accumulated))
    }

    /// Seals the placeholder and enters `Completed`.
    pub(crate) fn complete(&mut self, store: &mut ConversationStore) -> bool {
        if !self.state.is_active() {
            return false;
        }
        store.seal(self.placeholder);
        self.state = TurnState::Completed;
        true
    }

    /// Seals the placeholder as-is, appends the apology, and enters `Failed`.
    ///
    /// Returns the apology's id, or `None` if the turn was already terminal.
    pub(crate) fn fail(&mut self, store: &mut ConversationStore) -> Option<MessageId> {
        if !self.state.is_active() {
            return None;
        }
        store.seal(self.placeholder);
        self.state = TurnState::Failed;
        Some(store.append(NewMessage::assistant(APOLOGY)))
    }
}
