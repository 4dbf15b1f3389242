//! Core chat session management.
//!
//! This module provides the [`ChatSession`] struct, which owns the
//! conversation store, gates sends on the "session active" flag, and drives
//! each turn's state machine against a [`CompletionService`].

use std::fmt;

use futures::StreamExt;

use crate::chat::config::{ChatConfig, WELCOME_MESSAGE};
use crate::chat::input::{PendingInput, Submission};
use crate::chat::prompt::{AgeGroup, assemble};
use crate::chat::render::Renderer;
use crate::chat::store::{ConversationStore, Message, MessageId, NewMessage};
use crate::chat::turn::{Turn, TurnState};
use crate::chat::view::View;
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_REJECTED_SENDS, SESSION_TURN_DURATION, SESSION_TURNS, SESSION_TURNS_COMPLETED,
    SESSION_TURNS_FAILED,
};
use crate::service::CompletionService;
use crate::types::Model;

/// Why a send was refused.  A refused send changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Neither non-blank text nor an image was pending.
    Empty,
    /// A turn is still in flight.
    Busy,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => f.write_str("nothing to send"),
            Rejection::Busy => f.write_str("a response is still in progress"),
        }
    }
}

/// How a turn ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The stream ended cleanly; `message` holds the final text.
    Completed { message: MessageId },
    /// The turn failed.  `apology` is the message appended for it, or `None`
    /// if the turn had already ended.
    Failed {
        apology: Option<MessageId>,
        error: Error,
    },
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }
}

/// Statistics about the current chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The age group the next send will use.
    pub age_group: AgeGroup,
    /// The model for text turns.
    pub text_model: Model,
    /// The model for image turns.
    pub image_model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Turns that were sent.
    pub turns_started: u64,
    /// Turns whose stream ended cleanly.
    pub turns_completed: u64,
    /// Turns that ended with an apology.
    pub turns_failed: u64,
    /// Sends refused because a turn was in flight.
    pub rejected_sends: u64,
    /// Whether a turn is in flight.
    pub active: bool,
}

/// A turn that is running against the session's store.
///
/// Dropping it before the turn ends fails the turn: the placeholder is sealed,
/// the apology appended, and the session state left terminal.
struct ActiveTurn<'a> {
    turn: Turn,
    store: &'a mut ConversationStore,
    state: &'a mut TurnState,
    turns_failed: &'a mut u64,
}

impl ActiveTurn<'_> {
    async fn stream<S: CompletionService>(
        &mut self,
        service: &S,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let outbound = self.turn.outbound();
        let mut fragments = service
            .stream_text(&outbound.model, &outbound.request)
            .await?;
        self.turn.accept();
        *self.state = self.turn.state();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            self.turn.apply_fragment(self.store, &fragment);
            if let Some(message) = self.store.get(self.turn.placeholder()) {
                renderer.update_message(message);
            }
        }
        Ok(())
    }

    fn complete(&mut self) {
        self.turn.complete(self.store);
        *self.state = self.turn.state();
    }

    /// Returns the apology's id, or `None` if the turn had already ended.
    fn fail(&mut self) -> Option<MessageId> {
        let apology = self.turn.fail(self.store)?;
        *self.state = self.turn.state();
        *self.turns_failed += 1;
        SESSION_TURNS_FAILED.click();
        Some(apology)
    }
}

impl Drop for ActiveTurn<'_> {
    fn drop(&mut self) {
        self.fail();
    }
}

/// A chat session that manages conversation state and API interactions.
pub struct ChatSession<S: CompletionService> {
    service: S,
    config: ChatConfig,
    age_group: AgeGroup,
    store: ConversationStore,
    state: TurnState,
    turns_started: u64,
    turns_completed: u64,
    turns_failed: u64,
    rejected_sends: u64,
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session, seeding the welcome message if configured.
    pub fn new(service: S, config: ChatConfig) -> Self {
        let mut store = ConversationStore::new();
        if config.welcome {
            store.append(NewMessage::assistant(WELCOME_MESSAGE));
        }
        Self {
            service,
            age_group: config.age_group,
            config,
            store,
            state: TurnState::Idle,
            turns_started: 0,
            turns_completed: 0,
            turns_failed: 0,
            rejected_sends: 0,
        }
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    /// Changes the age group for subsequent sends.  Existing messages are
    /// untouched.
    pub fn set_age_group(&mut self, age_group: AgeGroup) {
        self.age_group = age_group;
    }

    /// Suggestions for the current age group.
    pub fn suggestions(&self) -> &'static [&'static str] {
        self.age_group.suggestions()
    }

    /// The conversation so far, oldest first.
    pub fn messages(&self) -> &[Message] {
        self.store.snapshot()
    }

    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// The state of the most recent turn, or `Idle` before the first.
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// True while a turn is in flight.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Projects the session and `input` for display.
    pub fn view(&self, input: &PendingInput) -> View {
        View::project(
            self.store.snapshot(),
            self.store.open(),
            self.is_active(),
            self.age_group,
            input,
        )
    }

    /// Commits `input` as a new turn.
    ///
    /// On success the input is cleared, the user message and an empty
    /// placeholder are appended, and the session is active until the returned
    /// turn is handed to [`run_turn`](Self::run_turn).  On rejection nothing
    /// changes, including `input`.
    pub fn submit(&mut self, input: &mut PendingInput) -> std::result::Result<Turn, Rejection> {
        if self.is_active() || self.store.open().is_some() {
            self.rejected_sends += 1;
            SESSION_REJECTED_SENDS.click();
            return Err(Rejection::Busy);
        }
        if !input.has_content() {
            return Err(Rejection::Empty);
        }
        let Submission { text, image } = input.take();
        let history_len = self.store.len();
        self.store.append(NewMessage::user(text, image));
        let (history, sent) = self.store.snapshot().split_at(history_len);
        let outbound = assemble(history, &sent[0], self.age_group, &self.config.models);
        // The store has no open placeholder, so this cannot be refused.
        let turn = Turn::begin(&mut self.store, outbound).ok_or(Rejection::Busy)?;
        self.state = turn.state();
        self.turns_started += 1;
        SESSION_TURNS.click();
        Ok(turn)
    }

    /// Drives `turn` to completion or failure.
    ///
    /// Every error is absorbed here: the renderer sees the technical message
    /// and the conversation gains the apology.  If the returned future is
    /// dropped before the turn ends, the turn fails the same way, so the
    /// session never stays active.
    pub async fn run_turn(&mut self, turn: Turn, renderer: &mut dyn Renderer) -> TurnOutcome {
        let mut active = ActiveTurn {
            turn,
            store: &mut self.store,
            state: &mut self.state,
            turns_failed: &mut self.turns_failed,
        };
        renderer.start_response(active.turn.placeholder());
        let result = active.stream(&self.service, renderer).await;
        renderer.finish_response();
        SESSION_TURN_DURATION.add(active.turn.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                active.complete();
                self.turns_completed += 1;
                SESSION_TURNS_COMPLETED.click();
                TurnOutcome::Completed {
                    message: active.turn.placeholder(),
                }
            }
            Err(error) => {
                renderer.print_error(&error.to_string());
                let apology = active.fail();
                if let Some(message) = apology.and_then(|id| active.store.get(id)) {
                    renderer.print_message(message);
                }
                TurnOutcome::Failed { apology, error }
            }
        }
    }

    /// Submits `input` and runs the resulting turn.
    ///
    /// # Examples
    ///
    /// ```
    /// # use compass::chat::{ChatConfig, ChatSession, PendingInput, PlainTextRenderer};
    /// # use compass::{CompletionService, GenerateContentRequest, Model, Result, TextStream};
    /// # struct Canned;
    /// # #[async_trait::async_trait]
    /// # impl CompletionService for Canned {
    /// #     async fn stream_text(&self, _: &Model, _: &GenerateContentRequest) -> Result<TextStream> {
    /// #         Ok(Box::pin(futures::stream::iter(vec![Ok("Breathe first.".to_string())])))
    /// #     }
    /// # }
    /// # tokio_test::block_on(async {
    /// let mut session = ChatSession::new(Canned, ChatConfig::default());
    /// let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
    /// let mut input = PendingInput::new();
    /// input.set_draft("How to handle tantrums?");
    ///
    /// let outcome = session.send(&mut input, &mut renderer).await.unwrap();
    /// assert!(outcome.is_completed());
    /// assert_eq!(session.messages().last().unwrap().text(), "Breathe first.");
    /// # });
    /// ```
    pub async fn send(
        &mut self,
        input: &mut PendingInput,
        renderer: &mut dyn Renderer,
    ) -> std::result::Result<TurnOutcome, Rejection> {
        let turn = self.submit(input)?;
        Ok(self.run_turn(turn, renderer).await)
    }

    /// Returns statistics about the current session.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            age_group: self.age_group,
            text_model: self.config.models.text_model.clone(),
            image_model: self.config.models.image_model.clone(),
            message_count: self.store.len(),
            turns_started: self.turns_started,
            turns_completed: self.turns_completed,
            turns_failed: self.turns_failed,
            rejected_sends: self.rejected_sends,
            active: self.is_active(),
        }
    }
}
