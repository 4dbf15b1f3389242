//! The Parenting Compass chat: conversation state, prompt assembly, and the
//! streaming session lifecycle.
//!
//! # Architecture
//!
//! - [`store`]: the append-only conversation history
//! - [`input`]: draft text and the staged image
//! - [`prompt`]: age groups, the system instruction, request assembly
//! - [`turn`]: the per-turn state machine
//! - [`session`]: the session that gates sends and drives turns
//! - [`view`]: a pure projection of the session for display
//! - [`render`]: terminal output
//! - [`commands`]: slash command parsing
//! - [`config`]: CLI argument parsing and configuration

pub mod commands;
pub mod config;
pub mod input;
pub mod prompt;
pub mod render;
pub mod session;
pub mod store;
pub mod turn;
pub mod view;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatArgsError, ChatConfig, WELCOME_MESSAGE};
pub use input::{PendingInput, Submission};
pub use prompt::{
    AgeGroup, DEFAULT_IMAGE_PROMPT, ModelPolicy, OutboundRequest, TurnKind, assemble,
    system_instruction,
};
pub use render::{PlainTextRenderer, Renderer};
pub use session::{ChatSession, Rejection, SessionStats, TurnOutcome};
pub use store::{ConversationStore, Message, MessageId, NewMessage, Role};
pub use turn::{APOLOGY, Turn, TurnState};
pub use view::{AgeTab, MessageView, View};
