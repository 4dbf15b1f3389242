//! The conversation store: an append-only, ordered message history.
//!
//! Messages are created final, except for at most one assistant placeholder
//! that is open for streaming.  Only the open placeholder can be updated, and
//! once it is sealed its text never changes again.

use std::fmt;

use crate::types::ImageAttachment;

/// Opaque identifier of a message, unique within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The parent typing into the chat.
    User,

    /// The assistant.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    image: Option<ImageAttachment>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The image attached to a user message.  Always `None` for the assistant.
    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }
}

/// A message that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    role: Role,
    text: String,
    image: Option<ImageAttachment>,
}

impl NewMessage {
    /// A user message, optionally carrying an image.
    pub fn user(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            image,
        }
    }

    /// A complete assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            image: None,
        }
    }
}

/// Ordered message history with a single open placeholder at most.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
    open: Option<MessageId>,
}

impl ConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a final message to the end of the history and returns its id.
    pub fn append(&mut self, message: NewMessage) -> MessageId {
        let id = self.assign_id();
        self.messages.push(Message {
            id,
            role: message.role,
            text: message.text,
            image: message.image,
        });
        id
    }

    /// Appends an empty assistant message that stays open for updates.
    ///
    /// Returns `None`, appending nothing, while another placeholder is open.
    pub fn open_placeholder(&mut self) -> Option<MessageId> {
        if self.open.is_some() {
            return None;
        }
        let id = self.append(NewMessage::assistant(String::new()));
        self.open = Some(id);
        Some(id)
    }

    /// Applies `mutator` to the text of the open placeholder `id`.
    ///
    /// Returns false, changing nothing, if `id` is absent or is not the open
    /// placeholder.
    pub fn update<F>(&mut self, id: MessageId, mutator: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        if self.open != Some(id) {
            return false;
        }
        match self.messages.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                mutator(&mut message.text);
                true
            }
            None => false,
        }
    }

    /// Closes the open placeholder `id`; its text is final from here on.
    pub fn seal(&mut self, id: MessageId) -> bool {
        if self.open == Some(id) {
            self.open = None;
            true
        } else {
            false
        }
    }

    /// The id of the open placeholder, if any.
    pub fn open(&self) -> Option<MessageId> {
        self.open
    }

    /// The full history, oldest first.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn append_preserves_order_and_unique_ids() {
        let mut store = ConversationStore::new();
        let mut ids = Vec::new();
        for i in 0..50 {
            let message = if i % 2 == 0 {
                NewMessage::user(format!("question {i}"), None)
            } else {
                NewMessage::assistant(format!("answer {i}"))
            };
            ids.push(store.append(message));
        }
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 50);
        let seen: HashSet<MessageId> = snapshot.iter().map(Message::id).collect();
        assert_eq!(seen.len(), 50);
        for (i, message) in snapshot.iter().enumerate() {
            assert_eq!(message.id(), ids[i]);
            assert!(message.text().ends_with(&i.to_string()));
        }
    }

    #[test]
    fn only_one_placeholder_open() {
        let mut store = ConversationStore::new();
        let first = store.open_placeholder().unwrap();
        assert_eq!(store.open_placeholder(), None);
        assert_eq!(store.len(), 1);
        assert!(store.seal(first));
        assert!(store.open_placeholder().is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_targets_open_placeholder_only() {
        let mut store = ConversationStore::new();
        let user = store.append(NewMessage::user("hi", None));
        let placeholder = store.open_placeholder().unwrap();

        assert!(!store.update(user, |text| text.push_str("tampered")));
        assert_eq!(store.get(user).unwrap().text(), "hi");

        assert!(store.update(placeholder, |text| text.push_str("Hello")));
        assert_eq!(store.get(placeholder).unwrap().text(), "Hello");

        store.seal(placeholder);
        assert!(!store.update(placeholder, |text| text.clear()));
        assert_eq!(store.get(placeholder).unwrap().text(), "Hello");
    }

    #[test]
    fn update_of_unknown_id_is_noop() {
        let mut store = ConversationStore::new();
        store.append(NewMessage::assistant("welcome"));
        assert!(!store.update(MessageId(99), |text| text.clear()));
        assert_eq!(store.snapshot()[0].text(), "welcome");
    }

    #[test]
    fn assistant_messages_never_carry_images() {
        let mut store = ConversationStore::new();
        let id = store.append(NewMessage::assistant("no pictures here"));
        assert_eq!(store.get(id).unwrap().role(), Role::Assistant);
        assert!(store.get(id).unwrap().image().is_none());
        assert_eq!(id.to_string(), "msg-0");
    }
}
