//! A pure projection of session state into the elements a front end shows.

use crate::chat::input::PendingInput;
use crate::chat::prompt::AgeGroup;
use crate::chat::store::{Message, MessageId, Role};

pub const TITLE: &str = "Parenting Compass";
pub const SUBTITLE: &str = "Family Focused";
pub const WORKING_INDICATOR: &str = "Consulting resources...";
pub const DISCLAIMER: &str = "Not medical advice. Consult professionals for serious issues.";

/// One entry of the age selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeTab {
    pub age_group: AgeGroup,
    pub label: &'static str,
    pub selected: bool,
}

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    /// MIME type of the attached image, if any.
    pub image: Option<String>,
    /// True for the placeholder still receiving text.
    pub streaming: bool,
}

/// Everything visible at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub age_tabs: Vec<AgeTab>,
    pub messages: Vec<MessageView>,
    /// Shown while a turn is in flight.
    pub working: Option<&'static str>,
    pub input_placeholder: String,
    pub draft: String,
    /// MIME type of the staged image, if any.
    pub staged_image: Option<String>,
    pub send_enabled: bool,
    pub suggestions: Vec<&'static str>,
    pub disclaimer: &'static str,
}

impl View {
    /// Projects the given state.  Deterministic; reads only its arguments.
    pub fn project(
        snapshot: &[Message],
        open: Option<MessageId>,
        active: bool,
        age_group: AgeGroup,
        input: &PendingInput,
    ) -> Self {
        let age_tabs = AgeGroup::ALL
            .into_iter()
            .map(|age| AgeTab {
                age_group: age,
                label: age.label(),
                selected: age == age_group,
            })
            .collect();
        let messages = snapshot
            .iter()
            .map(|message| MessageView {
                id: message.id(),
                role: message.role(),
                text: message.text().to_string(),
                image: message.image().map(|image| image.mime_type.clone()),
                streaming: open == Some(message.id()),
            })
            .collect();
        View {
            title: TITLE,
            subtitle: SUBTITLE,
            age_tabs,
            messages,
            working: active.then_some(WORKING_INDICATOR),
            input_placeholder: format!("Ask about your {} child...", age_group.label()),
            draft: input.draft().to_string(),
            staged_image: input.image().map(|image| image.mime_type.clone()),
            send_enabled: input.can_send(active),
            suggestions: age_group.suggestions().to_vec(),
            disclaimer: DISCLAIMER,
        }
    }

    /// The selected age tab.
    pub fn selected_age(&self) -> Option<&AgeTab> {
        self.age_tabs.iter().find(|tab| tab.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::store::{ConversationStore, NewMessage};
    use crate::types::ImageAttachment;

    #[test]
    fn idle_projection() {
        let mut store = ConversationStore::new();
        store.append(NewMessage::assistant("Hello!"));
        let input = PendingInput::new();
        let view = View::project(store.snapshot(), None, false, AgeGroup::Toddler, &input);

        assert_eq!(view.title, "Parenting Compass");
        assert_eq!(view.subtitle, "Family Focused");
        assert_eq!(view.age_tabs.len(), 4);
        assert_eq!(view.selected_age().unwrap().label, "2-5 Years");
        assert_eq!(view.messages.len(), 1);
        assert!(!view.messages[0].streaming);
        assert_eq!(view.working, None);
        assert_eq!(view.input_placeholder, "Ask about your 2-5 Years child...");
        assert!(!view.send_enabled);
        assert_eq!(view.suggestions, AgeGroup::Toddler.suggestions());
        assert_eq!(view.disclaimer, DISCLAIMER);
    }

    #[test]
    fn active_projection() {
        let mut store = ConversationStore::new();
        let image = ImageAttachment::from_bytes("image/png", b"\x89PNG").unwrap();
        store.append(NewMessage::user("", Some(image)));
        let placeholder = store.open_placeholder().unwrap();

        let mut input = PendingInput::new();
        input.set_draft("next question");
        let view = View::project(
            store.snapshot(),
            store.open(),
            true,
            AgeGroup::Adolescent,
            &input,
        );

        assert_eq!(view.working, Some(WORKING_INDICATOR));
        assert!(!view.send_enabled);
        assert_eq!(view.messages[0].image.as_deref(), Some("image/png"));
        assert_eq!(view.messages[0].text, "");
        assert_eq!(view.messages[1].id, placeholder);
        assert!(view.messages[1].streaming);
        assert_eq!(view.selected_age().unwrap().age_group, AgeGroup::Adolescent);
        assert_eq!(view.draft, "next question");
    }

    #[test]
    fn projection_is_deterministic() {
        let mut store = ConversationStore::new();
        store.append(NewMessage::user("hi", None));
        let mut input = PendingInput::new();
        input.set_draft("draft");
        let a = View::project(store.snapshot(), None, false, AgeGroup::Infant, &input);
        let b = View::project(store.snapshot(), None, false, AgeGroup::Infant, &input);
        assert_eq!(a, b);
        assert!(a.send_enabled);
    }
}
