//! Prompt assembly: age groups, the system instruction, and request building.
//!
//! Text turns replay the prior conversation as role/text pairs.  Image turns
//! are sent on their own, with no history; an image request has no memory of
//! the conversation that preceded it.

use std::fmt;
use std::str::FromStr;

use crate::chat::store::{Message, Role};
use crate::types::{Content, ContentRole, GenerateContentRequest, KnownModel, Model, Part};

/// Text sent with an image when the user typed nothing.
pub const DEFAULT_IMAGE_PROMPT: &str = "Analyze this image in a parenting context.";

/// Developmental stage of the child the conversation is about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    /// 0-1 years.
    Infant,
    /// 2-5 years.
    #[default]
    Toddler,
    /// 6-12 years.
    SchoolAge,
    /// 13-18 years.
    Adolescent,
}

impl AgeGroup {
    /// Every age group, youngest first.
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Infant,
        AgeGroup::Toddler,
        AgeGroup::SchoolAge,
        AgeGroup::Adolescent,
    ];

    /// The label shown to the user and substituted into the instruction.
    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Infant => "0-1 Years",
            AgeGroup::Toddler => "2-5 Years",
            AgeGroup::SchoolAge => "6-12 Years",
            AgeGroup::Adolescent => "13-18 Years",
        }
    }

    /// The short name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            AgeGroup::Infant => "infant",
            AgeGroup::Toddler => "toddler",
            AgeGroup::SchoolAge => "school-age",
            AgeGroup::Adolescent => "adolescent",
        }
    }

    fn range(self) -> &'static str {
        match self {
            AgeGroup::Infant => "0-1",
            AgeGroup::Toddler => "2-5",
            AgeGroup::SchoolAge => "6-12",
            AgeGroup::Adolescent => "13-18",
        }
    }

    /// The fixed prompt suggestions offered for this age group.
    pub fn suggestions(self) -> &'static [&'static str] {
        match self {
            AgeGroup::Infant => &[
                "How to help baby sleep better?",
                "Signs of teething?",
                "Starting solid foods guide",
                "Activities for 6-month old",
            ],
            AgeGroup::Toddler => &[
                "How to handle tantrums gently?",
                "Meal ideas for picky eaters",
                "Potty training tips",
                "Dealing with separation anxiety",
            ],
            AgeGroup::SchoolAge => &[
                "Helping with homework motivation",
                "Appropriate screen time limits",
                "Signs of bullying at school",
                "Building self-confidence",
            ],
            AgeGroup::Adolescent => &[
                "How to talk about mental health?",
                "Social media safety rules",
                "Dealing with mood swings",
                "College preparation advice",
            ],
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    /// Accepts the short name (`toddler`), the range (`2-5`), or the label
    /// (`2-5 Years`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AgeGroup::ALL
            .into_iter()
            .find(|age| {
                wanted == age.name()
                    || wanted == age.range()
                    || wanted == age.label().to_lowercase()
                    || (age.name() == "school-age" && wanted == "schoolage")
            })
            .ok_or_else(|| {
                format!(
                    "unknown age group {s:?} (expected infant, toddler, school-age, or adolescent)"
                )
            })
    }
}

/// The system instruction for a conversation about a child in `age`.
pub fn system_instruction(age: AgeGroup) -> String {
    let label = age.label();
    format!(
        r#"You are "Parenting Compass", a warm, non-judgmental, and deeply empathetic parenting partner.

YOUR CORE APPROACH:
1. EMPATHY FIRST: Always start by validating the parent's feelings. Put yourself in their shoes. Acknowledge that parenting is challenging. Make them feel relaxed, understood, and safe to share their struggles. Use a comforting and supportive tone, like a wise, caring friend.
2. PRACTICAL SOLUTIONS: Move beyond theory. Provide clear, concrete, and actionable steps they can implement immediately. Focus on "how-to" rather than just "why".

CURRENT CHILD AGE GROUP: {label}
Tailor all advice to the specific developmental stage, emotional needs, and cognitive abilities of a {label} child.

ETHICAL GUIDELINES (Universal Traditional Values):
Your advice must be universally welcoming but adhere to conservative, traditional family values to ensure safety and wholesomeness.
1. Promote deep respect for parents and family cohesion.
2. For social relationships (especially teens), emphasize friendship, group activities, and family involvement; avoid encouraging private dating or exclusive romantic relationships for minors.
3. In dietary advice, do not recommend alcohol, intoxicants, or pork products.
4. Focus on modesty, responsibility, resilience, and character development.
5. Do not use religious terminology. Keep the language secular yet deeply moral and professional.

If an image is provided, analyze it in the context of parenting (e.g., assessing a drawing, checking a homework assignment, identifying a room hazard) with a helpful and encouraging perspective.

FORMATTING:
Use warm opening sentences. Use bolding for key practical steps. Keep paragraphs concise."#
    )
}

/// Which model serves which kind of turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    /// Serves text-only turns; should be fast.
    pub text_model: Model,
    /// Serves image turns; should be capable of visual analysis.
    pub image_model: Model,
}

impl ModelPolicy {
    /// The model for a turn, keyed only on whether it carries an image.
    pub fn select(&self, has_image: bool) -> &Model {
        if has_image {
            &self.image_model
        } else {
            &self.text_model
        }
    }
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            text_model: Model::Known(KnownModel::Gemini25FlashLite),
            image_model: Model::Known(KnownModel::Gemini3ProPreview),
        }
    }
}

/// Shape of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Multi-turn request replaying prior history.
    Text,
    /// Single-turn request carrying one image.
    Image,
}

/// A request ready to hand to a completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub kind: TurnKind,
    pub model: Model,
    pub request: GenerateContentRequest,
}

fn wire_role(role: Role) -> ContentRole {
    match role {
        Role::User => ContentRole::User,
        Role::Assistant => ContentRole::Model,
    }
}

/// Builds the request for `turn`, given everything that preceded it.
///
/// `history` must not include `turn`.  Messages with empty text (a placeholder
/// left empty by a failed turn) are not replayed, and images are never
/// replayed.
pub fn assemble(
    history: &[Message],
    turn: &Message,
    age: AgeGroup,
    policy: &ModelPolicy,
) -> OutboundRequest {
    let instruction = system_instruction(age);
    match turn.image() {
        Some(image) => {
            let text = if turn.text().trim().is_empty() {
                DEFAULT_IMAGE_PROMPT
            } else {
                turn.text()
            };
            let content = Content::new(ContentRole::User, vec![image.to_part(), Part::text(text)]);
            OutboundRequest {
                kind: TurnKind::Image,
                model: policy.select(true).clone(),
                request: GenerateContentRequest::new(vec![content])
                    .with_system_instruction(instruction),
            }
        }
        None => {
            let mut contents: Vec<Content> = history
                .iter()
                .filter(|message| !message.text().is_empty())
                .map(|message| {
                    Content::new(wire_role(message.role()), vec![Part::text(message.text())])
                })
                .collect();
            contents.push(Content::user(turn.text()));
            OutboundRequest {
                kind: TurnKind::Text,
                model: policy.select(false).clone(),
                request: GenerateContentRequest::new(contents).with_system_instruction(instruction),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::store::{ConversationStore, NewMessage};
    use crate::types::ImageAttachment;

    fn image() -> ImageAttachment {
        ImageAttachment::from_bytes("image/jpeg", b"\xff\xd8\xff").unwrap()
    }

    /// A store holding `messages` in order.
    fn conversation(messages: Vec<NewMessage>) -> ConversationStore {
        let mut store = ConversationStore::new();
        for message in messages {
            store.append(message);
        }
        store
    }

    #[test]
    fn instruction_mentions_age_label_only() {
        for age in AgeGroup::ALL {
            let instruction = system_instruction(age);
            assert_eq!(instruction.matches(age.label()).count(), 2);
            for other in AgeGroup::ALL.into_iter().filter(|o| *o != age) {
                assert!(!instruction.contains(other.label()));
            }
        }
    }

    #[test]
    fn parse_age_groups() {
        assert_eq!("toddler".parse(), Ok(AgeGroup::Toddler));
        assert_eq!("0-1".parse(), Ok(AgeGroup::Infant));
        assert_eq!("6-12 years".parse(), Ok(AgeGroup::SchoolAge));
        assert_eq!(" Adolescent ".parse(), Ok(AgeGroup::Adolescent));
        assert_eq!("schoolage".parse(), Ok(AgeGroup::SchoolAge));
        assert!("newborn".parse::<AgeGroup>().is_err());
        assert_eq!(AgeGroup::default(), AgeGroup::Toddler);
    }

    #[test]
    fn four_suggestions_per_group() {
        for age in AgeGroup::ALL {
            assert_eq!(age.suggestions().len(), 4);
        }
        assert_eq!(
            AgeGroup::Toddler.suggestions()[0],
            "How to handle tantrums gently?"
        );
    }

    #[test]
    fn text_turn_replays_history_without_images() {
        let store = conversation(vec![
            NewMessage::assistant("Welcome!"),
            NewMessage::user("What is this rash?", Some(image())),
            NewMessage::assistant("It looks like mild eczema."),
            NewMessage::user("How do I soothe it?", None),
        ]);
        let (history, turn) = store.snapshot().split_at(3);
        let outbound = assemble(history, &turn[0], AgeGroup::Infant, &ModelPolicy::default());

        assert_eq!(outbound.kind, TurnKind::Text);
        assert_eq!(outbound.model, Model::Known(KnownModel::Gemini25FlashLite));
        let contents = &outbound.request.contents;
        assert_eq!(contents.len(), 4);
        let roles: Vec<_> = contents.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                Some(ContentRole::Model),
                Some(ContentRole::User),
                Some(ContentRole::Model),
                Some(ContentRole::User)
            ]
        );
        assert!(
            contents
                .iter()
                .flat_map(|c| &c.parts)
                .all(|p| p.inline_data.is_none())
        );
        assert_eq!(contents[1].text(), "What is this rash?");
        assert_eq!(contents[3].text(), "How do I soothe it?");
        assert_eq!(
            outbound.request.system_instruction_text(),
            Some(system_instruction(AgeGroup::Infant))
        );
    }

    #[test]
    fn text_turn_skips_empty_placeholders() {
        let store = conversation(vec![
            NewMessage::user("first try", None),
            NewMessage::assistant(""),
            NewMessage::assistant("I apologize, but I encountered a temporary issue."),
            NewMessage::user("second try", None),
        ]);
        let (history, turn) = store.snapshot().split_at(3);
        let outbound = assemble(history, &turn[0], AgeGroup::Toddler, &ModelPolicy::default());
        let texts: Vec<String> = outbound.request.contents.iter().map(Content::text).collect();
        assert_eq!(
            texts,
            vec![
                "first try",
                "I apologize, but I encountered a temporary issue.",
                "second try"
            ]
        );
    }

    #[test]
    fn image_turn_has_no_history() {
        let store = conversation(vec![
            NewMessage::assistant("Welcome!"),
            NewMessage::user("Earlier question", None),
            NewMessage::assistant("Earlier answer"),
            NewMessage::user("Is this drawing typical?", Some(image())),
        ]);
        let (history, turn) = store.snapshot().split_at(3);
        let outbound = assemble(
            history,
            &turn[0],
            AgeGroup::SchoolAge,
            &ModelPolicy::default(),
        );

        assert_eq!(outbound.kind, TurnKind::Image);
        assert_eq!(outbound.model, Model::Known(KnownModel::Gemini3ProPreview));
        assert_eq!(outbound.request.contents.len(), 1);
        let parts = &outbound.request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().mime_type, "image/jpeg");
        assert_eq!(parts[1].text.as_deref(), Some("Is this drawing typical?"));
    }

    #[test]
    fn image_turn_without_text_uses_default_prompt() {
        let store = conversation(vec![NewMessage::user("", Some(image()))]);
        let turn = &store.snapshot()[0];
        let outbound = assemble(&[], turn, AgeGroup::Toddler, &ModelPolicy::default());
        assert_eq!(
            outbound.request.contents[0].parts[1].text.as_deref(),
            Some(DEFAULT_IMAGE_PROMPT)
        );
        assert_eq!(turn.text(), "");
    }

    #[test]
    fn custom_policy() {
        let policy = ModelPolicy {
            text_model: Model::Known(KnownModel::Gemini25Flash),
            image_model: Model::Custom("vision-tuned".to_string()),
        };
        assert_eq!(policy.select(false), &Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(policy.select(true), &Model::Custom("vision-tuned".to_string()));
    }
}
