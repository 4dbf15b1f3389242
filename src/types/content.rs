use serde::{Deserialize, Serialize};

/// The author of a [`Content`] entry on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// Text typed (or images supplied) by the person chatting.
    User,

    /// Text produced by the model.
    Model,
}

/// Inline binary data carried inside a request part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The IANA media type of the payload, e.g. `image/png`.
    pub mime_type: String,

    /// Base64-encoded payload.
    pub data: String,
}

/// One piece of a [`Content`] entry: either text or inline data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,

    /// Set on parts that carry model reasoning rather than answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
            thought: None,
        }
    }

    /// Create an inline-data part.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            thought: None,
        }
    }

    /// Returns the answer text of this part, skipping reasoning parts.
    pub fn answer_text(&self) -> Option<&str> {
        if self.thought.unwrap_or(false) {
            return None;
        }
        self.text.as_deref()
    }
}

/// A single turn of content, as the service represents it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Absent on system instructions and on some response candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create content with the given role and parts.
    pub fn new(role: ContentRole, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role),
            parts,
        }
    }

    /// Create a user turn holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ContentRole::User, vec![Part::text(text)])
    }

    /// Create a model turn holding a single text part.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ContentRole::Model, vec![Part::text(text)])
    }

    /// Create role-less content, as used for system instructions.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenate the answer text of every part.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::answer_text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn inline_data_uses_camel_case() {
        let content = Content::new(
            ContentRole::User,
            vec![
                Part::inline_data("image/png", "iVBORw0KGgo="),
                Part::text("What is this?"),
            ],
        );
        assert_eq!(
            to_value(&content).unwrap(),
            json!({
                "role": "user",
                "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}},
                    {"text": "What is this?"}
                ]
            })
        );
    }

    #[test]
    fn system_content_has_no_role() {
        let json = to_value(Content::system("Be kind.")).unwrap();
        assert_eq!(json, json!({"parts": [{"text": "Be kind."}]}));
    }

    #[test]
    fn text_skips_thoughts() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                {"text": "pondering", "thought": true},
                {"text": "Hello"},
                {"text": ", there"}
            ]
        }))
        .unwrap();
        assert_eq!(content.role, Some(ContentRole::Model));
        assert_eq!(content.text(), "Hello, there");
    }
}
