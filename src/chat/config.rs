//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! [`ChatConfig`] that a [`ChatSession`](crate::chat::ChatSession) runs with.

use std::fmt;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::chat::prompt::{AgeGroup, ModelPolicy};
use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::types::Model;

/// Assistant message seeded into a fresh conversation.
pub const WELCOME_MESSAGE: &str = "Hello! I am your Parenting Compass. I'm here to listen and support you with practical advice tailored to your child's age.\n\nPlease select your child's age to begin, and feel free to share whatever is on your mind.";

/// Command-line arguments for the compass-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Age group of the child.
    #[arrrg(
        optional,
        "Child's age group: infant, toddler, school-age, adolescent (default: toddler)",
        "AGE"
    )]
    pub age: Option<String>,

    /// Model for text-only turns.
    #[arrrg(
        optional,
        "Model for text turns (default: gemini-2.5-flash-lite)",
        "MODEL"
    )]
    pub text_model: Option<String>,

    /// Model for turns that carry an image.
    #[arrrg(
        optional,
        "Model for image turns (default: gemini-3-pro-preview)",
        "MODEL"
    )]
    pub image_model: Option<String>,

    /// Override for the API base URL.
    #[arrrg(optional, "API base URL", "URL")]
    pub base_url: Option<String>,

    /// HTTP timeout in seconds.
    #[arrrg(optional, "HTTP request timeout in seconds (default: 300)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Start without the welcome message.
    #[arrrg(flag, "Do not seed the welcome message")]
    pub no_welcome: bool,
}

/// Reasons command-line arguments cannot become a [`ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatArgsError {
    /// The age group did not name a known group.
    InvalidAgeGroup(String),
    /// A model name was empty.
    InvalidModel(String),
    /// The timeout was zero.
    InvalidTimeout,
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::InvalidAgeGroup(message) => write!(f, "{message}"),
            ChatArgsError::InvalidModel(message) => write!(f, "invalid model: {message}"),
            ChatArgsError::InvalidTimeout => write!(f, "timeout must be at least one second"),
        }
    }
}

impl std::error::Error for ChatArgsError {}

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Age group in effect when the session starts.
    pub age_group: AgeGroup,

    /// Which model serves text turns and which serves image turns.
    pub models: ModelPolicy,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether the session opens with [`WELCOME_MESSAGE`].
    pub welcome: bool,

    /// API base URL handed to the client.
    pub base_url: String,

    /// HTTP timeout handed to the client.
    pub timeout: Duration,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Age group: toddler (2-5 Years)
    /// - Text model: gemini-2.5-flash-lite
    /// - Image model: gemini-3-pro-preview
    /// - Color: enabled
    /// - Welcome message: enabled
    pub fn new() -> Self {
        Self {
            age_group: AgeGroup::default(),
            models: ModelPolicy::default(),
            use_color: true,
            welcome: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the starting age group.
    pub fn with_age_group(mut self, age_group: AgeGroup) -> Self {
        self.age_group = age_group;
        self
    }

    /// Sets the model for text turns.
    pub fn with_text_model(mut self, model: Model) -> Self {
        self.models.text_model = model;
        self
    }

    /// Sets the model for image turns.
    pub fn with_image_model(mut self, model: Model) -> Self {
        self.models.image_model = model;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether the welcome message is seeded.
    pub fn with_welcome(mut self, welcome: bool) -> Self {
        self.welcome = welcome;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_model(name: String) -> Result<Model, ChatArgsError> {
    name.parse::<Model>()
        .map_err(|_| ChatArgsError::InvalidModel(format!("{name:?}")))
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let mut config = ChatConfig::new();
        if let Some(age) = args.age {
            config.age_group = age.parse().map_err(ChatArgsError::InvalidAgeGroup)?;
        }
        if let Some(model) = args.text_model {
            config.models.text_model = parse_model(model)?;
        }
        if let Some(model) = args.image_model {
            config.models.image_model = parse_model(model)?;
        }
        if let Some(base_url) = args.base_url {
            config.base_url = base_url;
        }
        match args.timeout_secs {
            Some(0) => return Err(ChatArgsError::InvalidTimeout),
            Some(secs) => config.timeout = Duration::from_secs(secs),
            None => {}
        }
        config.use_color = !args.no_color;
        config.welcome = !args.no_welcome;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.age_group, AgeGroup::Toddler);
        assert_eq!(
            config.models.text_model,
            Model::Known(KnownModel::Gemini25FlashLite)
        );
        assert_eq!(
            config.models.image_model,
            Model::Known(KnownModel::Gemini3ProPreview)
        );
        assert!(config.use_color);
        assert!(config.welcome);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config.age_group, AgeGroup::Toddler);
        assert!(config.use_color);
        assert!(config.welcome);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            age: Some("13-18".to_string()),
            text_model: Some("gemini-2.5-flash".to_string()),
            image_model: Some("my-vision-model".to_string()),
            base_url: Some("http://localhost:8080/v1beta/".to_string()),
            timeout_secs: Some(30),
            no_color: true,
            no_welcome: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.age_group, AgeGroup::Adolescent);
        assert_eq!(
            config.models.text_model,
            Model::Known(KnownModel::Gemini25Flash)
        );
        assert_eq!(
            config.models.image_model,
            Model::Custom("my-vision-model".to_string())
        );
        assert_eq!(config.base_url, "http://localhost:8080/v1beta/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.use_color);
        assert!(!config.welcome);
    }

    #[test]
    fn config_from_args_rejects_bad_values() {
        let args = ChatArgs {
            age: Some("teenager".to_string()),
            ..ChatArgs::default()
        };
        assert!(matches!(
            ChatConfig::try_from(args),
            Err(ChatArgsError::InvalidAgeGroup(_))
        ));

        let args = ChatArgs {
            timeout_secs: Some(0),
            ..ChatArgs::default()
        };
        assert_eq!(
            ChatConfig::try_from(args).unwrap_err(),
            ChatArgsError::InvalidTimeout
        );

        let args = ChatArgs {
            text_model: Some("  ".to_string()),
            ..ChatArgs::default()
        };
        assert!(matches!(
            ChatConfig::try_from(args),
            Err(ChatArgsError::InvalidModel(_))
        ));
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_age_group(AgeGroup::Infant)
            .with_text_model(Model::Known(KnownModel::Gemini25Pro))
            .with_image_model(Model::Known(KnownModel::Gemini25Pro))
            .without_color()
            .with_welcome(false)
            .with_base_url("https://proxy.example/v1beta/")
            .with_timeout(Duration::from_secs(10));
        assert_eq!(config.age_group, AgeGroup::Infant);
        assert_eq!(config.models.text_model, config.models.image_model);
        assert!(!config.use_color);
        assert!(!config.welcome);
        assert_eq!(config.base_url, "https://proxy.example/v1beta/");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
