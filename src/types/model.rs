use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a generative-language model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 3 Pro (preview); used for image analysis.
    #[serde(rename = "gemini-3-pro-preview")]
    Gemini3ProPreview,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Flash Lite; used for fast text turns.
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
}

impl KnownModel {
    /// Every known model, in declaration order.
    pub const ALL: [KnownModel; 4] = [
        KnownModel::Gemini3ProPreview,
        KnownModel::Gemini25Pro,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25FlashLite,
    ];

    /// The identifier used in request paths.
    pub fn as_str(self) -> &'static str {
        match self {
            KnownModel::Gemini3ProPreview => "gemini-3-pro-preview",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
        }
    }
}

impl Model {
    /// The identifier used in request paths.
    pub fn as_str(&self) -> &str {
        match self {
            Model::Known(known) => known.as_str(),
            Model::Custom(custom) => custom,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("models/");
        KnownModel::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl FromStr for Model {
    type Err = String;

    /// Parses a known model, falling back to [`Model::Custom`] for anything
    /// non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("model name must not be empty".to_string());
        }
        Ok(trimmed
            .parse::<KnownModel>()
            .map(Model::Known)
            .unwrap_or_else(|_| Model::Custom(trimmed.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}
