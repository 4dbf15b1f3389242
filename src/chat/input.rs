//! Pending input: the draft text and staged image not yet sent.

use std::path::Path;

use crate::error::Result;
use crate::types::ImageAttachment;

/// What a committed send hands to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The text exactly as typed (untrimmed, possibly empty).
    pub text: String,
    pub image: Option<ImageAttachment>,
}

/// Draft text plus at most one staged image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInput {
    draft: String,
    image: Option<ImageAttachment>,
}

impl PendingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the draft text.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Stages `image`, returning the image it replaces.
    pub fn stage_image(&mut self, image: ImageAttachment) -> Option<ImageAttachment> {
        self.image.replace(image)
    }

    /// Reads, encodes, and stages the image at `path`.
    ///
    /// On error the previously staged image, if any, stays staged.
    pub fn stage_image_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&ImageAttachment> {
        let image = ImageAttachment::from_path(path)?;
        Ok(self.image.insert(image))
    }

    /// Unstages the image.
    pub fn clear_image(&mut self) -> Option<ImageAttachment> {
        self.image.take()
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    /// True when there is something to send: non-blank text or an image.
    pub fn has_content(&self) -> bool {
        !self.draft.trim().is_empty() || self.image.is_some()
    }

    /// True when a send would be accepted given whether a turn is in flight.
    pub fn can_send(&self, session_active: bool) -> bool {
        !session_active && self.has_content()
    }

    /// Clears draft and image together, returning what they held.
    pub fn take(&mut self) -> Submission {
        Submission {
            text: std::mem::take(&mut self.draft),
            image: self.image.take(),
        }
    }
}
