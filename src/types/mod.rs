// Public modules
pub mod content;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod image_attachment;
pub mod model;

// Re-exports
pub use content::{Blob, Content, ContentRole, Part};
pub use generate_content_request::{GenerateContentRequest, GenerationConfig};
pub use generate_content_response::{
    Candidate, GenerateContentResponse, PromptFeedback, UsageMetadata,
};
pub use image_attachment::ImageAttachment;
pub use model::{KnownModel, Model};
