//! The remote fortune generator seam.
//!
//! Generation runs in two steps: structured fortune text first, then a
//! figurine image rendered from the text's visual prompt. The controller
//! only talks to this trait, so tests can script both steps.

use std::future::Future;

use paw_fortune_core::{FortuneData, UserProfile};

use crate::gemini::GeminiError;

/// Why a generation step failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The Gemini API call failed.
    #[error(transparent)]
    Gemini(#[from] GeminiError),

    /// Any other generator failure.
    #[error("{0}")]
    Other(String),
}

/// Produces fortune text and images.
pub trait FortuneGenerator {
    /// Generate structured fortune text for `profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails or returns unusable output.
    fn generate_fortune(
        &self,
        profile: &UserProfile,
    ) -> impl Future<Output = Result<FortuneData, GenerationError>> + Send;

    /// Render the figurine image, returned as a `data:` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails or returns no image.
    fn generate_image(
        &self,
        visual_prompt: &str,
        base_label: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

impl<G: FortuneGenerator + Sync> FortuneGenerator for &G {
    fn generate_fortune(
        &self,
        profile: &UserProfile,
    ) -> impl Future<Output = Result<FortuneData, GenerationError>> + Send {
        (**self).generate_fortune(profile)
    }

    fn generate_image(
        &self,
        visual_prompt: &str,
        base_label: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        (**self).generate_image(visual_prompt, base_label)
    }
}
