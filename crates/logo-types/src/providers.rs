//! Seams to the external services. The generative providers are opaque:
//! a prompt goes in, an image URL or some text comes out.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns a URL the generated image can be fetched from.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait PromptWriter: Send + Sync {
    async fn write_prompt(&self, instruction: &str) -> Result<String>;
}

/// Copies a provider image into storage we own, since provider URLs expire.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn rehost(
        &self,
        user_id: &str,
        generation_id: &str,
        source_url: &str,
    ) -> Result<String>;
}
