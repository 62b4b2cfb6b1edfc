use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use logo_types::providers::ImageGenerator;

pub mod models;

pub const DALLE_MODEL: &str = "dall-e-3";
pub const IMAGE_SIZE: &str = "1024x1024";

/// Image generation through the OpenAI images API.
pub struct DalleClient {
    api_key: String,
    api_base: String,
    http: reqwest::Client,
}

impl DalleClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            logo_types::consts::get_openai_api_key()?,
            logo_types::consts::get_openai_api_base(),
        ))
    }

    async fn dalle_request(&self, prompt: &str) -> Result<models::ImageResponse> {
        let request = models::ImageRequest {
            model: DALLE_MODEL,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            quality: "standard",
            style: "vivid",
        };

        tracing::debug!("Calling to Dalle w/ {}", prompt);
        let response = self
            .http
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach the OpenAI images API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read the OpenAI images response")?;

        if !status.is_success() {
            let message = serde_json::from_str::<models::ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(anyhow!("OpenAI image request failed ({}): {}", status, message));
        }

        serde_json::from_str(&body)
            .context("Couldn't parse OpenAI response into ImageResponse")
    }
}

#[async_trait]
impl ImageGenerator for DalleClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let response = self.dalle_request(prompt).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("No image URL returned from OpenAI"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_image_returns_first_url() {
        let router = Router::new().route(
            "/images/generations",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "dall-e-3");
                assert_eq!(body["size"], "1024x1024");
                assert_eq!(body["n"], 1);
                Json(json!({
                    "created": 1,
                    "data": [{"url": "https://images.example/lion.png", "revised_prompt": body["prompt"]}]
                }))
            }),
        );
        let client = DalleClient::new("sk-test", serve(router).await);

        let url = client.generate_image("A blue lion").await.unwrap();
        assert_eq!(url, "https://images.example/lion.png");
    }

    #[tokio::test]
    async fn test_missing_url_is_a_failure() {
        let router = Router::new().route(
            "/images/generations",
            post(|| async { Json(json!({"created": 1, "data": []})) }),
        );
        let client = DalleClient::new("sk-test", serve(router).await);

        let err = client.generate_image("A blue lion").await.unwrap_err();
        assert_eq!(err.to_string(), "No image URL returned from OpenAI");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_provider_message() {
        let router = Router::new().route(
            "/images/generations",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"message": "Your request was rejected"}})),
                )
            }),
        );
        let client = DalleClient::new("sk-test", serve(router).await);

        let err = client.generate_image("A blue lion").await.unwrap_err();
        assert!(err.to_string().contains("Your request was rejected"));
    }
}
