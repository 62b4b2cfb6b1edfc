use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use logo_types::providers::PromptWriter;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize, Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    text: Option<String>,
}

/// Text generation through the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    api_base: String,
    model: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: GEMINI_MODEL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            logo_types::consts::get_gemini_api_key()?,
            logo_types::consts::get_gemini_api_base(),
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "contents": [{"parts": [{"text": prompt}]}]
        });

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini request failed with status {}: {}", status, body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Couldn't parse Gemini response")?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<String>>()
            .join("");

        if text.trim().is_empty() {
            return Err(anyhow!("Gemini returned no text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl PromptWriter for GeminiClient {
    async fn write_prompt(&self, instruction: &str) -> Result<String> {
        self.generate_content(instruction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{StatusCode, Uri},
        Json, Router,
    };
    use serde_json::Value;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_content_joins_parts() {
        // The model path has a colon in it, so match it by hand.
        let router = Router::new().fallback(
            |uri: Uri, Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                if uri.path() != "/models/gemini-2.0-flash:generateContent"
                    || query.get("key").map(String::as_str) != Some("test-key")
                {
                    return (StatusCode::UNAUTHORIZED, Json(json!({})));
                }
                let prompt = body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                (
                    StatusCode::OK,
                    Json(json!({
                        "candidates": [{"content": {"parts": [
                            {"text": "  A fox "},
                            {"text": format!("({} chars)\n", prompt.len())}
                        ]}}]
                    })),
                )
            },
        );
        let client = GeminiClient::new("test-key", serve(router).await);

        let text = client.write_prompt("hello").await.unwrap();
        assert_eq!(text, "  A fox (5 chars)\n");
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let router = Router::new()
            .fallback(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") });
        let client = GeminiClient::new("test-key", serve(router).await);

        let err = client.write_prompt("hello").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_a_failure() {
        let router =
            Router::new().fallback(|| async { Json(json!({"candidates": []})) });
        let client = GeminiClient::new("test-key", serve(router).await);

        assert!(client.write_prompt("hello").await.is_err());
    }
}
