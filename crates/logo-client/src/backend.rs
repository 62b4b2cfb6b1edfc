use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use logo_types::wire::{
    Callable, CallableResult, GenerateLogoRequest, GenerateLogoResponse,
    GeneratePromptRequest, GeneratePromptResponse, ProjectRequest, ProjectResponse,
    ProjectsRequest, ProjectsResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The server side of the app as seen from the client.
#[async_trait]
pub trait LogoBackend: Send + Sync {
    async fn generate_logo(&self, request: GenerateLogoRequest) -> Result<GenerateLogoResponse>;

    async fn generate_logo_prompt(
        &self,
        request: GeneratePromptRequest,
    ) -> Result<GeneratePromptResponse>;

    async fn get_user_projects(&self, request: ProjectsRequest) -> Result<ProjectsResponse>;

    async fn get_user_project_by_id(&self, request: ProjectRequest) -> Result<ProjectResponse>;
}

/// Calls the server's callable endpoints over HTTP.
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn call<I, O>(&self, function: &str, data: I) -> Result<O>
    where
        I: Serialize + Send,
        O: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, function);
        let response = self
            .http
            .post(&url)
            .json(&Callable { data })
            .send()
            .await
            .with_context(|| format!("Failed to call {}", function))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{} failed with status: {}", function, status));
        }

        let body: CallableResult<O> = response
            .json()
            .await
            .with_context(|| format!("Couldn't parse the {} response", function))?;
        Ok(body.result)
    }
}

#[async_trait]
impl LogoBackend for HttpBackend {
    async fn generate_logo(&self, request: GenerateLogoRequest) -> Result<GenerateLogoResponse> {
        self.call("generateLogo", request).await
    }

    async fn generate_logo_prompt(
        &self,
        request: GeneratePromptRequest,
    ) -> Result<GeneratePromptResponse> {
        self.call("generateLogoPrompt", request).await
    }

    async fn get_user_projects(&self, request: ProjectsRequest) -> Result<ProjectsResponse> {
        self.call("getUserProjects", request).await
    }

    async fn get_user_project_by_id(&self, request: ProjectRequest) -> Result<ProjectResponse> {
        self.call("getUserProjectById", request).await
    }
}
