//! The app side of logo generation: a session store that tracks the current
//! generation, a backend that talks to the server, and a local cache of the
//! projects this device created.

use anyhow::{anyhow, Result};
use logo_types::consts::{LOGO_FAILED, NOT_AUTHENTICATED, PROJECT_NOT_FOUND, PROMPT_FAILED};
use logo_types::wire::{
    GenerateLogoRequest, GenerateLogoResponse, GeneratePromptRequest, ProjectRequest,
    ProjectsRequest,
};
use logo_types::{non_blank, validate_prompt, Generation, LogoStyle};
use tokio::sync::Mutex;

pub mod backend;
pub mod lifecycle;
pub mod projects;
pub mod store;

pub use backend::{HttpBackend, LogoBackend};
pub use lifecycle::{CurrentGeneration, Status, Transition};
pub use projects::ProjectCache;
pub use store::{LogoState, LogoStore};


/// What the user filled in on the create screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoForm {
    pub prompt: String,
    pub style: LogoStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLogo {
    pub image_url: String,
    pub project_id: String,
}

pub struct LogoClient<B> {
    backend: B,
    store: LogoStore,
    user_id: Option<String>,
    cache: Option<Mutex<ProjectCache>>,
}

impl<B: LogoBackend> LogoClient<B> {
    pub fn new(backend: B, store: LogoStore) -> Self {
        Self {
            backend,
            store,
            user_id: None,
            cache: None,
        }
    }

    pub fn signed_in(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_cache(mut self, cache: ProjectCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    pub fn store(&self) -> &LogoStore {
        &self.store
    }

    pub fn user_id(&self) -> Option<&str> {
        non_blank(self.user_id.as_deref())
    }

    /// Runs one generation through the store: processing as soon as the
    /// form is accepted, then done or error once the server answers.
    ///
    /// An invalid form is rejected before anything is dispatched. A second
    /// submit while one is in flight is rejected by the store.
    pub async fn generate_logo(&self, form: LogoForm) -> Result<GeneratedLogo> {
        validate_prompt(&form.prompt).map_err(|reason| anyhow!(reason))?;

        self.store.dispatch(Transition::Submit {
            prompt: form.prompt.clone(),
            style: form.style,
        })?;

        match self.request_logo(&form).await {
            Ok(logo) => {
                if let Err(e) = self.store.dispatch(Transition::Succeed {
                    logo_url: logo.image_url.clone(),
                    project_id: logo.project_id.clone(),
                }) {
                    tracing::warn!("Finished generation no longer in progress: {}", e);
                }
                self.remember_project(&logo.project_id).await;
                Ok(logo)
            }
            Err(e) => {
                if let Err(dispatch) = self.store.dispatch(Transition::Fail {
                    message: e.to_string(),
                }) {
                    tracing::warn!("Failed generation no longer in progress: {}", dispatch);
                }
                Err(e)
            }
        }
    }

    async fn request_logo(&self, form: &LogoForm) -> Result<GeneratedLogo> {
        let user_id = self.user_id().ok_or_else(|| anyhow!(NOT_AUTHENTICATED))?;

        let response = self
            .backend
            .generate_logo(GenerateLogoRequest {
                prompt: form.prompt.clone(),
                style: form.style,
                user_id: Some(user_id.to_string()),
            })
            .await?;

        match response {
            GenerateLogoResponse {
                success: true,
                image_url: Some(image_url),
                project_id: Some(project_id),
                ..
            } => Ok(GeneratedLogo {
                image_url,
                project_id,
            }),
            other => Err(anyhow!(other
                .error
                .unwrap_or_else(|| LOGO_FAILED.to_string()))),
        }
    }

    /// Pulls the server's copy of a new project into the store and the
    /// local cache. The generation already succeeded, so failures here are
    /// only logged.
    async fn remember_project(&self, project_id: &str) {
        let project = match self.project(project_id).await {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!("Couldn't fetch new project {}: {}", project_id, e);
                return;
            }
        };

        self.store.set_latest_project(Some(project.clone()));
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.lock().await.add_project(project).await {
                tracing::warn!("Couldn't cache project {}: {:?}", project_id, e);
            }
        }
    }

    /// Asks the server for a prompt to fill the form with.
    pub async fn suggest_prompt(&self, style: LogoStyle) -> Result<String> {
        if self.user_id().is_none() {
            return Err(anyhow!(NOT_AUTHENTICATED));
        }

        let response = self
            .backend
            .generate_logo_prompt(GeneratePromptRequest { style: Some(style) })
            .await?;
        match response.prompt {
            Some(prompt) if response.success => Ok(prompt),
            _ => Err(anyhow!(response
                .error
                .unwrap_or_else(|| PROMPT_FAILED.to_string()))),
        }
    }

    /// The user's finished projects, newest first.
    pub async fn projects(&self) -> Result<Vec<Generation>> {
        let user_id = self.user_id().ok_or_else(|| anyhow!(NOT_AUTHENTICATED))?;

        let response = self
            .backend
            .get_user_projects(ProjectsRequest {
                user_id: Some(user_id.to_string()),
            })
            .await?;
        match response.projects {
            Some(projects) if response.success => Ok(projects),
            _ => Err(anyhow!(response
                .error
                .unwrap_or_else(|| "Failed to load projects".to_string()))),
        }
    }

    /// One of the user's generations, whatever its status. A cached copy is
    /// refreshed with what the server returns; a failed cache write is only
    /// logged.
    pub async fn project(&self, project_id: &str) -> Result<Generation> {
        let user_id = self.user_id().ok_or_else(|| anyhow!(NOT_AUTHENTICATED))?;

        let response = self
            .backend
            .get_user_project_by_id(ProjectRequest {
                user_id: Some(user_id.to_string()),
                project_id: Some(project_id.to_string()),
            })
            .await?;
        let project = match response.project {
            Some(project) if response.success => project,
            _ => {
                return Err(anyhow!(response
                    .error
                    .unwrap_or_else(|| PROJECT_NOT_FOUND.to_string())))
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.lock().await.replace_project(project.clone()).await {
                tracing::warn!("Couldn't refresh cached project {}: {:?}", project_id, e);
            }
        }
        Ok(project)
    }

    /// Projects this device has cached, newest first.
    pub async fn cached_projects(&self) -> Vec<Generation> {
        match &self.cache {
            Some(cache) => cache.lock().await.projects().to_vec(),
            None => Vec::new(),
        }
    }

    /// Leaves a finished or failed generation so a new one can be started.
    pub fn try_again(&self) -> Result<()> {
        self.store.reset()
    }
}
