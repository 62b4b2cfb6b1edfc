//! The four callable functions behind the app: generate a logo, suggest a
//! prompt, list a user's projects, and fetch one project.
//!
//! Every function answers with a response struct. Failures never escape as
//! errors; they become `success: false` with a message for the user.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use logo_db::generations;
use logo_types::consts::{
    LOGO_FAILED, MAX_PROMPT_LENGTH, NOT_AUTHENTICATED, PROJECTS_PAGE_SIZE,
    PROJECT_ID_REQUIRED, PROJECT_NOT_FOUND, PROMPT_FAILED,
};
use logo_types::providers::{ImageGenerator, ImageHost, PromptWriter};
use logo_types::wire::{
    GenerateLogoRequest, GenerateLogoResponse, GeneratePromptRequest,
    GeneratePromptResponse, ProjectRequest, ProjectResponse, ProjectsRequest,
    ProjectsResponse,
};
use logo_types::{non_blank, styles, validate_prompt, Generation, GenerationStatus};
use sqlx::SqlitePool;


pub struct LogoFunctions {
    pool: SqlitePool,
    images: Arc<dyn ImageGenerator>,
    prompts: Arc<dyn PromptWriter>,
    image_host: Option<Arc<dyn ImageHost>>,
}

impl LogoFunctions {
    pub fn new(
        pool: SqlitePool,
        images: Arc<dyn ImageGenerator>,
        prompts: Arc<dyn PromptWriter>,
    ) -> Self {
        Self {
            pool,
            images,
            prompts,
            image_host: None,
        }
    }

    /// Re-upload every generated image through `host` before it is saved.
    pub fn with_image_host(mut self, host: Arc<dyn ImageHost>) -> Self {
        self.image_host = Some(host);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn generate_logo(
        &self,
        request: GenerateLogoRequest,
    ) -> GenerateLogoResponse {
        let Some(user_id) = non_blank(request.user_id.as_deref()) else {
            return GenerateLogoResponse::failed(NOT_AUTHENTICATED);
        };
        if let Err(reason) = validate_prompt(&request.prompt) {
            return GenerateLogoResponse::failed(reason);
        }

        let generation = match generations::create(
            &self.pool,
            user_id,
            request.prompt.trim(),
            request.style,
        )
        .await
        {
            Ok(generation) => generation,
            Err(e) => {
                tracing::error!("Error creating generation for {}: {:?}", user_id, e);
                return GenerateLogoResponse::failed(LOGO_FAILED);
            }
        };

        tracing::info!(
            "Generating logo for user {}, generation {}",
            user_id,
            generation.id
        );

        match self.run_generation(user_id, &generation).await {
            Ok(Generation {
                id,
                image_url: Some(image_url),
                ..
            }) => GenerateLogoResponse::done(image_url, id),
            Ok(_) => GenerateLogoResponse::failed(LOGO_FAILED),
            Err(e) => GenerateLogoResponse::failed(failure_message(&e)),
        }
    }

    /// Runs a record that is still processing, the way a document trigger
    /// would. Records already done or failed are left alone and yield `None`.
    pub async fn process_pending(
        &self,
        user_id: &str,
        generation_id: &str,
    ) -> Result<Option<Generation>> {
        let generation = generations::find(&self.pool, user_id, generation_id)
            .await?
            .ok_or_else(|| anyhow!("Generation {} not found", generation_id))?;

        if generation.status != GenerationStatus::Processing {
            tracing::info!(
                "Skipping generation {} with status: {}",
                generation_id,
                generation.status
            );
            return Ok(None);
        }

        self.run_generation(user_id, &generation).await.map(Some)
    }

    pub async fn generate_logo_prompt(
        &self,
        request: GeneratePromptRequest,
    ) -> GeneratePromptResponse {
        let style = request.style.unwrap_or_default();
        let instruction = styles::suggestion_prompt(style);

        match self.prompts.write_prompt(&instruction).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::error!("Prompt provider returned an empty suggestion");
                    return GeneratePromptResponse::failed(PROMPT_FAILED);
                }
                // The suggestion lands in the prompt field, so it has to fit.
                let prompt: String = text.chars().take(MAX_PROMPT_LENGTH).collect();
                GeneratePromptResponse::suggested(prompt.trim_end().to_string())
            }
            Err(e) => {
                tracing::error!("Error generating logo prompt: {:?}", e);
                GeneratePromptResponse::failed(PROMPT_FAILED)
            }
        }
    }

    pub async fn get_user_projects(&self, request: ProjectsRequest) -> ProjectsResponse {
        let Some(user_id) = non_blank(request.user_id.as_deref()) else {
            return ProjectsResponse::failed(NOT_AUTHENTICATED);
        };

        match generations::list_done(&self.pool, user_id, PROJECTS_PAGE_SIZE).await {
            Ok(projects) => ProjectsResponse::found(projects),
            Err(e) => {
                tracing::error!("Error fetching projects for {}: {:?}", user_id, e);
                ProjectsResponse::failed("Failed to fetch projects")
            }
        }
    }

    pub async fn get_user_project_by_id(&self, request: ProjectRequest) -> ProjectResponse {
        let Some(user_id) = non_blank(request.user_id.as_deref()) else {
            return ProjectResponse::failed(NOT_AUTHENTICATED);
        };
        let Some(project_id) = non_blank(request.project_id.as_deref()) else {
            return ProjectResponse::failed(PROJECT_ID_REQUIRED);
        };

        match generations::find(&self.pool, user_id, project_id).await {
            Ok(Some(project)) => ProjectResponse::found(project),
            Ok(None) => ProjectResponse::failed(PROJECT_NOT_FOUND),
            Err(e) => {
                tracing::error!("Error fetching project {}: {:?}", project_id, e);
                ProjectResponse::failed("Failed to fetch project")
            }
        }
    }

    // Creation already happened; from here every failure is written back to
    // the record so it ends in exactly one terminal state.
    async fn run_generation(
        &self,
        user_id: &str,
        generation: &Generation,
    ) -> Result<Generation> {
        let outcome = match self.render_logo(user_id, generation).await {
            Ok(image_url) => {
                generations::mark_done(&self.pool, user_id, &generation.id, &image_url)
                    .await
            }
            Err(e) => Err(e),
        };

        let e = match outcome {
            Ok(done) => {
                tracing::info!("Successfully generated logo for {}", generation.id);
                return Ok(done);
            }
            Err(e) => e,
        };

        tracing::error!("Error generating logo {}: {:?}", generation.id, e);
        if let Err(mark_err) = generations::mark_error(
            &self.pool,
            user_id,
            &generation.id,
            &failure_message(&e),
        )
        .await
        {
            tracing::error!(
                "Could not record failure for generation {}: {:?}",
                generation.id,
                mark_err
            );
        }
        Err(e)
    }

    async fn render_logo(&self, user_id: &str, generation: &Generation) -> Result<String> {
        let prompt = styles::image_prompt(&generation.prompt, generation.style);
        let provider_url = self.images.generate_image(&prompt).await?;

        match &self.image_host {
            Some(host) => host.rehost(user_id, &generation.id, &provider_url).await,
            None => Ok(provider_url),
        }
    }
}

fn failure_message(e: &anyhow::Error) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        LOGO_FAILED.to_string()
    } else {
        message
    }
}
