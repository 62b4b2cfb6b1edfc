use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use logo_types::Generation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedProjects {
    #[serde(default)]
    projects: Vec<Generation>,
    #[serde(default)]
    active_project: Option<Generation>,
}

/// Projects this device has seen, newest first, kept in a JSON file so the
/// history survives restarts.
#[derive(Debug)]
pub struct ProjectCache {
    path: PathBuf,
    cached: CachedProjects,
}

impl ProjectCache {
    /// Loads the cache from `path`. A missing file is an empty cache.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cached = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).with_context(|| {
                format!("Failed to parse project cache {}", path.display())
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CachedProjects::default(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read project cache {}", path.display())
                })
            }
        };
        Ok(Self { path, cached })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[Generation] {
        &self.cached.projects
    }

    pub fn active_project(&self) -> Option<&Generation> {
        self.cached.active_project.as_ref()
    }

    pub fn project_by_id(&self, id: &str) -> Option<&Generation> {
        self.cached.projects.iter().find(|p| p.id == id)
    }

    pub fn has_projects(&self) -> bool {
        !self.cached.projects.is_empty()
    }

    /// Puts `project` at the front and makes it the active one.
    pub async fn add_project(&mut self, project: Generation) -> Result<()> {
        self.cached.projects.retain(|p| p.id != project.id);
        self.cached.projects.insert(0, project.clone());
        self.cached.active_project = Some(project);
        self.save().await
    }

    /// Swaps in the server's copy of a project we already know about.
    /// Returns false when the id isn't cached.
    pub async fn replace_project(&mut self, project: Generation) -> Result<bool> {
        let Some(slot) = self.cached.projects.iter_mut().find(|p| p.id == project.id) else {
            return Ok(false);
        };
        *slot = project.clone();

        if self.cached.active_project.as_ref().map(|p| &p.id) == Some(&project.id) {
            self.cached.active_project = Some(project);
        }
        self.save().await?;
        Ok(true)
    }

    pub async fn set_active_project(&mut self, project: Option<Generation>) -> Result<()> {
        self.cached.active_project = project;
        self.save().await
    }

    async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create directory '{}'", parent.display())
            })?;
        }
        let raw = serde_json::to_vec_pretty(&self.cached)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use logo_types::{GenerationStatus, LogoStyle};

    fn cache_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("logo-cache-{}", uuid::Uuid::new_v4()))
            .join("projects.json")
    }

    fn project(id: &str, status: GenerationStatus) -> Generation {
        Generation {
            id: id.to_string(),
            prompt: "A fox".to_string(),
            style: LogoStyle::Abstract,
            status,
            image_url: (status == GenerationStatus::Done).then(|| format!("https://img/{}", id)),
            error: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let cache = ProjectCache::load(cache_path()).await.unwrap();
        assert!(!cache.has_projects());
        assert!(cache.active_project().is_none());
    }

    #[tokio::test]
    async fn test_projects_survive_reload() {
        let path = cache_path();
        let mut cache = ProjectCache::load(&path).await.unwrap();
        cache.add_project(project("a", GenerationStatus::Done)).await.unwrap();
        cache.add_project(project("b", GenerationStatus::Done)).await.unwrap();

        let reloaded = ProjectCache::load(&path).await.unwrap();
        let ids: Vec<&str> = reloaded.projects().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(reloaded.active_project().unwrap().id, "b");
        assert!(reloaded.project_by_id("a").is_some());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_add_existing_project_moves_it_to_front() {
        let mut cache = ProjectCache::load(cache_path()).await.unwrap();
        cache.add_project(project("a", GenerationStatus::Done)).await.unwrap();
        cache.add_project(project("b", GenerationStatus::Done)).await.unwrap();
        cache.add_project(project("a", GenerationStatus::Done)).await.unwrap();

        let ids: Vec<&str> = cache.projects().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_replace_project_overwrites_whole_entry() {
        let mut cache = ProjectCache::load(cache_path()).await.unwrap();
        cache.add_project(project("a", GenerationStatus::Processing)).await.unwrap();

        let done = project("a", GenerationStatus::Done);
        assert!(cache.replace_project(done.clone()).await.unwrap());
        assert_eq!(cache.project_by_id("a"), Some(&done));
        assert_eq!(cache.active_project(), Some(&done));

        assert!(!cache.replace_project(project("zzz", GenerationStatus::Done)).await.unwrap());
        assert_eq!(cache.projects().len(), 1);
    }
}
