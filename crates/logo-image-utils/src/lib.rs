use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use logo_types::providers::ImageHost;
use tokio::fs::create_dir_all;

pub struct DownloadedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl DownloadedImage {
    /// File extension from the response content type, png when unknown.
    pub fn extension(&self) -> &'static str {
        let essence = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match essence.as_deref() {
            Some("image/jpeg") | Some("image/jpg") => "jpg",
            Some("image/webp") => "webp",
            Some(other) => mime_guess::get_mime_extensions_str(other)
                .and_then(|exts| exts.first().copied())
                .unwrap_or("png"),
            None => "png",
        }
    }
}

pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<DownloadedImage> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download image from URL: {}", url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Image download failed with status: {}", status));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .bytes()
        .await
        .context("Failed to get bytes from image response")?;

    if bytes.is_empty() {
        return Err(anyhow!("Downloaded image from {} is empty", url));
    }
    Ok(DownloadedImage {
        bytes,
        content_type,
    })
}

pub async fn save_image(image_bytes: &[u8], filename: &Path) -> Result<()> {
    if let Some(parent) = filename.parent() {
        create_dir_all(parent).await.with_context(|| {
            format!("Failed to create directory '{}'", parent.display())
        })?;
    }
    tokio::fs::write(filename, image_bytes)
        .await
        .with_context(|| format!("Error writing to file: {}", filename.display()))
}

/// Keeps generated logos on local disk and hands out URLs under
/// `{public_url}/images/`, which the server serves from the same directory.
pub struct LocalImageHost {
    images_dir: PathBuf,
    public_url: String,
    http: reqwest::Client,
}

impl LocalImageHost {
    pub fn new(images_dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            images_dir: images_dir.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}

fn safe_segment(segment: &str) -> Result<&str> {
    let ok = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(segment)
    } else {
        Err(anyhow!("Refusing to store image under '{}'", segment))
    }
}

#[async_trait]
impl ImageHost for LocalImageHost {
    async fn rehost(
        &self,
        user_id: &str,
        generation_id: &str,
        source_url: &str,
    ) -> Result<String> {
        // User ids are arbitrary strings, so only the generation id names the file.
        let generation_id = safe_segment(generation_id)?;

        let image = download_image(&self.http, source_url).await?;
        let filename = format!("{}.{}", generation_id, image.extension());
        let path = self.images_dir.join(&filename);

        save_image(&image.bytes, &path).await?;
        tracing::info!("Saved logo for {} to {}", user_id, path.display());

        Ok(format!("{}/images/{}", self.public_url, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, routing::get, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("logo-images-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_rehost_writes_file_and_returns_public_url() {
        let router = Router::new().route(
            "/lion.jpg",
            get(|| async { ([(header::CONTENT_TYPE, "image/jpeg")], vec![1u8, 2, 3]) }),
        );
        let base = serve(router).await;
        let dir = temp_dir();
        let host = LocalImageHost::new(&dir, "http://logos.test/");

        let url = host
            .rehost("u1", "gen-1", &format!("{}/lion.jpg", base))
            .await
            .unwrap();

        assert_eq!(url, "http://logos.test/images/gen-1.jpg");
        let saved = tokio::fs::read(dir.join("gen-1.jpg")).await.unwrap();
        assert_eq!(saved, vec![1u8, 2, 3]);
        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_rehost_rejects_path_like_generation_ids() {
        let host = LocalImageHost::new(temp_dir(), "http://logos.test");
        assert!(host.rehost("u1", "a/b", "http://unused").await.is_err());
        assert!(host.rehost("u1", "..", "http://unused").await.is_err());
    }

    #[tokio::test]
    async fn test_rehost_accepts_any_user_id() {
        let router = Router::new().route(
            "/owl.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![9u8]) }),
        );
        let base = serve(router).await;
        let dir = temp_dir();
        let host = LocalImageHost::new(&dir, "http://logos.test");

        let url = host
            .rehost("alice@example.com", "gen-2", &format!("{}/owl.png", base))
            .await
            .unwrap();
        assert_eq!(url, "http://logos.test/images/gen-2.png");
        assert!(dir.join("gen-2.png").exists());
        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_failed_download_is_an_error() {
        let base = serve(Router::new()).await;
        let host = LocalImageHost::new(temp_dir(), "http://logos.test");
        assert!(host
            .rehost("u1", "gen-1", &format!("{}/missing.png", base))
            .await
            .is_err());
    }

    #[test]
    fn test_extension_defaults_to_png() {
        let image = DownloadedImage {
            bytes: Bytes::from_static(b"x"),
            content_type: None,
        };
        assert_eq!(image.extension(), "png");

        let image = DownloadedImage {
            bytes: Bytes::from_static(b"x"),
            content_type: Some("image/png; charset=binary".to_string()),
        };
        assert_eq!(image.extension(), "png");
    }
}
