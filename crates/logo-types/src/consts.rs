use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;

pub const DEFAULT_PROMPT: &str = "A blue lion logo reading 'HEXA' in bold letters";

pub const MAX_PROMPT_LENGTH: usize = 500;

/// Number of projects returned by a single history query.
pub const PROJECTS_PAGE_SIZE: i64 = 20;

/// Shown while a generation is processing. Not a timeout.
pub const PROCESSING_HINT: &str = "Your logo will be ready in 2 minutes";

pub const NOT_AUTHENTICATED: &str = "User not authenticated";
pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const PROJECT_ID_REQUIRED: &str = "Project ID is required";
pub const PROMPT_FAILED: &str =
    "Failed to generate a creative prompt. Please try again.";
pub const LOGO_FAILED: &str = "Failed to generate logo";

fn env_or(key: &str, default: &str) -> String {
    dotenv::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn required(key: &str) -> Result<String> {
    dotenv::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{} must be set", key))
}

pub fn get_database_url() -> String {
    static DATABASE_URL: OnceCell<String> = OnceCell::new();
    DATABASE_URL
        .get_or_init(|| env_or("DATABASE_URL", "sqlite://logos.db"))
        .clone()
}

pub fn get_openai_api_key() -> Result<String> {
    required("OPENAI_API_KEY")
}

pub fn get_gemini_api_key() -> Result<String> {
    required("GEMINI_API_KEY")
}

pub fn get_openai_api_base() -> String {
    env_or("OPENAI_API_BASE", "https://api.openai.com/v1")
}

pub fn get_gemini_api_base() -> String {
    env_or(
        "GEMINI_API_BASE",
        "https://generativelanguage.googleapis.com/v1beta",
    )
}

/// Where re-hosted logos are written.
pub fn get_logo_images_dir() -> String {
    env_or("LOGO_IMAGES_DIR", "./tmp/logos")
}

/// Public base URL of this server, used to build re-hosted image URLs.
pub fn get_public_url() -> String {
    env_or("LOGO_PUBLIC_URL", "http://localhost:4001")
}

pub fn get_api_url() -> String {
    env_or("LOGO_API_URL", "http://localhost:4001")
}

pub fn get_cache_path() -> String {
    env_or("LOGO_CACHE_PATH", "./tmp/logo-projects.json")
}

pub fn get_rehost_images() -> bool {
    !matches!(
        env_or("LOGO_REHOST_IMAGES", "true").to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

/// The signed-in user for the command line client.
pub fn get_user_id() -> Option<String> {
    dotenv::var("LOGO_USER_ID")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
