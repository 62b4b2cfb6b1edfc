use std::path::PathBuf;

use logo_types::consts;

/// Server settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub images_dir: PathBuf,
    pub public_url: String,
    pub rehost_images: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            database_url: consts::get_database_url(),
            images_dir: PathBuf::from(consts::get_logo_images_dir()),
            public_url: consts::get_public_url().trim_end_matches('/').to_string(),
            rehost_images: consts::get_rehost_images(),
        }
    }
}
