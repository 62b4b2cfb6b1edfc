use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct ImageRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u8,
    pub size: &'a str,
    pub quality: &'a str,
    pub style: &'a str,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ImageResponse {
    pub created: Option<i64>,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ImageData {
    pub url: Option<String>,
    pub revised_prompt: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub message: String,
}
