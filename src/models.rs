use serde::{Deserialize, Serialize};

use crate::category::{Category, ACCEPTED_EXTENSIONS};
use crate::decision::{Label, Tone};

/// Envelope wrapping every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub logged_in: bool,
    pub username: Option<String>,
}

/// One sidebar entry.
#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub slug: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub prompt: &'static str,
    pub caption: &'static str,
    pub resolution: u32,
    pub accepted_extensions: &'static [&'static str],
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            slug: category.slug(),
            name: category.name(),
            title: category.menu_title(),
            icon: category.icon(),
            prompt: category.upload_prompt(),
            caption: category.preview_caption(),
            resolution: category.resolution(),
            accepted_extensions: ACCEPTED_EXTENSIONS,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub category: Category,
    pub label: Label,
    /// Short human-readable label, e.g. "infected"
    pub label_text: &'static str,
    pub banner: &'static str,
    pub tone: Tone,
    pub scores: Vec<f32>,
}

impl PredictionResponse {
    pub fn new(category: Category, label: Label, scores: Vec<f32>) -> Self {
        Self {
            category,
            label,
            label_text: label.as_str(),
            banner: label.banner(),
            tone: label.tone(),
            scores,
        }
    }
}
