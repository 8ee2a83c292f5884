use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryStyle, InfographicId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfographicRecord {
    pub id: InfographicId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub thumbnail_url: String,
    pub page_url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InfographicRecord {
    /// Category name and style token for the badge, if the record has a category.
    pub fn category_badge(&self) -> Option<(&str, &str)> {
        let category = self.category.as_deref().filter(|c| !c.is_empty())?;
        let style = self
            .category_color
            .as_deref()
            .filter(|token| !token.is_empty())
            .unwrap_or(CategoryStyle::default_style().token);
        Some((category, style))
    }
}

/// Body of `POST /infographics`. Optional fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInfographicPayload {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: String,
    pub page_url: String,
    pub category: Option<String>,
    pub category_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
