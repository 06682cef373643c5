pub mod catalog;
pub mod content;
mod error;
pub mod listing;
pub mod materialize;
pub mod render;
pub mod site;
pub mod store;

pub use error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// --- Types (mirrors the editor form payloads) ---

/// One card in the listing section of the main document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Creation timestamp in milliseconds. Never changes after creation.
    pub id: i64,
    pub title: String,
    /// Plain text or a small HTML fragment
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// Inline CSS declarations applied to the card image, e.g. "object-position: top"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,
    #[serde(default)]
    pub center_image: bool,
    /// Site-relative path of the detail document, e.g. "./project-1712345678901.html"
    #[serde(default)]
    pub detail_page: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_date: Option<String>,
}

/// A single overview entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Paragraph {
        content: String,
    },
    Heading {
        content: String,
    },
    Bullet {
        content: String,
    },
    Note {
        content: String,
    },
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct BlockImage {
    pub src: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BlockImage>,
}

impl Block {
    /// True when no field carries visible content.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.subtitle)
            && is_blank(&self.description)
            && self.image.as_ref().map_or(true, |i| i.src.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct MainContent {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

impl MainContent {
    /// True when any field other than the title is set.
    pub fn has_body(&self) -> bool {
        !is_blank(&self.description)
            || !is_blank(&self.conclusion)
            || self.blocks.iter().any(|b| !b.is_empty())
    }
}

/// Legacy gallery image, superseded by main-content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct GalleryImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Body of a project's detail page.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project_id: i64,
    #[serde(default)]
    pub hero_image: String,
    #[serde(default)]
    pub meta: DetailMeta,
    #[serde(default)]
    pub overview: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_content: Option<MainContent>,
    #[serde(default)]
    pub additional_images: Vec<GalleryImage>,
    #[serde(default)]
    pub key_contributions: Vec<String>,
    #[serde(default)]
    pub future_development: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl ProjectDetail {
    /// Default detail record created alongside a new project.
    pub fn default_for(project: &ProjectSummary) -> Self {
        let summary = content::strip_tags(&project.description);
        let overview = if summary.trim().is_empty() {
            Vec::new()
        } else {
            vec![ContentItem::Paragraph {
                content: summary.trim().to_string(),
            }]
        };
        Self {
            project_id: project.id,
            hero_image: project.image.clone(),
            overview,
            ..Self::default()
        }
    }

    /// Parse a detail record from loosely-shaped JSON. Null fields are treated as absent.
    pub fn from_json_value(mut value: serde_json::Value) -> std::result::Result<Self, serde_json::Error> {
        strip_nulls(&mut value);
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectsFile {
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetailsFile {
    #[serde(default)]
    pub details: Vec<ProjectDetail>,
}

fn is_blank(s: &Option<String>) -> bool {
    s.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Remove `null` entries from every object so absent and null read the same.
pub fn strip_nulls(val: &mut serde_json::Value) {
    match val {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for (_, v) in map.iter_mut() {
                strip_nulls(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for v in arr.iter_mut() {
                strip_nulls(v);
            }
        }
        _ => {}
    }
}

// --- AI Settings ---

/// Resolve the global settings directory (~/.folio/).
pub fn settings_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".folio")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

pub fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

/// Missing or unreadable settings read as the unconfigured default.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &AiSettings) -> Result<()> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::json(path, e))?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}
