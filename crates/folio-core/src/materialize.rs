//! Writes and deletes files under the site root.
//!
//! Every mutation goes through [`SiteRoot::resolve`], which refuses paths that
//! would land outside the root. Deletion is further restricted to generated
//! detail pages (`project-<digits>.html`).

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::{Error, Result};

/// Subdirectory (relative to the site root) that receives uploaded images.
pub const UPLOADS_DIR: &str = "images/uploads";

fn generated_name_re() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"(?i)^project-\d+\.html$").expect("static regex"))
}

/// Whether the basename of `path` follows the generated detail page convention.
pub fn is_generated_page(path: &str) -> bool {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    generated_name_re().is_match(base)
}

/// Site-relative path of the generated detail page for a project id.
pub fn generated_page_path(id: i64) -> String {
    format!("./project-{id}.html")
}

/// Lexically normalize a site-relative path into its components.
///
/// `./` prefixes and `.` components are dropped, `..` pops a component.
/// Returns `None` for empty or absolute paths and for paths that climb above
/// the root.
pub fn normalize_relative(relative: &str) -> Option<Vec<&OsStr>> {
    let trimmed = relative.trim();
    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!parts.is_empty()).then_some(parts)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    AlreadyExists(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteRefusal {
    NotGenerated,
    UnsafePath,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DeleteRefusal>,
}

impl DeleteOutcome {
    fn deleted() -> Self {
        Self {
            deleted: true,
            reason: None,
        }
    }

    fn refused(reason: DeleteRefusal) -> Self {
        Self {
            deleted: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteRoot {
    root: PathBuf,
}

impl SiteRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a site-relative path, refusing anything that escapes the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let parts = normalize_relative(relative)
            .ok_or_else(|| Error::UnsafePath(relative.to_string()))?;
        let mut resolved = self.root.clone();
        resolved.extend(parts);
        Ok(resolved)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        fs::read_to_string(&path).map_err(|e| Error::io(&path, e))
    }

    pub fn exists(&self, relative: &str) -> Result<bool> {
        Ok(self.resolve(relative)?.exists())
    }

    /// Write `content`, replacing any existing file.
    pub fn write(&self, relative: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(relative)?;
        write_atomic(&path, content)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(path)
    }

    /// Write `content` only if nothing exists at the target yet.
    pub fn write_new(&self, relative: &str, content: &[u8]) -> Result<WriteOutcome> {
        let path = self.resolve(relative)?;
        if path.exists() {
            return Ok(WriteOutcome::AlreadyExists(path));
        }
        write_atomic(&path, content)?;
        tracing::debug!(path = %path.display(), "created file");
        Ok(WriteOutcome::Written(path))
    }

    /// Delete a generated detail page. Refusals are reported, not raised.
    pub fn delete_generated(&self, relative: &str) -> Result<DeleteOutcome> {
        let path = match self.resolve(relative) {
            Ok(p) => p,
            Err(Error::UnsafePath(_)) => return Ok(DeleteOutcome::refused(DeleteRefusal::UnsafePath)),
            Err(e) => return Err(e),
        };
        if !is_generated_page(relative) {
            return Ok(DeleteOutcome::refused(DeleteRefusal::NotGenerated));
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted generated page");
                Ok(DeleteOutcome::deleted())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(DeleteOutcome::refused(DeleteRefusal::NotFound))
            }
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// Generated detail pages currently present at the top of the site root,
    /// as `./project-N.html` paths, sorted.
    pub fn list_generated(&self) -> Result<Vec<String>> {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let pattern = Path::new(&root).join("project-*.html");
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob_with(
            &pattern,
            glob::MatchOptions {
                case_sensitive: false,
                ..Default::default()
            },
        )
        .map_err(|e| Error::Invalid(format!("bad glob pattern {pattern}: {e}")))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .filter(|name| is_generated_page(name))
            .map(|name| format!("./{name}"))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Store an uploaded image and return its site-relative path.
    pub fn store_upload(&self, mime_type: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::Invalid("uploaded image is empty".to_string()));
        }
        let ext = image_extension(mime_type);
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            &id[..8],
            ext
        );
        let relative = format!("{UPLOADS_DIR}/{name}");
        self.write(&relative, bytes)?;
        tracing::info!(path = %relative, bytes = bytes.len(), "stored upload");
        Ok(relative)
    }
}

fn image_extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "png",
    }
}

/// Temp file + rename so readers never see a half-written document.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, content).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}
