use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::materialize::write_atomic;
use crate::{strip_nulls, DetailsFile, Error, ProjectDetail, ProjectSummary, ProjectsFile, Result};

pub const PROJECTS_FILE: &str = "projects.json";
pub const DETAILS_FILE: &str = "project-details.json";

/// JSON-backed persistence for project summaries and detail records.
///
/// Nothing is cached: every load reads the file, every save rewrites it.
#[derive(Debug, Clone)]
pub struct RecordStore {
    projects_path: PathBuf,
    details_path: PathBuf,
}

impl RecordStore {
    pub fn new(projects_path: impl Into<PathBuf>, details_path: impl Into<PathBuf>) -> Self {
        Self {
            projects_path: projects_path.into(),
            details_path: details_path.into(),
        }
    }

    /// Store using the default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PROJECTS_FILE), dir.join(DETAILS_FILE))
    }

    pub fn projects_path(&self) -> &Path {
        &self.projects_path
    }

    pub fn details_path(&self) -> &Path {
        &self.details_path
    }

    pub fn load_projects(&self) -> Result<Vec<ProjectSummary>> {
        let file: ProjectsFile = load_or_create(&self.projects_path)?;
        Ok(file.projects)
    }

    pub fn save_projects(&self, projects: &[ProjectSummary]) -> Result<()> {
        let file = ProjectsFile {
            projects: projects.to_vec(),
        };
        save(&self.projects_path, &file)
    }

    pub fn load_details(&self) -> Result<Vec<ProjectDetail>> {
        let file: DetailsFile = load_or_create(&self.details_path)?;
        Ok(file.details)
    }

    pub fn save_details(&self, details: &[ProjectDetail]) -> Result<()> {
        let file = DetailsFile {
            details: details.to_vec(),
        };
        save(&self.details_path, &file)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(self.load_projects()?, self.load_details()?))
    }

    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        self.save_projects(catalog.projects())?;
        self.save_details(catalog.details())
    }
}

/// Read a record file, writing the default document first if it is missing.
fn load_or_create<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Serialize + Default,
{
    if !path.exists() {
        let empty = T::default();
        save(path, &empty)?;
        tracing::info!(path = %path.display(), "created default record file");
        return Ok(empty);
    }
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| Error::json(path, e))?;
    strip_nulls(&mut value);
    serde_json::from_value(value).map_err(|e| Error::json(path, e))
}

fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| Error::json(path, e))?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_files_are_created_with_defaults() {
        let dir = tempdir().unwrap();
        let store = RecordStore::in_dir(&dir.path().join("data"));
        assert!(store.load_projects().unwrap().is_empty());
        assert!(store.load_details().unwrap().is_empty());
        let raw = fs::read_to_string(store.projects_path()).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), serde_json::json!({"projects": []}));
        let raw = fs::read_to_string(store.details_path()).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), serde_json::json!({"details": []}));
    }

    #[test]
    fn save_then_load_keeps_order_and_pretty_prints() {
        let dir = tempdir().unwrap();
        let store = RecordStore::in_dir(dir.path());
        let projects: Vec<ProjectSummary> = (1..=3)
            .rev()
            .map(|id| ProjectSummary {
                id,
                title: format!("P{id}"),
                description: String::new(),
                image: String::new(),
                image_style: None,
                center_image: false,
                detail_page: format!("./project-{id}.html"),
            })
            .collect();
        store.save_projects(&projects).unwrap();
        let loaded = store.load_projects().unwrap();
        assert_eq!(loaded.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2, 1]);
        let raw = fs::read_to_string(store.projects_path()).unwrap();
        assert!(raw.contains("\n  \"projects\": ["));
    }

    #[test]
    fn null_fields_in_files_read_as_absent() {
        let dir = tempdir().unwrap();
        let store = RecordStore::in_dir(dir.path());
        fs::write(
            store.details_path(),
            r#"{"details":[{"projectId":4,"overview":null,"skills":null,"mainContent":null}]}"#,
        )
        .unwrap();
        let details = store.load_details().unwrap();
        assert_eq!(details.len(), 1);
        assert!(details[0].overview.is_empty());
        assert!(details[0].main_content.is_none());
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempdir().unwrap();
        let store = RecordStore::in_dir(dir.path());
        fs::write(store.projects_path(), "{ not json").unwrap();
        let err = store.load_projects().unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains(PROJECTS_FILE));
    }
}
