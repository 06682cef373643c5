//! In-memory operations over both record collections.
//!
//! A [`Catalog`] is loaded from the [`crate::store::RecordStore`] at the start of a
//! request, mutated here, and saved back. The summary list order is the
//! display order of the listing.

use serde::{Deserialize, Serialize};

use crate::materialize::generated_page_path;
use crate::{Error, ProjectDetail, ProjectSummary, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_style: Option<String>,
    #[serde(default)]
    pub center_image: bool,
    /// Custom detail page path. Defaults to the generated `./project-<id>.html`.
    #[serde(default)]
    pub detail_page: Option<String>,
}

/// Partial update of a summary; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// An empty string clears the style override.
    pub image_style: Option<String>,
    pub center_image: Option<bool>,
    pub detail_page: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    projects: Vec<ProjectSummary>,
    details: Vec<ProjectDetail>,
}

impl Catalog {
    pub fn new(projects: Vec<ProjectSummary>, details: Vec<ProjectDetail>) -> Self {
        Self { projects, details }
    }

    pub fn projects(&self) -> &[ProjectSummary] {
        &self.projects
    }

    pub fn details(&self) -> &[ProjectDetail] {
        &self.details
    }

    pub fn get_project(&self, id: i64) -> Result<&ProjectSummary> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::NotFound { what: "project", id })
    }

    pub fn detail_for(&self, id: i64) -> Option<&ProjectDetail> {
        self.details.iter().find(|d| d.project_id == id)
    }

    /// Stored detail, or the default one for a project that has none yet.
    pub fn detail_or_default(&self, id: i64) -> Result<ProjectDetail> {
        let project = self.get_project(id)?;
        Ok(self
            .detail_for(id)
            .cloned()
            .unwrap_or_else(|| ProjectDetail::default_for(project)))
    }

    /// Append a project and its default detail record.
    ///
    /// `id` is normally the creation timestamp; it is bumped until unique.
    pub fn create_project(&mut self, input: NewProject, id: i64) -> Result<ProjectSummary> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::Invalid("Project title is required".to_string()));
        }
        let mut id = id.max(1);
        while self.projects.iter().any(|p| p.id == id) || self.detail_for(id).is_some() {
            id += 1;
        }
        let detail_page = input
            .detail_page
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| generated_page_path(id));
        let project = ProjectSummary {
            id,
            title: title.to_string(),
            description: input.description.trim().to_string(),
            image: input.image.trim().to_string(),
            image_style: clean_style(input.image_style),
            center_image: input.center_image,
            detail_page,
        };
        self.details.push(ProjectDetail::default_for(&project));
        self.projects.push(project.clone());
        Ok(project)
    }

    pub fn update_project(&mut self, id: i64, patch: ProjectPatch) -> Result<ProjectSummary> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::Invalid("Project title cannot be empty".to_string()));
            }
        }
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::NotFound { what: "project", id })?;
        if let Some(title) = patch.title {
            project.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            project.description = description.trim().to_string();
        }
        if let Some(image) = patch.image {
            project.image = image.trim().to_string();
        }
        if patch.image_style.is_some() {
            project.image_style = clean_style(patch.image_style);
        }
        if let Some(center) = patch.center_image {
            project.center_image = center;
        }
        if let Some(page) = patch.detail_page {
            let page = page.trim();
            project.detail_page = if page.is_empty() {
                generated_page_path(id)
            } else {
                page.to_string()
            };
        }
        Ok(project.clone())
    }

    /// Remove a project and, with it, its detail record.
    pub fn delete_project(&mut self, id: i64) -> Result<ProjectSummary> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(Error::NotFound { what: "project", id })?;
        let removed = self.projects.remove(index);
        self.details.retain(|d| d.project_id != id);
        Ok(removed)
    }

    /// Listed ids first, in the given order; unknown ids are ignored and
    /// unlisted projects keep their relative order at the end.
    pub fn reorder(&mut self, order: &[i64]) {
        let mut remaining = std::mem::take(&mut self.projects);
        let mut ordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(pos) = remaining.iter().position(|p| p.id == *id) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.extend(remaining);
        self.projects = ordered;
    }

    /// Validate, normalize and store a detail record, replacing any existing one.
    pub fn upsert_detail(&mut self, detail: ProjectDetail) -> Result<ProjectDetail> {
        self.get_project(detail.project_id)?;
        validate_detail(&detail)?;
        let detail = normalize_detail(detail);
        match self
            .details
            .iter_mut()
            .find(|d| d.project_id == detail.project_id)
        {
            Some(existing) => *existing = detail.clone(),
            None => self.details.push(detail.clone()),
        }
        Ok(detail)
    }
}

fn clean_style(style: Option<String>) -> Option<String> {
    style
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn validate_detail(detail: &ProjectDetail) -> Result<()> {
    if let Some(main) = &detail.main_content {
        if main.title.trim().is_empty() && main.has_body() {
            return Err(Error::Invalid(
                "Main content title is required when a description, blocks or conclusion are provided"
                    .to_string(),
            ));
        }
    }
    if let Some(link) = detail
        .links
        .iter()
        .find(|l| l.url.trim().is_empty() != l.label.trim().is_empty())
    {
        return Err(Error::Invalid(format!(
            "Link needs both a label and a URL (got label '{}', url '{}')",
            link.label, link.url
        )));
    }
    Ok(())
}

/// Drop empty blocks, links and list entries; drop main content that has nothing in it.
pub fn normalize_detail(mut detail: ProjectDetail) -> ProjectDetail {
    if let Some(main) = detail.main_content.as_mut() {
        main.blocks.retain(|b| !b.is_empty());
    }
    if detail
        .main_content
        .as_ref()
        .is_some_and(|m| m.title.trim().is_empty() && !m.has_body())
    {
        detail.main_content = None;
    }
    detail.links.retain(|l| !l.url.trim().is_empty());
    for list in [
        &mut detail.key_contributions,
        &mut detail.future_development,
        &mut detail.skills,
    ] {
        list.retain(|s| !s.trim().is_empty());
    }
    detail
}
