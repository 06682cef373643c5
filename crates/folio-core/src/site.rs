//! Mutation entry points: each one is a full read-modify-write cycle against
//! the record store followed by regeneration of the affected HTML.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::{Catalog, NewProject, ProjectPatch};
use crate::listing::{apply_listing, ListingMarkers};
use crate::materialize::{is_generated_page, DeleteOutcome, SiteRoot, WriteOutcome};
use crate::render::{render_detail_page, PageContext, PLACEHOLDER_HERO};
use crate::store::RecordStore;
use crate::{Error, ProjectDetail, ProjectSummary, Result};

/// The hand-authored document that carries the listing section.
#[derive(Debug, Clone)]
pub struct ListingDocument {
    pub path: String,
    pub markers: ListingMarkers,
}

impl Default for ListingDocument {
    fn default() -> Self {
        Self {
            path: "index.html".to_string(),
            markers: ListingMarkers::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
    /// Detail paths refused by the containment check.
    pub refused: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateReport {
    pub listing_updated: bool,
    #[serde(flatten)]
    pub pages: PagesReport,
    /// Generated pages on disk that no project points at.
    pub orphaned: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProject {
    pub project: ProjectSummary,
    pub page: DeleteOutcome,
}

#[derive(Debug, Clone)]
pub struct Site {
    root: SiteRoot,
    store: RecordStore,
    listing: ListingDocument,
}

impl Site {
    pub fn new(root: SiteRoot, store: RecordStore, listing: ListingDocument) -> Self {
        Self {
            root,
            store,
            listing,
        }
    }

    /// Site rooted at `dir` with records under `dir/<data_dir>` and the default listing document.
    pub fn open(dir: impl Into<PathBuf>, data_dir: &str) -> Self {
        let dir: PathBuf = dir.into();
        let store = RecordStore::in_dir(&dir.join(data_dir));
        Self::new(SiteRoot::new(dir), store, ListingDocument::default())
    }

    pub fn root(&self) -> &SiteRoot {
        &self.root
    }

    pub fn root_dir(&self) -> &Path {
        self.root.path()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.store.load_projects()
    }

    pub fn detail(&self, id: i64) -> Result<ProjectDetail> {
        self.store.load_catalog()?.detail_or_default(id)
    }

    pub fn create_project(&self, input: NewProject) -> Result<ProjectSummary> {
        let mut catalog = self.store.load_catalog()?;
        let project = catalog.create_project(input, chrono::Utc::now().timestamp_millis())?;
        self.check_detail_page(&catalog, project.id, &project.detail_page)?;
        self.store.save_catalog(&catalog)?;
        tracing::info!(id = project.id, title = %project.title, "created project");

        let detail = catalog.detail_or_default(project.id)?;
        self.write_page(&project, &detail)?;
        self.regenerate_listing(catalog.projects())?;
        Ok(project)
    }

    pub fn update_project(&self, id: i64, patch: ProjectPatch) -> Result<ProjectSummary> {
        let mut catalog = self.store.load_catalog()?;
        if let Some(page) = patch.detail_page.as_deref() {
            self.check_detail_page(&catalog, id, page)?;
        }
        let previous_page = catalog.get_project(id)?.detail_page.clone();
        let project = catalog.update_project(id, patch)?;
        self.store.save_catalog(&catalog)?;
        tracing::info!(id, "updated project");

        if self.root.resolve(&previous_page).ok() != self.root.resolve(&project.detail_page).ok() {
            let outcome = self.root.delete_generated(&previous_page)?;
            tracing::debug!(page = %previous_page, ?outcome, "detail page moved");
        }
        if !project.detail_page.trim().is_empty() {
            let detail = catalog.detail_or_default(id)?;
            self.write_page(&project, &detail)?;
        }
        self.regenerate_listing(catalog.projects())?;
        Ok(project)
    }

    pub fn delete_project(&self, id: i64) -> Result<DeletedProject> {
        let mut catalog = self.store.load_catalog()?;
        let project = catalog.delete_project(id)?;
        self.store.save_catalog(&catalog)?;

        let page = self.root.delete_generated(&project.detail_page)?;
        tracing::info!(id, page = %project.detail_page, deleted = page.deleted, "deleted project");
        self.regenerate_listing(catalog.projects())?;
        Ok(DeletedProject { project, page })
    }

    pub fn reorder_projects(&self, order: &[i64]) -> Result<Vec<ProjectSummary>> {
        let mut catalog = self.store.load_catalog()?;
        catalog.reorder(order);
        self.store.save_catalog(&catalog)?;
        tracing::info!(count = order.len(), "reordered projects");
        self.regenerate_listing(catalog.projects())?;
        Ok(catalog.projects().to_vec())
    }

    pub fn save_detail(&self, detail: ProjectDetail) -> Result<ProjectDetail> {
        let mut catalog = self.store.load_catalog()?;
        let saved = catalog.upsert_detail(detail)?;
        self.store.save_catalog(&catalog)?;
        tracing::info!(id = saved.project_id, "saved project detail");

        let project = catalog.get_project(saved.project_id)?.clone();
        self.refresh_page(&project, &saved)?;
        Ok(saved)
    }

    /// Patch the listing section from the stored projects, then create any
    /// missing detail pages.
    pub fn regenerate(&self) -> Result<RegenerateReport> {
        let catalog = self.store.load_catalog()?;
        let listing_updated = self.regenerate_listing(catalog.projects())?;
        let pages = self.ensure_detail_pages(&catalog)?;

        let referenced: HashSet<PathBuf> = catalog
            .projects()
            .iter()
            .filter_map(|p| self.root.resolve(&p.detail_page).ok())
            .collect();
        let orphaned: Vec<String> = self
            .root
            .list_generated()?
            .into_iter()
            .filter(|page| {
                self.root
                    .resolve(page)
                    .map(|path| !referenced.contains(&path))
                    .unwrap_or(false)
            })
            .collect();
        if !orphaned.is_empty() {
            tracing::warn!(?orphaned, "generated pages without a project");
        }
        Ok(RegenerateReport {
            listing_updated,
            pages,
            orphaned,
        })
    }

    /// Create the detail page of every project whose file does not exist yet.
    /// Existing files are never touched.
    pub fn ensure_detail_pages(&self, catalog: &Catalog) -> Result<PagesReport> {
        let mut report = PagesReport::default();
        for project in catalog.projects() {
            if project.detail_page.trim().is_empty() {
                continue;
            }
            let detail = catalog.detail_or_default(project.id)?;
            match self.write_page(project, &detail) {
                Ok(true) => report.written.push(project.detail_page.clone()),
                Ok(false) => report.skipped.push(project.detail_page.clone()),
                Err(Error::UnsafePath(path)) => {
                    tracing::warn!(id = project.id, %path, "refusing detail page outside the site root");
                    report.refused.push(path);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// A requested detail page must stay inside the site root and must not
    /// belong to another project.
    fn check_detail_page(&self, catalog: &Catalog, owner: i64, page: &str) -> Result<()> {
        if page.trim().is_empty() {
            return Ok(());
        }
        let target = self.root.resolve(page)?;
        let taken = catalog
            .projects()
            .iter()
            .filter(|p| p.id != owner)
            .find(|p| self.root.resolve(&p.detail_page).is_ok_and(|path| path == target));
        match taken {
            Some(other) => Err(Error::Invalid(format!(
                "detail page {page} is already used by project {}",
                other.id
            ))),
            None => Ok(()),
        }
    }

    fn regenerate_listing(&self, projects: &[ProjectSummary]) -> Result<bool> {
        apply_listing(&self.root, &self.listing.path, projects, &self.listing.markers).inspect_err(|e| {
            tracing::error!(error = %e, "listing regeneration aborted");
        })
    }

    /// Render and write a detail page unless the file already exists.
    fn write_page(&self, project: &ProjectSummary, detail: &ProjectDetail) -> Result<bool> {
        let html = self.render_page(project, detail);
        match self.root.write_new(&project.detail_page, html.as_bytes())? {
            WriteOutcome::Written(path) => {
                tracing::info!(id = project.id, path = %path.display(), "generated detail page");
                Ok(true)
            }
            WriteOutcome::AlreadyExists(_) => Ok(false),
        }
    }

    /// Rebuild a generated page after an edit. Custom pages are only created
    /// when missing, never replaced.
    fn refresh_page(&self, project: &ProjectSummary, detail: &ProjectDetail) -> Result<bool> {
        if project.detail_page.trim().is_empty() {
            return Ok(false);
        }
        if is_generated_page(&project.detail_page) {
            self.root.delete_generated(&project.detail_page)?;
        }
        self.write_page(project, detail)
    }

    fn render_page(&self, project: &ProjectSummary, detail: &ProjectDetail) -> String {
        let fallback = if project.image.trim().is_empty() {
            PLACEHOLDER_HERO
        } else {
            project.image.as_str()
        };
        let ctx = PageContext::for_target(&project.title, fallback, &project.detail_page);
        render_detail_page(detail, &ctx)
    }
}
